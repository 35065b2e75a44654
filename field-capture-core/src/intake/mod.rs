pub mod board;
pub mod pipeline;
pub mod previews;

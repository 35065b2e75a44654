pub mod gate;
pub mod stream_handle;

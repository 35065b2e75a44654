pub mod bundle;
pub mod manifest;

pub mod capture_delegate;
pub mod intake_delegate;
pub mod media_devices;
pub mod preview_registry;
pub mod raster_surface;
pub mod recorder_backend;

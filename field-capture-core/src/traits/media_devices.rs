use thiserror::Error;

use crate::models::media_models::{MediaConstraints, MediaKind};
use crate::traits::raster_surface::RasterImage;

/// Failures reported by the platform when opening a stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("access not allowed")]
    NotAllowed,

    #[error("no device found")]
    NotFound,

    #[error("constraints cannot be satisfied: {0}")]
    Overconstrained(String),

    #[error("device not readable: {0}")]
    NotReadable(String),

    #[error("{0}")]
    Other(String),
}

/// A live device stream (microphone or camera).
///
/// Implemented by platform backends. Tracks keep the device indicator lit
/// until `stop_all_tracks` is called.
pub trait MediaStream: Send {
    fn id(&self) -> &str;

    fn kind(&self) -> MediaKind;

    /// Stop every track of the stream. Calling it twice must be harmless.
    fn stop_all_tracks(&mut self);

    /// Grab the current video frame as RGBA pixels.
    fn grab_frame(&mut self) -> Result<RasterImage, DeviceError> {
        Err(DeviceError::Other("stream carries no video".into()))
    }
}

/// Platform entry point for stream acquisition.
///
/// `get_user_media` may block on a permission prompt for as long as the user
/// takes to answer.
pub trait MediaDevices: Send + Sync {
    fn get_user_media(&self, constraints: &MediaConstraints) -> Result<Box<dyn MediaStream>, DeviceError>;
}

use crate::models::media_models::MediaKind;
use crate::traits::media_devices::{DeviceError, MediaStream};
use crate::traits::raster_surface::RasterImage;

/// Exclusive owner of a live device stream.
///
/// Every track is stopped exactly once: by `release`, or on drop if the
/// owner never released it explicitly.
pub struct MediaStreamHandle {
    id: String,
    kind: MediaKind,
    stream: Option<Box<dyn MediaStream>>,
}

impl MediaStreamHandle {
    pub fn new(stream: Box<dyn MediaStream>) -> Self {
        Self {
            id: stream.id().to_string(),
            kind: stream.kind(),
            stream: Some(stream),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn is_released(&self) -> bool {
        self.stream.is_none()
    }

    pub fn grab_frame(&mut self) -> Result<RasterImage, DeviceError> {
        match self.stream.as_deref_mut() {
            Some(stream) => stream.grab_frame(),
            None => Err(DeviceError::Other("stream already released".into())),
        }
    }

    /// Stop every track and give up the device.
    pub fn release(mut self) {
        self.stop_tracks();
    }

    fn stop_tracks(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_all_tracks();
            log::debug!("Released {:?} stream {}", self.kind, self.id);
        }
    }
}

impl Drop for MediaStreamHandle {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}

impl std::fmt::Debug for MediaStreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStreamHandle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("released", &self.is_released())
            .finish()
    }
}

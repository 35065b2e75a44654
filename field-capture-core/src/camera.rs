use std::sync::Arc;

use chrono::Utc;

use crate::models::config::CameraConfiguration;
use crate::models::error::CaptureError;
use crate::models::media_models::MediaConstraints;
use crate::models::picked_file::PickedFile;
use crate::permission::gate::MediaPermissionGate;
use crate::traits::raster_surface::RasterSurface;

/// JPEG quality of captured photos.
pub const CAPTURE_QUALITY: f32 = 0.9;
pub const CAPTURE_MIME_TYPE: &str = "image/jpeg";

/// Takes a single still from the device camera.
///
/// The photo comes back as an ordinary `PickedFile`, to be added to the
/// board like any picked file.
#[derive(Clone)]
pub struct CameraCapture {
    gate: MediaPermissionGate,
    surface: Arc<dyn RasterSurface>,
    config: CameraConfiguration,
}

impl CameraCapture {
    pub fn new(gate: MediaPermissionGate, surface: Arc<dyn RasterSurface>, config: CameraConfiguration) -> Self {
        Self { gate, surface, config }
    }

    /// Open the camera, grab one frame, encode it and close the camera.
    ///
    /// The stream is released before this returns, whatever the outcome.
    pub fn capture_photo(&self) -> Result<PickedFile, CaptureError> {
        let mut stream = self
            .gate
            .request_access(&MediaConstraints::Video(self.config.constraints))?;
        let frame = stream.grab_frame();
        stream.release();

        let frame = frame.map_err(|e| {
            log::error!("Camera frame capture failed: {}", e);
            CaptureError::FrameCapture(e.to_string())
        })?;
        let bytes = self.surface.encode(&frame, CAPTURE_MIME_TYPE, CAPTURE_QUALITY)?;

        let taken_at = Utc::now();
        let name = format!("photo_{}.jpg", taken_at.timestamp_millis());
        log::info!("Captured {} ({}x{}, {} bytes)", name, frame.width, frame.height, bytes.len());
        Ok(PickedFile::new(name, CAPTURE_MIME_TYPE, bytes).with_last_modified(taken_at))
    }
}

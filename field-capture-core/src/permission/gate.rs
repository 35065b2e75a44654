use std::sync::Arc;

use crate::models::error::PermissionError;
use crate::models::media_models::MediaConstraints;
use crate::permission::stream_handle::MediaStreamHandle;
use crate::traits::media_devices::{DeviceError, MediaDevices};

/// Requests device capture access and classifies the outcome.
///
/// The gate hands the stream to the caller and keeps no reference to it.
#[derive(Clone)]
pub struct MediaPermissionGate {
    devices: Arc<dyn MediaDevices>,
}

impl MediaPermissionGate {
    pub fn new(devices: Arc<dyn MediaDevices>) -> Self {
        Self { devices }
    }

    /// Open a stream matching `constraints`.
    ///
    /// Blocks while the platform shows its permission prompt. When the
    /// platform cannot satisfy the constraints, retries once with the relaxed
    /// set; an exact facing mode is never relaxed.
    pub fn request_access(&self, constraints: &MediaConstraints) -> Result<MediaStreamHandle, PermissionError> {
        log::info!("Requesting {:?} capture access", constraints.kind());

        let err = match self.devices.get_user_media(constraints) {
            Ok(stream) => return Ok(MediaStreamHandle::new(stream)),
            Err(e) => e,
        };

        let err = match (&err, constraints.relaxed()) {
            (DeviceError::Overconstrained(reason), Some(relaxed)) => {
                log::warn!("Capture constraints not satisfiable ({}), retrying with defaults", reason);
                match self.devices.get_user_media(&relaxed) {
                    Ok(stream) => return Ok(MediaStreamHandle::new(stream)),
                    Err(e) => e,
                }
            }
            _ => err,
        };

        let classified = classify(&err);
        log::warn!("{:?} capture access failed: {} ({})", constraints.kind(), classified, err);
        Err(classified)
    }
}

fn classify(err: &DeviceError) -> PermissionError {
    match err {
        DeviceError::NotAllowed => PermissionError::Denied,
        DeviceError::NotFound | DeviceError::Overconstrained(_) => PermissionError::DeviceNotFound,
        DeviceError::NotReadable(reason) | DeviceError::Other(reason) => {
            PermissionError::Unavailable(reason.clone())
        }
    }
}

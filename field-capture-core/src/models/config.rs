use std::path::Path;

use serde::{Deserialize, Serialize};

use super::media_models::{AudioConstraints, AudioEncoding, VideoConstraints};
use super::picked_file::MAX_FILES;

/// Longest edge, in pixels, photos are bounded to before upload.
pub const DEFAULT_MAX_DIMENSION: u32 = 900;

/// Voice-note recorder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfiguration {
    /// Encodings to try, most preferred first.
    pub encoding_preferences: Vec<AudioEncoding>,

    /// Processing requested from the microphone.
    pub constraints: AudioConstraints,

    /// How often the encoder delivers a chunk, in milliseconds (default: 100).
    pub timeslice_ms: u64,

    /// Upper bound on an assembled recording (None = unlimited).
    pub max_recording_bytes: Option<usize>,
}

impl AudioConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.encoding_preferences.is_empty() {
            return Err("at least one encoding preference is required".into());
        }
        if self.timeslice_ms == 0 {
            return Err("timeslice must be positive".into());
        }
        if self.max_recording_bytes == Some(0) {
            return Err("max recording size must be positive".into());
        }
        Ok(())
    }
}

impl Default for AudioConfiguration {
    fn default() -> Self {
        Self {
            encoding_preferences: vec![
                AudioEncoding::new("audio/mp4"),
                AudioEncoding::new("audio/webm"),
                AudioEncoding::new("audio/ogg"),
            ],
            constraints: AudioConstraints::default(),
            timeslice_ms: 100,
            max_recording_bytes: None,
        }
    }
}

/// Photo intake configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfiguration {
    /// Maximum photos per submission (default: 10).
    pub max_files: usize,

    /// Longest-edge bound applied by the resizer (default: 900).
    pub max_dimension: u32,

    /// Resize accepted photos before hand-off (default: true).
    pub resize_enabled: bool,

    /// Resize each photo of a batch on its own worker (default: false).
    pub concurrent_resize: bool,
}

impl IntakeConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_files == 0 {
            return Err("max files must be positive".into());
        }
        if self.max_dimension == 0 {
            return Err("max dimension must be positive".into());
        }
        Ok(())
    }
}

impl Default for IntakeConfiguration {
    fn default() -> Self {
        Self {
            max_files: MAX_FILES,
            max_dimension: DEFAULT_MAX_DIMENSION,
            resize_enabled: true,
            concurrent_resize: false,
        }
    }
}

/// Camera photo capture configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfiguration {
    pub constraints: VideoConstraints,
}

impl Default for CameraConfiguration {
    fn default() -> Self {
        Self {
            constraints: VideoConstraints::rear_camera_exact(),
        }
    }
}

/// All capture settings, loadable from a (partial) JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldCaptureConfiguration {
    pub audio: AudioConfiguration,
    pub intake: IntakeConfiguration,
    pub camera: CameraConfiguration,
}

impl FieldCaptureConfiguration {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("failed to parse configuration: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read configuration {}: {}", path.display(), e))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.audio.validate()?;
        self.intake.validate()
    }
}

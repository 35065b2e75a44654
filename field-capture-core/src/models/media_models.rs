use serde::{Deserialize, Serialize};

/// Kind of device media a stream carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

/// Audio processing requests. `None` leaves the platform default in place.
///
/// Whether a voice note should be captured with echo cancellation and noise
/// suppression or raw is a caller decision, so every flag is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioConstraints {
    pub echo_cancellation: Option<bool>,
    pub noise_suppression: Option<bool>,
    pub auto_gain_control: Option<bool>,
}

impl AudioConstraints {
    /// Voice-note processing: echo cancellation, noise suppression, AGC.
    pub fn processed() -> Self {
        Self {
            echo_cancellation: Some(true),
            noise_suppression: Some(true),
            auto_gain_control: Some(true),
        }
    }

    /// Unprocessed capture.
    pub fn raw() -> Self {
        Self {
            echo_cancellation: Some(false),
            noise_suppression: Some(false),
            auto_gain_control: Some(false),
        }
    }

    /// True when nothing beyond "any microphone" is requested.
    pub fn is_basic(&self) -> bool {
        *self == Self::default()
    }
}

/// Which way a camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    User,
    Environment,
}

/// Facing-mode request strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", content = "mode", rename_all = "lowercase")]
pub enum FacingConstraint {
    /// Preferred; any camera is acceptable if none matches.
    Ideal(FacingMode),
    /// Required; no fallback to another camera.
    Exact(FacingMode),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConstraints {
    pub facing: Option<FacingConstraint>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl VideoConstraints {
    /// The rear camera and nothing else.
    pub fn rear_camera_exact() -> Self {
        Self {
            facing: Some(FacingConstraint::Exact(FacingMode::Environment)),
            ..Default::default()
        }
    }

    pub fn requires_exact_facing(&self) -> bool {
        matches!(self.facing, Some(FacingConstraint::Exact(_)))
    }
}

/// A stream request handed to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaConstraints {
    Audio(AudioConstraints),
    Video(VideoConstraints),
}

impl MediaConstraints {
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Audio(_) => MediaKind::Audio,
            Self::Video(_) => MediaKind::Video,
        }
    }

    /// The simpler request to retry with after the platform could not satisfy
    /// this one. `None` when there is nothing left to relax, or when an exact
    /// facing mode forbids falling back to another camera.
    pub fn relaxed(&self) -> Option<MediaConstraints> {
        match self {
            Self::Audio(c) if !c.is_basic() => Some(Self::Audio(AudioConstraints::default())),
            Self::Video(c) if c.requires_exact_facing() => None,
            Self::Video(c) if *c != VideoConstraints::default() => {
                Some(Self::Video(VideoConstraints::default()))
            }
            _ => None,
        }
    }
}

/// A negotiated recorder encoding, identified by its MIME type
/// (optionally with codec parameters, e.g. `audio/webm;codecs=opus`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioEncoding(String);

impl AudioEncoding {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self(mime_type.into())
    }

    pub fn mime_type(&self) -> &str {
        &self.0
    }

    /// MIME type without parameters, e.g. `audio/webm`.
    pub fn essence(&self) -> &str {
        self.0.split(';').next().unwrap_or_default().trim()
    }

    /// File extension for storage names.
    pub fn file_extension(&self) -> &'static str {
        let essence = self.essence().to_ascii_lowercase();
        match essence.as_str() {
            "audio/mp4" | "audio/x-m4a" | "audio/aac" => "m4a",
            "audio/webm" => "webm",
            "audio/ogg" => "ogg",
            "audio/wav" | "audio/wave" | "audio/x-wav" => "wav",
            "audio/mpeg" => "mp3",
            _ => "bin",
        }
    }
}

impl std::fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

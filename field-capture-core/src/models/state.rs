use super::error::CaptureError;
use super::media_models::AudioEncoding;
use super::recording_result::AudioRecording;

/// Voice-note recorder state machine.
///
/// State transitions:
/// ```text
/// idle → requesting → recording → stopping → completed → idle (delete)
///   └───────┴────────────┴───────────┴──→ failed → idle (reset)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderState {
    Idle,
    Requesting,
    Recording {
        encoding: AudioEncoding,
        chunk_count: usize,
    },
    Stopping,
    Completed(AudioRecording),
    Failed(CaptureError),
}

impl RecorderState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    /// A stream is requested or held in these states.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Requesting | Self::Recording { .. } | Self::Stopping)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }

    pub fn recording(&self) -> Option<&AudioRecording> {
        match self {
            Self::Completed(recording) => Some(recording),
            _ => None,
        }
    }

    /// Short lowercase name, for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
            Self::Recording { .. } => "recording",
            Self::Stopping => "stopping",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
        }
    }
}

use thiserror::Error;

/// Outcome classes of a capture-permission request.
///
/// The gate only classifies; callers decide how to present each class.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error("permission denied")]
    Denied,

    #[error("no matching capture device")]
    DeviceNotFound,

    #[error("capture device unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by the voice-note recorder and the camera.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("no supported audio encoding (tried: {})", tried.join(", "))]
    NoSupportedEncoding { tried: Vec<String> },

    #[error("chunk assembly failed: {0}")]
    ChunkAssembly(String),

    #[error("encoder error: {0}")]
    Encoder(String),

    #[error("cannot {command} while {state}")]
    InvalidTransition {
        state: &'static str,
        command: &'static str,
    },

    #[error("capture aborted")]
    Aborted,

    #[error("frame capture failed: {0}")]
    FrameCapture(String),

    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Failures of the raster collaborator.
///
/// The resizer never surfaces these; it logs them and keeps the original bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RasterError {
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("no rendering context")]
    NoContext,

    #[error("draw failed: {0}")]
    Draw(String),

    #[error("encode failed: {0}")]
    Encode(String),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// Batch-level intake failures. The collection is left unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntakeError {
    #[error("too many files: {current} selected + {incoming} new exceeds the maximum of {max}")]
    TooManyFiles {
        current: usize,
        incoming: usize,
        max: usize,
    },

    #[error("no file at index {index} (collection holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("photo board is closed")]
    Closed,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),
}

/// Why a single candidate file was skipped during intake.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileRejection {
    #[error("not an image ({content_type})")]
    InvalidType { content_type: String },
}

/// Errors building or persisting the upload hand-off.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("at least one photo is required")]
    NoPhotos,

    #[error("storage error: {0}")]
    Storage(String),
}

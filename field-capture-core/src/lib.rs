//! # field-capture-core
//!
//! Platform-agnostic media capture core for field submission forms.
//!
//! Provides the permission gate, the voice-note recorder state machine,
//! photo intake with bounded resizing, preview lifecycle and upload bundles.
//! Platform-specific collaborators (device streams, audio encoders, raster
//! surfaces, preview URLs) implement the traits in `traits/` and plug into
//! the generic components.
//!
//! ## Architecture
//!
//! ```text
//! field-capture-core (this crate)
//! ├── traits/       ← MediaDevices, RecorderBackend, RasterSurface, PreviewRegistry, delegates
//! ├── models/       ← errors, RecorderState, configuration, PickedFile, AudioRecording
//! ├── permission/   ← MediaPermissionGate, MediaStreamHandle
//! ├── session/      ← AudioRecorder (generic over RecorderBackend)
//! ├── processing/   ← ImageResizer
//! ├── intake/       ← ImageIntakePipeline, PreviewLifecycleManager, PhotoBoard
//! ├── camera        ← CameraCapture
//! └── storage/      ← UploadBundle, manifest sidecar
//! ```

pub mod camera;
pub mod intake;
pub mod models;
pub mod permission;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod test_support;

// Re-export key types at crate root for convenience.
pub use camera::CameraCapture;
pub use intake::board::{BoardSnapshot, PhotoBoard};
pub use intake::pipeline::{ImageIntakePipeline, IntakeOutcome, RejectedFile};
pub use intake::previews::{PreviewHandle, PreviewLifecycleManager};
pub use models::config::{AudioConfiguration, CameraConfiguration, FieldCaptureConfiguration, IntakeConfiguration};
pub use models::error::{CaptureError, FileRejection, IntakeError, PermissionError, RasterError, SubmissionError};
pub use models::media_models::{AudioConstraints, AudioEncoding, MediaConstraints, MediaKind, VideoConstraints};
pub use models::picked_file::{FileCollection, PickedFile};
pub use models::recording_result::AudioRecording;
pub use models::state::RecorderState;
pub use permission::gate::MediaPermissionGate;
pub use permission::stream_handle::MediaStreamHandle;
pub use processing::resizer::{ImageResizer, ResizeOutcome, ResizeResult};
pub use session::recorder::AudioRecorder;
pub use storage::bundle::{UploadBundle, UploadItem};
pub use storage::manifest::{read_manifest, SubmissionManifest};
pub use traits::capture_delegate::RecorderDelegate;
pub use traits::intake_delegate::IntakeDelegate;
pub use traits::media_devices::{DeviceError, MediaDevices, MediaStream};
pub use traits::preview_registry::PreviewRegistry;
pub use traits::raster_surface::{RasterImage, RasterSurface};
pub use traits::recorder_backend::{RecorderBackend, RecorderEvent, RecorderSink};

use std::sync::Arc;
use std::time::Duration;

use crate::models::error::CaptureError;
use crate::models::media_models::AudioEncoding;
use crate::permission::stream_handle::MediaStreamHandle;

/// Event delivered by an encoder while it records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// An encoded fragment, in capture order.
    Data(Vec<u8>),
    /// The encoder flushed its last fragment and stopped.
    Stopped,
    /// The encoder failed; no further events follow.
    Error(String),
}

/// Callback receiving encoder events. May fire on any thread.
pub type RecorderSink = Arc<dyn Fn(RecorderEvent) + Send + Sync + 'static>;

/// Interface for platform audio encoders (the `MediaRecorder` role).
pub trait RecorderBackend: Send {
    /// Whether this runtime can record into `encoding`.
    fn is_type_supported(&self, encoding: &AudioEncoding) -> bool;

    /// Begin encoding `stream`, delivering a `Data` event every `timeslice`.
    fn start(
        &mut self,
        stream: &MediaStreamHandle,
        encoding: &AudioEncoding,
        timeslice: Duration,
        sink: RecorderSink,
    ) -> Result<(), CaptureError>;

    /// Ask the encoder to finalize.
    ///
    /// Remaining data and then `Stopped` are delivered through the sink given
    /// to `start`, either before this returns or later from another thread.
    fn stop(&mut self) -> Result<(), CaptureError>;
}

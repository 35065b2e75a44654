use crate::models::error::CaptureError;
use crate::models::recording_result::AudioRecording;
use crate::models::state::RecorderState;

/// Event delegate for recorder notifications (toasts, button state).
///
/// Advisory only: the recorder stays consistent whether or not a delegate is
/// set. Methods are never called with the recorder's lock held, but may be
/// called from an encoder thread.
pub trait RecorderDelegate: Send + Sync {
    /// Called after every state transition.
    fn on_state_changed(&self, state: &RecorderState);

    /// Called when a recording attempt fails.
    fn on_error(&self, error: &CaptureError);

    /// Called when a recording has been assembled.
    fn on_recording_finished(&self, recording: &AudioRecording);
}

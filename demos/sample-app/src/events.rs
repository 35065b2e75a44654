use serde::Serialize;

use field_capture_core::{
    AudioRecording, CaptureError, FileCollection, FileRejection, IntakeDelegate, IntakeError, RecorderDelegate,
    RecorderState,
};

/// Delegate that prints capture events as JSON lines on stdout, the way a
/// front end would receive them.
pub struct ConsoleDelegate;

// -- Event payloads --

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    RecorderState { state: &'a str, chunk_count: usize },
    RecorderError { message: String },
    RecordingFinished { id: String, mime_type: &'a str, size: usize, duration_secs: f64 },
    FileRejected { name: &'a str, reason: String },
    BatchRejected { message: String },
    CollectionChanged { names: Vec<&'a str> },
}

fn emit(event: &Event<'_>) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{}", line),
        Err(e) => log::warn!("Failed to serialize event: {}", e),
    }
}

impl RecorderDelegate for ConsoleDelegate {
    fn on_state_changed(&self, state: &RecorderState) {
        let chunk_count = match state {
            RecorderState::Recording { chunk_count, .. } => *chunk_count,
            RecorderState::Completed(r) => r.chunk_count,
            _ => 0,
        };
        emit(&Event::RecorderState {
            state: state.name(),
            chunk_count,
        });
    }

    fn on_error(&self, error: &CaptureError) {
        emit(&Event::RecorderError {
            message: error.to_string(),
        });
    }

    fn on_recording_finished(&self, recording: &AudioRecording) {
        emit(&Event::RecordingFinished {
            id: recording.id.to_string(),
            mime_type: recording.encoding.mime_type(),
            size: recording.size(),
            duration_secs: recording.duration_secs,
        });
    }
}

impl IntakeDelegate for ConsoleDelegate {
    fn on_file_rejected(&self, name: &str, reason: &FileRejection) {
        emit(&Event::FileRejected {
            name,
            reason: reason.to_string(),
        });
    }

    fn on_batch_rejected(&self, error: &IntakeError) {
        emit(&Event::BatchRejected {
            message: error.to_string(),
        });
    }

    fn on_collection_changed(&self, collection: &FileCollection) {
        emit(&Event::CollectionChanged {
            names: collection.iter().map(|f| f.name()).collect(),
        });
    }
}

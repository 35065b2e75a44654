use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::config::AudioConfiguration;
use crate::models::error::CaptureError;
use crate::models::media_models::{AudioEncoding, MediaConstraints};
use crate::models::recording_result::AudioRecording;
use crate::models::state::RecorderState;
use crate::permission::gate::MediaPermissionGate;
use crate::permission::stream_handle::MediaStreamHandle;
use crate::traits::capture_delegate::RecorderDelegate;
use crate::traits::recorder_backend::{RecorderBackend, RecorderEvent, RecorderSink};

/// Everything that can move the recorder, from the user or from the encoder.
///
/// Encoder events carry the session they belong to; events for a session
/// that is no longer current are ignored.
enum SessionEvent {
    Start,
    StreamReady {
        session: Uuid,
        encoding: AudioEncoding,
        stream: MediaStreamHandle,
    },
    Chunk {
        session: Uuid,
        data: Vec<u8>,
    },
    Stop,
    Flushed {
        session: Uuid,
    },
    Fail {
        session: Option<Uuid>,
        error: CaptureError,
    },
    Delete,
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Applied,
    Ignored,
    Rejected(CaptureError),
}

/// Result of one transition; notifications are sent after the lock is dropped.
struct Transition {
    outcome: Outcome,
    entered: Option<RecorderState>,
    session: Option<Uuid>,
    released_stream: bool,
    error: Option<CaptureError>,
    finished: Option<AudioRecording>,
}

impl Transition {
    fn applied() -> Self {
        Self {
            outcome: Outcome::Applied,
            entered: None,
            session: None,
            released_stream: false,
            error: None,
            finished: None,
        }
    }

    fn ignored() -> Self {
        Self {
            outcome: Outcome::Ignored,
            ..Self::applied()
        }
    }

    fn rejected(error: CaptureError) -> Self {
        Self {
            outcome: Outcome::Rejected(error),
            ..Self::applied()
        }
    }
}

/// One record → stop lifecycle.
struct CaptureSession {
    id: Uuid,
    encoding: Option<AudioEncoding>,
    chunks: Vec<Vec<u8>>,
    stream: Option<MediaStreamHandle>,
    started_at: Option<Instant>,
}

impl CaptureSession {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            encoding: None,
            chunks: Vec::new(),
            stream: None,
            started_at: None,
        }
    }

    /// Stop the stream if one is held. Returns whether one was.
    fn release_stream(&mut self) -> bool {
        match self.stream.take() {
            Some(stream) => {
                stream.release();
                true
            }
            None => false,
        }
    }
}

struct SessionState {
    state: RecorderState,
    session: Option<CaptureSession>,
    /// The most recently failed session and what it failed with.
    last_failure: Option<(Uuid, CaptureError)>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            session: None,
            last_failure: None,
        }
    }

    fn owns(&self, session: Uuid) -> bool {
        self.session.as_ref().is_some_and(|s| s.id == session)
    }

    fn enter(&mut self, state: RecorderState) -> Transition {
        log::info!("Recorder: {} -> {}", self.state.name(), state.name());
        self.state = state.clone();
        Transition {
            entered: Some(state),
            ..Transition::applied()
        }
    }

    /// Drop the current session, stopping its stream first.
    fn discard_session(&mut self) -> bool {
        match self.session.take() {
            Some(mut session) => session.release_stream(),
            None => false,
        }
    }

    /// The single mutation entry point of the recorder.
    fn transition(&mut self, event: SessionEvent, max_bytes: Option<usize>) -> Transition {
        match event {
            SessionEvent::Start => {
                if self.state.is_busy() {
                    log::debug!("Start ignored while {}", self.state.name());
                    return Transition::ignored();
                }
                if let RecorderState::Completed(previous) = &self.state {
                    log::info!("Discarding recording {} for a new take", previous.id);
                }
                let released_stream = self.discard_session();
                let id = Uuid::new_v4();
                self.session = Some(CaptureSession::new(id));
                Transition {
                    session: Some(id),
                    released_stream,
                    ..self.enter(RecorderState::Requesting)
                }
            }

            SessionEvent::StreamReady {
                session,
                encoding,
                stream,
            } => {
                if !self.owns(session) || !matches!(self.state, RecorderState::Requesting) {
                    log::debug!("Stream {} arrived for a superseded session, releasing", stream.id());
                    stream.release();
                    return Transition::ignored();
                }
                let Some(current) = self.session.as_mut() else {
                    return Transition::ignored();
                };
                current.stream = Some(stream);
                current.encoding = Some(encoding.clone());
                current.started_at = Some(Instant::now());
                let chunk_count = current.chunks.len();
                self.enter(RecorderState::Recording {
                    encoding,
                    chunk_count,
                })
            }

            SessionEvent::Chunk { session, data } => {
                if !self.owns(session) || data.is_empty() || !self.state.is_busy() {
                    return Transition::ignored();
                }
                let Some(current) = self.session.as_mut() else {
                    return Transition::ignored();
                };
                current.chunks.push(data);
                if let RecorderState::Recording { chunk_count, .. } = &mut self.state {
                    *chunk_count = current.chunks.len();
                }
                Transition::applied()
            }

            SessionEvent::Stop => match self.state {
                RecorderState::Recording { .. } => Transition {
                    session: self.session.as_ref().map(|s| s.id),
                    ..self.enter(RecorderState::Stopping)
                },
                _ => {
                    log::debug!("Stop ignored while {}", self.state.name());
                    Transition::ignored()
                }
            },

            SessionEvent::Flushed { session } => {
                let flushing = matches!(self.state, RecorderState::Recording { .. } | RecorderState::Stopping);
                if !self.owns(session) || !flushing {
                    return Transition::ignored();
                }
                let Some(mut current) = self.session.take() else {
                    return Transition::ignored();
                };
                let duration = current
                    .started_at
                    .map(|t| t.elapsed().as_secs_f64())
                    .unwrap_or(0.0);
                let assembled = match current.encoding.clone() {
                    Some(encoding) => {
                        AudioRecording::assemble(current.id, encoding, &current.chunks, duration, max_bytes)
                    }
                    None => Err(CaptureError::ChunkAssembly("no negotiated encoding".into())),
                };
                // The device is given up whether or not assembly worked.
                let released_stream = current.release_stream();

                match assembled {
                    Ok(recording) => Transition {
                        released_stream,
                        finished: Some(recording.clone()),
                        ..self.enter(RecorderState::Completed(recording))
                    },
                    Err(error) => Transition {
                        released_stream,
                        error: Some(error.clone()),
                        ..self.enter(RecorderState::Failed(error))
                    },
                }
            }

            SessionEvent::Fail { session, error } => {
                if let Some(id) = session {
                    if !self.owns(id) {
                        return Transition::ignored();
                    }
                }
                if matches!(
                    self.state,
                    RecorderState::Idle | RecorderState::Completed(_) | RecorderState::Failed(_)
                ) {
                    return Transition::ignored();
                }
                if let Some(current) = &self.session {
                    self.last_failure = Some((current.id, error.clone()));
                }
                let released_stream = self.discard_session();
                Transition {
                    released_stream,
                    error: Some(error.clone()),
                    ..self.enter(RecorderState::Failed(error))
                }
            }

            SessionEvent::Delete => match self.state {
                RecorderState::Completed(_) => {
                    self.discard_session();
                    self.enter(RecorderState::Idle)
                }
                _ => Transition::rejected(CaptureError::InvalidTransition {
                    state: self.state.name(),
                    command: "delete",
                }),
            },

            SessionEvent::Reset => match self.state {
                RecorderState::Failed(_) => {
                    self.discard_session();
                    self.enter(RecorderState::Idle)
                }
                RecorderState::Idle => Transition::ignored(),
                _ => Transition::rejected(CaptureError::InvalidTransition {
                    state: self.state.name(),
                    command: "reset",
                }),
            },
        }
    }
}

/// State shared between the recorder and its encoder callbacks.
struct RecorderCore {
    session_state: Mutex<SessionState>,
    delegate: Mutex<Option<Arc<dyn RecorderDelegate>>>,
    max_recording_bytes: Option<usize>,
}

impl RecorderCore {
    fn apply(&self, event: SessionEvent) -> Transition {
        let transition = self
            .session_state
            .lock()
            .transition(event, self.max_recording_bytes);

        let delegate = self.delegate.lock().clone();
        if let Some(delegate) = delegate {
            if let Some(ref state) = transition.entered {
                delegate.on_state_changed(state);
            }
            if let Some(ref error) = transition.error {
                delegate.on_error(error);
            }
            if let Some(ref recording) = transition.finished {
                delegate.on_recording_finished(recording);
            }
        }
        transition
    }

    /// Whether `session` is current and still waiting for its stream.
    fn is_pending(&self, session: Uuid) -> bool {
        let guard = self.session_state.lock();
        guard.owns(session) && matches!(guard.state, RecorderState::Requesting)
    }

    /// Whether `session` is current and has neither finished nor failed.
    fn is_live(&self, session: Uuid) -> bool {
        let guard = self.session_state.lock();
        guard.owns(session) && guard.state.is_busy()
    }

    /// The error a superseded session ended with; `Aborted` unless it failed on its own.
    fn failure_of(&self, session: Uuid) -> CaptureError {
        match &self.session_state.lock().last_failure {
            Some((id, error)) if *id == session => error.clone(),
            _ => CaptureError::Aborted,
        }
    }

    /// Encoder callback bound to one session. Holds the core weakly so a
    /// lingering encoder cannot keep a torn-down recorder alive.
    fn sink(core: &Arc<Self>, session: Uuid) -> RecorderSink {
        let weak: Weak<Self> = Arc::downgrade(core);
        Arc::new(move |event: RecorderEvent| {
            let Some(core) = weak.upgrade() else {
                return;
            };
            let event = match event {
                RecorderEvent::Data(data) => SessionEvent::Chunk { session, data },
                RecorderEvent::Stopped => SessionEvent::Flushed { session },
                RecorderEvent::Error(message) => {
                    log::error!("Encoder error: {}", message);
                    SessionEvent::Fail {
                        session: Some(session),
                        error: CaptureError::Encoder(message),
                    }
                }
            };
            core.apply(event);
        })
    }
}

/// The encoder and the session it was last started for.
///
/// Lock order is encoder, then session state; never the reverse.
struct EncoderSlot<B> {
    backend: B,
    owner: Option<Uuid>,
}

/// Voice-note recorder: record, stop, keep or delete a single audio note.
///
/// Generic over the platform encoder via `RecorderBackend`. Methods take
/// `&self` so the recorder can be shared between UI handlers; a second
/// `start` while a permission prompt is open is a no-op.
///
/// ```text
/// [MediaPermissionGate] → [MediaStreamHandle] → [RecorderBackend] ─chunks→ [CaptureSession] → AudioRecording
/// ```
pub struct AudioRecorder<B: RecorderBackend> {
    gate: MediaPermissionGate,
    encoder: Mutex<EncoderSlot<B>>,
    config: AudioConfiguration,
    core: Arc<RecorderCore>,
}

impl<B: RecorderBackend> AudioRecorder<B> {
    pub fn new(gate: MediaPermissionGate, backend: B, config: AudioConfiguration) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(Self {
            gate,
            encoder: Mutex::new(EncoderSlot { backend, owner: None }),
            core: Arc::new(RecorderCore {
                session_state: Mutex::new(SessionState::new()),
                delegate: Mutex::new(None),
                max_recording_bytes: config.max_recording_bytes,
            }),
            config,
        })
    }

    /// Set the notification delegate. It must not call back into the
    /// recorder synchronously.
    pub fn set_delegate(&self, delegate: Arc<dyn RecorderDelegate>) {
        *self.core.delegate.lock() = Some(delegate);
    }

    pub fn state(&self) -> RecorderState {
        self.core.session_state.lock().state.clone()
    }

    /// The finished recording, if the recorder is in the completed state.
    pub fn recording(&self) -> Option<AudioRecording> {
        self.core.session_state.lock().state.recording().cloned()
    }

    pub fn config(&self) -> &AudioConfiguration {
        &self.config
    }

    /// Pick the first preferred encoding the backend supports.
    pub fn negotiate_encoding(&self) -> Result<AudioEncoding, CaptureError> {
        let encoder = self.encoder.lock();
        for encoding in &self.config.encoding_preferences {
            if encoder.backend.is_type_supported(encoding) {
                log::info!("Negotiated audio encoding {}", encoding);
                return Ok(encoding.clone());
            }
            log::debug!("Audio encoding not supported: {}", encoding);
        }
        Err(CaptureError::NoSupportedEncoding {
            tried: self
                .config
                .encoding_preferences
                .iter()
                .map(|e| e.mime_type().to_string())
                .collect(),
        })
    }

    /// Start a new recording. Transitions: idle/completed/failed → requesting → recording.
    ///
    /// No-op while a recording is requested, running or stopping. A finished
    /// recording is discarded first.
    pub fn start(&self) -> Result<(), CaptureError> {
        let started = self.core.apply(SessionEvent::Start);
        let session = match (started.outcome, started.session) {
            (Outcome::Applied, Some(session)) => session,
            (Outcome::Rejected(error), _) => return Err(error),
            _ => return Ok(()),
        };

        let encoding = match self.negotiate_encoding() {
            Ok(encoding) => encoding,
            Err(error) => return Err(self.fail(session, error)),
        };

        let constraints = MediaConstraints::Audio(self.config.constraints);
        let stream = match self.gate.request_access(&constraints) {
            Ok(stream) => stream,
            Err(error) => return Err(self.fail(session, error.into())),
        };

        let timeslice = Duration::from_millis(self.config.timeslice_ms);
        {
            // Checked under the encoder lock so a superseded start can never
            // hand the encoder its sink.
            let mut encoder = self.encoder.lock();
            if !self.core.is_pending(session) {
                drop(encoder);
                log::debug!("Stream {} arrived for a superseded session, releasing", stream.id());
                stream.release();
                return Err(self.core.failure_of(session));
            }
            self.stop_orphaned_encoder(&mut encoder);
            let sink = RecorderCore::sink(&self.core, session);
            if let Err(error) = encoder.backend.start(&stream, &encoding, timeslice, sink) {
                drop(encoder);
                stream.release();
                return Err(self.fail(session, error));
            }
            encoder.owner = Some(session);
        }

        let ready = self.core.apply(SessionEvent::StreamReady {
            session,
            encoding,
            stream,
        });
        if ready.outcome != Outcome::Applied {
            // Aborted, or failed by the encoder, after it was started.
            let mut encoder = self.encoder.lock();
            if encoder.owner == Some(session) {
                encoder.owner = None;
                if let Err(e) = encoder.backend.stop() {
                    log::warn!("Failed to stop encoder of abandoned session: {}", e);
                }
            }
            return Err(self.core.failure_of(session));
        }
        Ok(())
    }

    /// Ask the encoder to finish. Transitions: recording → stopping → completed.
    ///
    /// No-op unless recording. Completion happens when the encoder delivers
    /// its final flush, which may be before this returns.
    pub fn stop(&self) -> Result<(), CaptureError> {
        let stopping = self.core.apply(SessionEvent::Stop);
        let session = match (stopping.outcome, stopping.session) {
            (Outcome::Applied, Some(session)) => session,
            _ => return Ok(()),
        };
        let result = {
            let mut encoder = self.encoder.lock();
            if encoder.owner != Some(session) {
                log::debug!("Encoder no longer belongs to session {}", session);
                return Ok(());
            }
            encoder.owner = None;
            encoder.backend.stop()
        };
        if let Err(error) = result {
            return Err(self.fail(session, error));
        }
        Ok(())
    }

    /// Discard the finished recording. Transitions: completed → idle.
    pub fn delete(&self) -> Result<(), CaptureError> {
        match self.core.apply(SessionEvent::Delete).outcome {
            Outcome::Rejected(error) => Err(error),
            _ => Ok(()),
        }
    }

    /// Acknowledge a failure. Transitions: failed → idle.
    pub fn reset(&self) -> Result<(), CaptureError> {
        match self.core.apply(SessionEvent::Reset).outcome {
            Outcome::Rejected(error) => Err(error),
            _ => Ok(()),
        }
    }

    /// Abandon whatever is in progress. Transitions: requesting/recording/stopping → failed.
    pub fn abort(&self) {
        self.core.apply(SessionEvent::Fail {
            session: None,
            error: CaptureError::Aborted,
        });
        self.stop_orphaned_encoder(&mut self.encoder.lock());
    }

    /// Component teardown: abort an unfinished recording and release its stream.
    pub fn shutdown(&self) {
        let state = self.state();
        if state.is_busy() {
            log::info!("Recorder torn down while {}", state.name());
        }
        self.abort();
    }

    /// Stop the encoder if the session it was started for is gone.
    fn stop_orphaned_encoder(&self, encoder: &mut EncoderSlot<B>) {
        let Some(owner) = encoder.owner else {
            return;
        };
        if self.core.is_live(owner) {
            return;
        }
        encoder.owner = None;
        if let Err(e) = encoder.backend.stop() {
            log::warn!("Failed to stop encoder of session {}: {}", owner, e);
        }
    }

    fn fail(&self, session: Uuid, error: CaptureError) -> CaptureError {
        self.core.apply(SessionEvent::Fail {
            session: Some(session),
            error: error.clone(),
        });
        error
    }
}

impl<B: RecorderBackend> Drop for AudioRecorder<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//! Test doubles for the platform collaborators.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::models::error::{CaptureError, FileRejection, IntakeError, RasterError};
use crate::models::media_models::{AudioEncoding, MediaConstraints, MediaKind};
use crate::models::picked_file::{FileCollection, PickedFile};
use crate::models::recording_result::AudioRecording;
use crate::models::state::RecorderState;
use crate::permission::stream_handle::MediaStreamHandle;
use crate::traits::capture_delegate::RecorderDelegate;
use crate::traits::intake_delegate::IntakeDelegate;
use crate::traits::media_devices::{DeviceError, MediaDevices, MediaStream};
use crate::traits::preview_registry::PreviewRegistry;
use crate::traits::raster_surface::{RasterImage, RasterSurface};
use crate::traits::recorder_backend::{RecorderBackend, RecorderEvent, RecorderSink};

// --- Media devices ---

#[derive(Default)]
pub struct StreamCounters {
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
}

impl StreamCounters {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.acquired() - self.released()
    }
}

pub struct FakeStream {
    id: String,
    kind: MediaKind,
    stopped: bool,
    frame: Result<RasterImage, DeviceError>,
    counters: Arc<StreamCounters>,
}

impl MediaStream for FakeStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn stop_all_tracks(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.counters.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn grab_frame(&mut self) -> Result<RasterImage, DeviceError> {
        self.frame.clone()
    }
}

/// Blocks `get_user_media` until opened, to hold a request "at the prompt".
#[derive(Default)]
pub struct PromptLatch {
    // (open, entered)
    state: Mutex<(bool, usize)>,
    cond: Condvar,
    held: Option<usize>,
}

impl PromptLatch {
    /// Holds only the first `count` callers; later ones pass straight through.
    pub fn holding_first(count: usize) -> Self {
        Self {
            held: Some(count),
            ..Self::default()
        }
    }

    pub fn open(&self) {
        self.state.lock().0 = true;
        self.cond.notify_all();
    }

    pub fn wait_entered(&self, count: usize) {
        let mut state = self.state.lock();
        while state.1 < count {
            self.cond.wait(&mut state);
        }
    }

    pub fn pass(&self) {
        let mut state = self.state.lock();
        state.1 += 1;
        self.cond.notify_all();
        if self.held.is_some_and(|held| state.1 > held) {
            return;
        }
        while !state.0 {
            self.cond.wait(&mut state);
        }
    }
}

pub struct FakeDevices {
    pub counters: Arc<StreamCounters>,
    pub requests: Mutex<Vec<MediaConstraints>>,
    script: Mutex<VecDeque<Result<(), DeviceError>>>,
    frame: Mutex<Result<RasterImage, DeviceError>>,
    latch: Option<Arc<PromptLatch>>,
}

impl FakeDevices {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(StreamCounters::default()),
            requests: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            frame: Mutex::new(Ok(RasterImage::new(640, 480, Vec::new()))),
            latch: None,
        }
    }

    /// Outcomes for the next calls, in order; calls beyond the script succeed.
    pub fn with_script(self, script: Vec<Result<(), DeviceError>>) -> Self {
        *self.script.lock() = script.into();
        self
    }

    pub fn with_frame(self, frame: Result<RasterImage, DeviceError>) -> Self {
        *self.frame.lock() = frame;
        self
    }

    pub fn with_latch(mut self, latch: Arc<PromptLatch>) -> Self {
        self.latch = Some(latch);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl MediaDevices for FakeDevices {
    fn get_user_media(&self, constraints: &MediaConstraints) -> Result<Box<dyn MediaStream>, DeviceError> {
        self.requests.lock().push(*constraints);
        if let Some(latch) = &self.latch {
            latch.pass();
        }
        if let Some(Err(e)) = self.script.lock().pop_front() {
            return Err(e);
        }
        let n = self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            id: format!("stream-{}", n),
            kind: constraints.kind(),
            stopped: false,
            frame: self.frame.lock().clone(),
            counters: Arc::clone(&self.counters),
        }))
    }
}

// --- Recorder backend ---

/// How the scripted encoder answers `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    /// Deliver `Stopped` before `stop` returns.
    Immediate,
    /// Wait for the test to call `EncoderRemote::finish`.
    Deferred,
}

#[derive(Default)]
pub struct EncoderRemote {
    sink: Mutex<Option<RecorderSink>>,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

impl EncoderRemote {
    pub fn emit(&self, event: RecorderEvent) {
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            sink(event);
        }
    }

    pub fn chunk(&self, data: &[u8]) {
        self.emit(RecorderEvent::Data(data.to_vec()));
    }

    pub fn finish(&self) {
        self.emit(RecorderEvent::Stopped);
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

pub struct ScriptedBackend {
    pub supported: Vec<String>,
    pub stop_mode: StopMode,
    pub fail_start: bool,
    /// Report this encoder error from inside `start`, before it returns.
    pub error_on_start: Option<String>,
    pub remote: Arc<EncoderRemote>,
}

impl ScriptedBackend {
    pub fn new(supported: &[&str]) -> Self {
        Self {
            supported: supported.iter().map(|s| s.to_string()).collect(),
            stop_mode: StopMode::Immediate,
            fail_start: false,
            error_on_start: None,
            remote: Arc::new(EncoderRemote::default()),
        }
    }

    pub fn deferred(mut self) -> Self {
        self.stop_mode = StopMode::Deferred;
        self
    }
}

impl RecorderBackend for ScriptedBackend {
    fn is_type_supported(&self, encoding: &AudioEncoding) -> bool {
        self.supported.iter().any(|s| s == encoding.mime_type())
    }

    fn start(
        &mut self,
        _stream: &MediaStreamHandle,
        _encoding: &AudioEncoding,
        _timeslice: Duration,
        sink: RecorderSink,
    ) -> Result<(), CaptureError> {
        if self.fail_start {
            return Err(CaptureError::Encoder("encoder refused to start".into()));
        }
        self.remote.starts.fetch_add(1, Ordering::SeqCst);
        *self.remote.sink.lock() = Some(sink);
        if let Some(message) = &self.error_on_start {
            self.remote.emit(RecorderEvent::Error(message.clone()));
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.remote.stops.fetch_add(1, Ordering::SeqCst);
        if self.stop_mode == StopMode::Immediate {
            self.remote.finish();
        }
        Ok(())
    }
}

// --- Raster surface ---

/// Fake encoded image: `IMG:<w>x<h>[:sleep=<ms>]`, or `BROKEN` to fail decoding.
pub fn fake_image_bytes(width: u32, height: u32) -> Vec<u8> {
    format!("IMG:{}x{}", width, height).into_bytes()
}

pub fn fake_image(name: &str, content_type: &str, width: u32, height: u32) -> PickedFile {
    PickedFile::new(name, content_type, fake_image_bytes(width, height))
}

#[derive(Default)]
pub struct FakeSurface {
    pub fail_encode: bool,
    pub no_context: bool,
    pub decodes: AtomicUsize,
}

impl RasterSurface for FakeSurface {
    fn decode(&self, bytes: &[u8], _mime_type: &str) -> Result<RasterImage, RasterError> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        let text = std::str::from_utf8(bytes).map_err(|e| RasterError::Decode(e.to_string()))?;
        let mut parts = text.split(':');
        if parts.next() != Some("IMG") {
            return Err(RasterError::Decode("not an image".into()));
        }
        let dims = parts.next().ok_or_else(|| RasterError::Decode("missing size".into()))?;
        let (w, h) = dims
            .split_once('x')
            .ok_or_else(|| RasterError::Decode("bad size".into()))?;
        let width: u32 = w.parse().map_err(|_| RasterError::Decode("bad width".into()))?;
        let height: u32 = h.parse().map_err(|_| RasterError::Decode("bad height".into()))?;
        for part in parts {
            if let Some(ms) = part.strip_prefix("sleep=") {
                let ms: u64 = ms.parse().unwrap_or(0);
                thread::sleep(Duration::from_millis(ms));
            }
        }
        Ok(RasterImage::new(width, height, Vec::new()))
    }

    fn draw_scaled(&self, _image: &RasterImage, width: u32, height: u32) -> Result<RasterImage, RasterError> {
        if self.no_context {
            return Err(RasterError::NoContext);
        }
        Ok(RasterImage::new(width, height, Vec::new()))
    }

    fn encode(&self, image: &RasterImage, mime_type: &str, quality: f32) -> Result<Vec<u8>, RasterError> {
        if self.fail_encode {
            return Err(RasterError::Encode("encoder exploded".into()));
        }
        Ok(format!("IMG:{}x{}:q={}:{}", image.width, image.height, quality, mime_type).into_bytes())
    }
}

/// Holds every decode at a latch, to keep an intake "in flight".
pub struct GatedSurface {
    pub inner: FakeSurface,
    pub latch: Arc<PromptLatch>,
}

impl RasterSurface for GatedSurface {
    fn decode(&self, bytes: &[u8], mime_type: &str) -> Result<RasterImage, RasterError> {
        self.latch.pass();
        self.inner.decode(bytes, mime_type)
    }

    fn draw_scaled(&self, image: &RasterImage, width: u32, height: u32) -> Result<RasterImage, RasterError> {
        self.inner.draw_scaled(image, width, height)
    }

    fn encode(&self, image: &RasterImage, mime_type: &str, quality: f32) -> Result<Vec<u8>, RasterError> {
        self.inner.encode(image, mime_type, quality)
    }
}

// --- Preview registry ---

#[derive(Default)]
pub struct CountingRegistry {
    next: AtomicUsize,
    live: Mutex<HashSet<String>>,
    pub created: AtomicUsize,
    pub revoked: AtomicUsize,
}

impl CountingRegistry {
    pub fn live(&self) -> usize {
        self.live.lock().len()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live.lock().contains(url)
    }
}

impl PreviewRegistry for CountingRegistry {
    fn create(&self, file: &PickedFile) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        let url = format!("blob:test/{}/{}", n, file.name());
        self.live.lock().insert(url.clone());
        self.created.fetch_add(1, Ordering::SeqCst);
        url
    }

    fn revoke(&self, url: &str) {
        if self.live.lock().remove(url) {
            self.revoked.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// --- Delegates ---

#[derive(Default)]
pub struct RecordingDelegate {
    pub states: Mutex<Vec<&'static str>>,
    pub errors: Mutex<Vec<CaptureError>>,
    pub finished: Mutex<Vec<AudioRecording>>,
}

impl RecorderDelegate for RecordingDelegate {
    fn on_state_changed(&self, state: &RecorderState) {
        self.states.lock().push(state.name());
    }

    fn on_error(&self, error: &CaptureError) {
        self.errors.lock().push(error.clone());
    }

    fn on_recording_finished(&self, recording: &AudioRecording) {
        self.finished.lock().push(recording.clone());
    }
}

#[derive(Default)]
pub struct IntakeLog {
    pub rejected_files: Mutex<Vec<String>>,
    pub rejected_batches: Mutex<Vec<IntakeError>>,
    pub collection_sizes: Mutex<Vec<usize>>,
}

impl IntakeDelegate for IntakeLog {
    fn on_file_rejected(&self, name: &str, _reason: &FileRejection) {
        self.rejected_files.lock().push(name.to_string());
    }

    fn on_batch_rejected(&self, error: &IntakeError) {
        self.rejected_batches.lock().push(error.clone());
    }

    fn on_collection_changed(&self, collection: &FileCollection) {
        self.collection_sizes.lock().push(collection.len());
    }
}

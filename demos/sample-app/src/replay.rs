//! Desktop stand-ins for the browser's device and encoder APIs: a clip file
//! replayed as the microphone, a still image as the camera.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use field_capture_core::{
    AudioEncoding, CaptureError, DeviceError, MediaConstraints, MediaDevices, MediaKind, MediaStream,
    MediaStreamHandle, RasterImage, RecorderBackend, RecorderEvent, RecorderSink,
};

const CHUNK_BYTES: usize = 4096;

pub struct ReplayDevices {
    still: Option<RasterImage>,
    opened: AtomicUsize,
}

impl ReplayDevices {
    pub fn new(still: Option<RasterImage>) -> Self {
        Self {
            still,
            opened: AtomicUsize::new(0),
        }
    }
}

impl MediaDevices for ReplayDevices {
    fn get_user_media(&self, constraints: &MediaConstraints) -> Result<Box<dyn MediaStream>, DeviceError> {
        let kind = constraints.kind();
        if kind == MediaKind::Video && self.still.is_none() {
            return Err(DeviceError::NotFound);
        }
        let n = self.opened.fetch_add(1, Ordering::SeqCst);
        log::info!("Opened replay {:?} stream #{}", kind, n);
        Ok(Box::new(ReplayStream {
            id: format!("replay-{}", n),
            kind,
            frame: self.still.clone(),
            stopped: false,
        }))
    }
}

struct ReplayStream {
    id: String,
    kind: MediaKind,
    frame: Option<RasterImage>,
    stopped: bool,
}

impl MediaStream for ReplayStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn stop_all_tracks(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.frame = None;
            log::info!("Replay stream {} stopped", self.id);
        }
    }

    fn grab_frame(&mut self) -> Result<RasterImage, DeviceError> {
        self.frame
            .clone()
            .ok_or_else(|| DeviceError::Other("camera stopped".into()))
    }
}

/// Encoder that "records" a pre-encoded clip, one chunk per timeslice.
pub struct ReplayBackend {
    clip: Arc<[u8]>,
    encoding: AudioEncoding,
    worker: Option<(Arc<AtomicBool>, JoinHandle<()>)>,
}

impl ReplayBackend {
    pub fn new(clip: Arc<[u8]>, encoding: AudioEncoding) -> Self {
        Self {
            clip,
            encoding,
            worker: None,
        }
    }
}

impl RecorderBackend for ReplayBackend {
    fn is_type_supported(&self, encoding: &AudioEncoding) -> bool {
        encoding.essence() == self.encoding.essence()
    }

    fn start(
        &mut self,
        _stream: &MediaStreamHandle,
        _encoding: &AudioEncoding,
        timeslice: Duration,
        sink: RecorderSink,
    ) -> Result<(), CaptureError> {
        if self.worker.is_some() {
            return Err(CaptureError::Encoder("replay already running".into()));
        }
        let stop = Arc::new(AtomicBool::new(false));
        let clip = Arc::clone(&self.clip);
        let flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("replay-encoder".into())
            .spawn(move || {
                let mut offset = 0;
                while offset < clip.len() && !flag.load(Ordering::SeqCst) {
                    let end = (offset + CHUNK_BYTES).min(clip.len());
                    sink(RecorderEvent::Data(clip[offset..end].to_vec()));
                    offset = end;
                    thread::sleep(timeslice);
                }
                while !flag.load(Ordering::SeqCst) {
                    thread::sleep(timeslice);
                }
                if offset < clip.len() {
                    sink(RecorderEvent::Data(clip[offset..].to_vec()));
                }
                sink(RecorderEvent::Stopped);
            })
            .map_err(|e| CaptureError::Encoder(format!("failed to spawn replay thread: {}", e)))?;

        self.worker = Some((stop, handle));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        let Some((stop, handle)) = self.worker.take() else {
            return Ok(());
        };
        stop.store(true, Ordering::SeqCst);
        handle
            .join()
            .map_err(|_| CaptureError::Encoder("replay thread panicked".into()))
    }
}

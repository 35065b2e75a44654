mod events;
mod replay;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;

use field_capture_core::{
    AudioEncoding, AudioRecorder, CameraCapture, FieldCaptureConfiguration, ImageIntakePipeline, ImageResizer,
    MediaPermissionGate, PhotoBoard, PickedFile, PreviewLifecycleManager, RasterSurface, UploadBundle,
};
use field_capture_native::{load_picked_file, ImageRasterSurface, InMemoryPreviewRegistry};

use events::ConsoleDelegate;
use replay::{ReplayBackend, ReplayDevices};

/// Assemble a field submission (photos plus an optional voice note) into an
/// upload bundle directory.
#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory the bundle and its manifest.json are written to.
    output_dir: PathBuf,

    /// Photos to attach, in display order.
    photos: Vec<PathBuf>,

    /// JSON configuration file; missing keys keep their defaults.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Still image used as the camera feed for one captured photo.
    #[clap(long)]
    camera_still: Option<PathBuf>,

    /// Pre-encoded audio clip replayed as the microphone for the voice note.
    #[clap(long)]
    voice_note: Option<PathBuf>,

    /// How long to "record" the voice note.
    #[clap(long, default_value_t = 500)]
    record_ms: u64,
}

fn main() {
    env_logger::init();

    let args = CliArgs::parse();
    if let Err(e) = run(&args) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => FieldCaptureConfiguration::load(path)?,
        None => FieldCaptureConfiguration::default(),
    };
    let delegate = Arc::new(ConsoleDelegate);
    let surface: Arc<dyn RasterSurface> = Arc::new(ImageRasterSurface::new());

    let pipeline = ImageIntakePipeline::new(config.intake.clone(), ImageResizer::new(Arc::clone(&surface)))
        .map_err(|e| e.to_string())?;
    let registry = Arc::new(InMemoryPreviewRegistry::new());
    let board = PhotoBoard::new(pipeline, PreviewLifecycleManager::new(registry.clone()));
    board.set_delegate(delegate.clone());

    let picked = args
        .photos
        .iter()
        .map(|path| load_picked_file(path))
        .collect::<Result<Vec<PickedFile>, _>>()
        .map_err(|e| e.to_string())?;
    if !picked.is_empty() {
        board.add_files(&picked).map_err(|e| e.to_string())?;
    }

    let still = match &args.camera_still {
        Some(path) => {
            let file = load_picked_file(path).map_err(|e| e.to_string())?;
            Some(
                surface
                    .decode(file.bytes(), file.content_type())
                    .map_err(|e| format!("camera still: {}", e))?,
            )
        }
        None => None,
    };
    let gate = MediaPermissionGate::new(Arc::new(ReplayDevices::new(still)));

    if args.camera_still.is_some() {
        let camera = CameraCapture::new(gate.clone(), Arc::clone(&surface), config.camera.clone());
        let photo = camera.capture_photo().map_err(|e| e.to_string())?;
        board.add_files(&[photo]).map_err(|e| e.to_string())?;
    }

    let recording = match &args.voice_note {
        Some(path) => Some(record_voice_note(gate, &config, path, args.record_ms, delegate)?),
        None => None,
    };

    let snapshot = board.snapshot();
    log::info!(
        "Board holds {} photos with {} live previews",
        snapshot.collection.len(),
        registry.live_count()
    );

    let bundle = UploadBundle::build(&snapshot.collection, recording.as_ref()).map_err(|e| e.to_string())?;
    let manifest = bundle.write_bundle(&args.output_dir).map_err(|e| e.to_string())?;
    board.close();

    let json = serde_json::to_string_pretty(&manifest).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn record_voice_note(
    gate: MediaPermissionGate,
    config: &FieldCaptureConfiguration,
    clip_path: &Path,
    record_ms: u64,
    delegate: Arc<ConsoleDelegate>,
) -> Result<field_capture_core::AudioRecording, String> {
    let clip = load_picked_file(clip_path).map_err(|e| e.to_string())?;
    let backend = ReplayBackend::new(clip.shared_bytes(), AudioEncoding::new(clip.content_type()));

    let mut audio = config.audio.clone();
    // Offer the clip's own type first so the replay encoder can serve it.
    audio
        .encoding_preferences
        .insert(0, AudioEncoding::new(clip.content_type()));

    let recorder = AudioRecorder::new(gate, backend, audio).map_err(|e| e.to_string())?;
    recorder.set_delegate(delegate);

    recorder.start().map_err(|e| e.to_string())?;
    thread::sleep(Duration::from_millis(record_ms));
    recorder.stop().map_err(|e| e.to_string())?;

    recorder
        .recording()
        .ok_or_else(|| format!("voice note did not complete ({})", recorder.state().name()))
}

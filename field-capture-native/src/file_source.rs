use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use field_capture_core::models::picked_file::PickedFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} has no file name")]
    NoFileName(PathBuf),
}

/// Load a file from disk the way a file picker hands it over: name, declared
/// content type and bytes.
///
/// The content type is sniffed from the magic bytes and falls back to the
/// extension, so a renamed PDF is still declared as a PDF.
pub fn load_picked_file(path: &Path) -> Result<PickedFile, SourceError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| SourceError::NoFileName(path.to_path_buf()))?;
    let io_err = |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let bytes = fs::read(path).map_err(io_err)?;
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok();

    let content_type = match infer::get(&bytes) {
        Some(kind) => kind.mime_type().to_string(),
        None => content_type_from_extension(path).to_string(),
    };
    log::debug!("Loaded {} ({}, {} bytes)", name, content_type, bytes.len());

    let file = PickedFile::new(name, content_type, bytes);
    Ok(match modified {
        Some(at) => file.with_last_modified(DateTime::<Utc>::from(at)),
        None => file,
    })
}

fn content_type_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "webm" => "audio/webm",
        "ogg" => "audio/ogg",
        "m4a" | "mp4" => "audio/mp4",
        "wav" => "audio/wav",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::new(4, 4))
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn sniffs_image_despite_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.txt");
        fs::write(&path, png_bytes()).unwrap();

        let file = load_picked_file(&path).unwrap();

        assert_eq!(file.name(), "photo.txt");
        assert_eq!(file.content_type(), "image/png");
        assert!(file.is_image());
        assert!(file.last_modified().is_some());
    }

    #[test]
    fn falls_back_to_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "call the client").unwrap();

        let file = load_picked_file(&path).unwrap();

        assert_eq!(file.content_type(), "text/plain");
        assert!(!file.is_image());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_picked_file(&dir.path().join("gone.jpg")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}

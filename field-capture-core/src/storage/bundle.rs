use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::error::SubmissionError;
use crate::models::picked_file::{FileCollection, PickedFile};
use crate::models::recording_result::AudioRecording;
use crate::storage::manifest::{write_manifest, ItemKind, ManifestEntry, SubmissionManifest};

/// A blob ready for upload under a collision-free storage name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    /// `<uuid>.<ext>`
    pub path: String,
    pub kind: ItemKind,
    pub content_type: String,
    pub original_name: Option<String>,
    pub checksum: String,
    bytes: Arc<[u8]>,
}

impl UploadItem {
    fn new(kind: ItemKind, extension: &str, content_type: &str, original_name: Option<String>, bytes: Arc<[u8]>) -> Self {
        Self {
            path: format!("{}.{}", Uuid::new_v4(), extension),
            kind,
            content_type: content_type.to_string(),
            original_name,
            checksum: sha256_hex(&bytes),
            bytes,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    fn manifest_entry(&self) -> ManifestEntry {
        ManifestEntry {
            path: self.path.clone(),
            kind: self.kind,
            content_type: self.content_type.clone(),
            size: self.bytes.len() as u64,
            checksum: self.checksum.clone(),
            original_name: self.original_name.clone(),
        }
    }
}

/// Everything one submission uploads: the photos in display order and an
/// optional voice note.
#[derive(Debug, Clone)]
pub struct UploadBundle {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub photos: Vec<UploadItem>,
    pub audio: Option<UploadItem>,
}

impl UploadBundle {
    /// Prepare the upload of `photos` and `audio`. At least one photo is required.
    pub fn build(photos: &FileCollection, audio: Option<&AudioRecording>) -> Result<Self, SubmissionError> {
        if photos.is_empty() {
            return Err(SubmissionError::NoPhotos);
        }

        let photos: Vec<UploadItem> = photos
            .iter()
            .map(|file| {
                UploadItem::new(
                    ItemKind::Photo,
                    &photo_extension(file),
                    file.content_type(),
                    Some(file.name().to_string()),
                    file.shared_bytes(),
                )
            })
            .collect();

        let audio = audio.map(|recording| {
            UploadItem::new(
                ItemKind::Audio,
                recording.encoding.file_extension(),
                recording.encoding.essence(),
                None,
                recording.shared_bytes(),
            )
        });

        let bundle = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            photos,
            audio,
        };
        log::info!(
            "Built upload bundle {}: {} photos, audio: {}",
            bundle.id,
            bundle.photos.len(),
            bundle.audio.is_some()
        );
        Ok(bundle)
    }

    pub fn items(&self) -> impl Iterator<Item = &UploadItem> {
        self.photos.iter().chain(self.audio.iter())
    }

    pub fn manifest(&self) -> SubmissionManifest {
        SubmissionManifest {
            id: self.id,
            created_at: self.created_at,
            photo_paths: self.photos.iter().map(|p| p.path.clone()).collect(),
            audio_path: self.audio.as_ref().map(|a| a.path.clone()),
            items: self.items().map(UploadItem::manifest_entry).collect(),
        }
    }

    /// Write every blob and the manifest sidecar into `dir`, creating it if needed.
    pub fn write_bundle(&self, dir: &Path) -> Result<SubmissionManifest, SubmissionError> {
        fs::create_dir_all(dir)
            .map_err(|e| SubmissionError::Storage(format!("failed to create directory: {}", e)))?;
        for item in self.items() {
            fs::write(dir.join(&item.path), item.bytes())
                .map_err(|e| SubmissionError::Storage(format!("failed to write {}: {}", item.path, e)))?;
        }
        let manifest = self.manifest();
        write_manifest(&manifest, dir)?;
        log::info!("Wrote bundle {} to {}", self.id, dir.display());
        Ok(manifest)
    }
}

/// Storage extension of a photo: from its name, else from its content type.
pub fn photo_extension(file: &PickedFile) -> String {
    if let Some(ext) = file.extension() {
        return ext;
    }
    let essence = file.content_type().split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    let ext = match essence.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        "image/heic" => "heic",
        _ => "bin",
    };
    ext.to_string()
}

/// Compute SHA-256 hex digest of a blob.
fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media_models::AudioEncoding;
    use crate::storage::manifest::read_manifest;
    use crate::test_support::fake_image;

    fn photos() -> FileCollection {
        vec![
            fake_image("Roof.JPG", "image/jpeg", 10, 10),
            fake_image("IMG_0001", "image/png", 10, 10),
            fake_image("scan", "application/octet-stream", 10, 10),
        ]
        .into()
    }

    fn voice_note(mime: &str) -> AudioRecording {
        AudioRecording::assemble(Uuid::new_v4(), AudioEncoding::new(mime), &[b"opus".to_vec()], 1.5, None).unwrap()
    }

    #[test]
    fn submission_needs_a_photo() {
        let err = UploadBundle::build(&FileCollection::new(), Some(&voice_note("audio/webm"))).unwrap_err();
        assert_eq!(err, SubmissionError::NoPhotos);
    }

    #[test]
    fn storage_names_are_unique_with_inferred_extensions() {
        let bundle = UploadBundle::build(&photos(), None).unwrap();

        let extensions: Vec<&str> = bundle
            .photos
            .iter()
            .map(|p| p.path.rsplit_once('.').unwrap().1)
            .collect();
        assert_eq!(extensions, vec!["jpg", "png", "bin"]);

        for item in &bundle.photos {
            let stem = item.path.rsplit_once('.').unwrap().0;
            assert!(Uuid::parse_str(stem).is_ok());
        }
        assert_ne!(bundle.photos[0].path, bundle.photos[1].path);
        assert!(bundle.audio.is_none());
    }

    #[test]
    fn audio_extension_follows_encoding() {
        for (mime, ext) in [
            ("audio/mp4", "m4a"),
            ("audio/webm;codecs=opus", "webm"),
            ("audio/ogg", "ogg"),
            ("audio/wav", "wav"),
        ] {
            let bundle = UploadBundle::build(&photos(), Some(&voice_note(mime))).unwrap();
            let audio = bundle.audio.unwrap();
            assert!(audio.path.ends_with(&format!(".{}", ext)), "{} -> {}", mime, audio.path);
        }
    }

    #[test]
    fn checksum_is_sha256_hex() {
        let file = PickedFile::new("a.txt.png", "image/png", b"abc".to_vec());
        let bundle = UploadBundle::build(&vec![file].into(), None).unwrap();
        assert_eq!(
            bundle.photos[0].checksum,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn written_bundle_matches_its_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("submission");
        let bundle = UploadBundle::build(&photos(), Some(&voice_note("audio/webm"))).unwrap();

        let written = bundle.write_bundle(&out).unwrap();
        let manifest = read_manifest(&out).unwrap();

        assert_eq!(manifest, written);
        assert_eq!(manifest.photo_paths.len(), 3);
        assert_eq!(manifest.items.len(), 4);
        assert_eq!(manifest.items[0].original_name.as_deref(), Some("Roof.JPG"));
        let audio_path = manifest.audio_path.as_deref().unwrap();
        assert_eq!(fs::read(out.join(audio_path)).unwrap(), b"opus");
        for entry in &manifest.items {
            let data = fs::read(out.join(&entry.path)).unwrap();
            assert_eq!(data.len() as u64, entry.size);
            assert_eq!(sha256_hex(&data), entry.checksum);
        }
    }
}

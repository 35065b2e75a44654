use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::error::SubmissionError;

/// File name of the manifest sidecar inside a bundle directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Photo,
    Audio,
}

/// One uploaded blob as described in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    pub kind: ItemKind,
    pub content_type: String,
    pub size: u64,
    /// SHA-256 of the blob, hex encoded.
    pub checksum: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

/// JSON sidecar handed to the upload collaborator with a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionManifest {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub photo_paths: Vec<String>,
    pub audio_path: Option<String>,
    pub items: Vec<ManifestEntry>,
}

/// Write `manifest` as `manifest.json` in `dir`.
pub fn write_manifest(manifest: &SubmissionManifest, dir: &Path) -> Result<(), SubmissionError> {
    let json = serde_json::to_string_pretty(manifest)
        .map_err(|e| SubmissionError::Storage(format!("failed to serialize manifest: {}", e)))?;
    fs::write(dir.join(MANIFEST_FILE_NAME), json)
        .map_err(|e| SubmissionError::Storage(format!("failed to write manifest: {}", e)))?;
    Ok(())
}

/// Read the manifest of the bundle stored in `dir`.
pub fn read_manifest(dir: &Path) -> Result<SubmissionManifest, SubmissionError> {
    let json = fs::read_to_string(dir.join(MANIFEST_FILE_NAME))
        .map_err(|e| SubmissionError::Storage(format!("failed to read manifest: {}", e)))?;
    let manifest: SubmissionManifest = serde_json::from_str(&json)
        .map_err(|e| SubmissionError::Storage(format!("failed to parse manifest: {}", e)))?;
    Ok(manifest)
}

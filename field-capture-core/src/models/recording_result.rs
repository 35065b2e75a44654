use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::CaptureError;
use super::media_models::AudioEncoding;

/// A finished voice note: all chunks of one session joined in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioRecording {
    pub id: Uuid,
    pub encoding: AudioEncoding,
    pub chunk_count: usize,
    pub duration_secs: f64,
    pub created_at: DateTime<Utc>,
    bytes: Arc<[u8]>,
}

impl AudioRecording {
    /// Join `chunks` into one immutable blob tagged with `encoding`.
    ///
    /// Fails when the total exceeds `max_bytes`.
    pub fn assemble(
        id: Uuid,
        encoding: AudioEncoding,
        chunks: &[Vec<u8>],
        duration_secs: f64,
        max_bytes: Option<usize>,
    ) -> Result<Self, CaptureError> {
        let total = chunks
            .iter()
            .try_fold(0usize, |acc, c| acc.checked_add(c.len()))
            .ok_or_else(|| CaptureError::ChunkAssembly("recording size overflow".into()))?;

        if let Some(limit) = max_bytes {
            if total > limit {
                return Err(CaptureError::ChunkAssembly(format!(
                    "recording is {} bytes, limit is {}",
                    total, limit
                )));
            }
        }

        let mut bytes = Vec::with_capacity(total);
        for chunk in chunks {
            bytes.extend_from_slice(chunk);
        }

        Ok(Self {
            id,
            encoding,
            chunk_count: chunks.len(),
            duration_secs,
            created_at: Utc::now(),
            bytes: bytes.into(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

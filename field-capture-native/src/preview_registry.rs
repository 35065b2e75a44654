use std::collections::HashMap;

use field_capture_core::models::picked_file::PickedFile;
use field_capture_core::traits::preview_registry::PreviewRegistry;
use parking_lot::Mutex;
use uuid::Uuid;

pub const URL_PREFIX: &str = "blob:field-capture/";

/// Process-local preview URLs, each mapping to the file it was created for.
#[derive(Debug, Default)]
pub struct InMemoryPreviewRegistry {
    entries: Mutex<HashMap<String, PickedFile>>,
}

impl InMemoryPreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The file behind a live URL.
    pub fn resolve(&self, url: &str) -> Option<PickedFile> {
        self.entries.lock().get(url).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.entries.lock().len()
    }
}

impl PreviewRegistry for InMemoryPreviewRegistry {
    fn create(&self, file: &PickedFile) -> String {
        let url = format!("{}{}", URL_PREFIX, Uuid::new_v4());
        self.entries.lock().insert(url.clone(), file.clone());
        log::debug!("Preview {} -> {}", url, file.name());
        url
    }

    fn revoke(&self, url: &str) {
        if self.entries.lock().remove(url).is_none() {
            log::debug!("Revoke of unknown preview {}", url);
        }
    }
}

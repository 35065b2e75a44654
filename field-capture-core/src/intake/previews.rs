use std::sync::Arc;

use crate::models::picked_file::FileCollection;
use crate::traits::preview_registry::PreviewRegistry;

/// A transient local URL rendering one collection entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    url: String,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Keeps preview handles in lockstep with the file collection.
#[derive(Clone)]
pub struct PreviewLifecycleManager {
    registry: Arc<dyn PreviewRegistry>,
}

impl PreviewLifecycleManager {
    pub fn new(registry: Arc<dyn PreviewRegistry>) -> Self {
        Self { registry }
    }

    /// Revoke every `prior` handle, then create one per entry of `collection`
    /// in order. Prior handles are revoked even when the collection is empty.
    pub fn refresh(&self, collection: &FileCollection, prior: Vec<PreviewHandle>) -> Vec<PreviewHandle> {
        let revoked = prior.len();
        self.release_all(prior);

        let handles: Vec<PreviewHandle> = collection
            .iter()
            .map(|file| PreviewHandle {
                url: self.registry.create(file),
            })
            .collect();
        log::debug!("Previews: revoked {}, created {}", revoked, handles.len());
        handles
    }

    pub fn release_all(&self, handles: Vec<PreviewHandle>) {
        for handle in handles {
            self.registry.revoke(&handle.url);
        }
    }
}

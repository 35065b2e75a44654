use std::sync::Arc;

use parking_lot::Mutex;

use crate::intake::pipeline::{ImageIntakePipeline, IntakeOutcome};
use crate::intake::previews::{PreviewHandle, PreviewLifecycleManager};
use crate::models::error::IntakeError;
use crate::models::picked_file::{FileCollection, PickedFile};
use crate::traits::intake_delegate::IntakeDelegate;

/// A collection and its previews, always of equal length.
#[derive(Debug, Default)]
pub struct BoardSnapshot {
    pub collection: FileCollection,
    pub previews: Vec<PreviewHandle>,
}

struct BoardState {
    snapshot: Arc<BoardSnapshot>,
    closed: bool,
}

/// The photo section of a submission form: owns the selected photos and
/// their previews for the lifetime of the form.
///
/// Readers take cheap snapshots; every change swaps in a new one. Intake
/// runs without the lock held, so a slow resize never blocks readers.
///
/// The preview registry is the one collaborator called with the lock held:
/// previews are created and revoked together with the snapshot swap so they
/// never drift from the collection. Registry calls must not block.
pub struct PhotoBoard {
    pipeline: ImageIntakePipeline,
    previews: PreviewLifecycleManager,
    state: Mutex<BoardState>,
    delegate: Mutex<Option<Arc<dyn IntakeDelegate>>>,
}

impl PhotoBoard {
    pub fn new(pipeline: ImageIntakePipeline, previews: PreviewLifecycleManager) -> Self {
        Self {
            pipeline,
            previews,
            state: Mutex::new(BoardState {
                snapshot: Arc::new(BoardSnapshot::default()),
                closed: false,
            }),
            delegate: Mutex::new(None),
        }
    }

    pub fn set_delegate(&self, delegate: Arc<dyn IntakeDelegate>) {
        *self.delegate.lock() = Some(delegate);
    }

    pub fn snapshot(&self) -> Arc<BoardSnapshot> {
        Arc::clone(&self.state.lock().snapshot)
    }

    pub fn collection(&self) -> FileCollection {
        self.snapshot().collection.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Run a batch through intake and append the accepted photos.
    ///
    /// The size bound is checked before intake and again against the latest
    /// collection before the result is committed.
    pub fn add_files(&self, candidates: &[PickedFile]) -> Result<IntakeOutcome, IntakeError> {
        let current_len = {
            let state = self.state.lock();
            if state.closed {
                return Err(IntakeError::Closed);
            }
            state.snapshot.collection.len()
        };

        let batch = match self.pipeline.prepare(candidates, current_len) {
            Ok(batch) => batch,
            Err(e) => return Err(self.reject_batch(e)),
        };
        if let Some(delegate) = self.delegate() {
            for rejected in &batch.rejected {
                delegate.on_file_rejected(&rejected.name, &rejected.reason);
            }
        }

        let committed = {
            let mut state = self.state.lock();
            if state.closed {
                log::info!("Board closed during intake, discarding {} photos", batch.accepted.len());
                return Err(IntakeError::Closed);
            }
            let latest = Arc::clone(&state.snapshot);
            self.pipeline
                .check_capacity(latest.collection.len(), batch.accepted.len())
                .map(|()| {
                    let collection = latest.collection.appended(batch.accepted);
                    state.snapshot = self.rebuild(collection, &latest);
                    state.snapshot.collection.clone()
                })
        };

        match committed {
            Ok(collection) => {
                self.collection_changed(&collection);
                Ok(IntakeOutcome {
                    collection,
                    rejected: batch.rejected,
                })
            }
            Err(e) => Err(self.reject_batch(e)),
        }
    }

    pub fn remove(&self, index: usize) -> Result<FileCollection, IntakeError> {
        let collection = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(IntakeError::Closed);
            }
            let latest = Arc::clone(&state.snapshot);
            let collection = latest.collection.without(index).ok_or(IntakeError::IndexOutOfRange {
                index,
                len: latest.collection.len(),
            })?;
            state.snapshot = self.rebuild(collection, &latest);
            state.snapshot.collection.clone()
        };
        self.collection_changed(&collection);
        Ok(collection)
    }

    pub fn clear(&self) -> Result<(), IntakeError> {
        {
            let mut state = self.state.lock();
            if state.closed {
                return Err(IntakeError::Closed);
            }
            let latest = Arc::clone(&state.snapshot);
            state.snapshot = self.rebuild(FileCollection::new(), &latest);
        }
        self.collection_changed(&FileCollection::new());
        Ok(())
    }

    /// Revoke every preview and refuse further changes. In-flight intakes
    /// are discarded when they finish.
    pub fn close(&self) {
        let released = {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            std::mem::take(&mut state.snapshot)
        };
        log::debug!("Closing photo board with {} photos", released.collection.len());
        self.previews.release_all(released.previews.clone());
    }

    /// Called with the state lock held.
    fn rebuild(&self, collection: FileCollection, latest: &BoardSnapshot) -> Arc<BoardSnapshot> {
        let previews = self.previews.refresh(&collection, latest.previews.clone());
        Arc::new(BoardSnapshot { collection, previews })
    }

    fn delegate(&self) -> Option<Arc<dyn IntakeDelegate>> {
        self.delegate.lock().clone()
    }

    fn reject_batch(&self, error: IntakeError) -> IntakeError {
        log::warn!("Batch rejected: {}", error);
        if let Some(delegate) = self.delegate() {
            delegate.on_batch_rejected(&error);
        }
        error
    }

    fn collection_changed(&self, collection: &FileCollection) {
        if let Some(delegate) = self.delegate() {
            delegate.on_collection_changed(collection);
        }
    }
}

impl Drop for PhotoBoard {
    fn drop(&mut self) {
        self.close();
    }
}

use crate::models::error::{FileRejection, IntakeError};
use crate::models::picked_file::FileCollection;

/// Event delegate for photo intake notifications.
pub trait IntakeDelegate: Send + Sync {
    /// A single file of a batch was skipped.
    fn on_file_rejected(&self, name: &str, reason: &FileRejection);

    /// A whole batch was refused.
    fn on_batch_rejected(&self, error: &IntakeError);

    /// The board now holds `collection`.
    fn on_collection_changed(&self, collection: &FileCollection);
}

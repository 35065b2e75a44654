use crate::models::picked_file::PickedFile;

/// Creates and revokes transient local URLs for file contents
/// (the `URL.createObjectURL` role).
pub trait PreviewRegistry: Send + Sync {
    fn create(&self, file: &PickedFile) -> String;

    /// Revoke `url`. Unknown or already revoked URLs are ignored.
    fn revoke(&self, url: &str);
}

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Default upper bound on photos per submission.
pub const MAX_FILES: usize = 10;

/// A user-picked or device-captured file. Immutable; clones share the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    name: String,
    content_type: String,
    bytes: Arc<[u8]>,
    last_modified: Option<DateTime<Utc>>,
}

impl PickedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
            last_modified: None,
        }
    }

    pub fn with_last_modified(mut self, at: DateTime<Utc>) -> Self {
        self.last_modified = Some(at);
        self
    }

    /// Same name, type and timestamp with new contents (e.g. after a resize).
    pub fn with_bytes(&self, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: self.name.clone(),
            content_type: self.content_type.clone(),
            bytes: bytes.into(),
            last_modified: self.last_modified,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
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

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    /// Whether the declared content type is an image type.
    pub fn is_image(&self) -> bool {
        self.content_type
            .trim()
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    }

    /// Extension taken from the file name, lowercased, if it has one.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// The ordered photos accepted for the current submission.
///
/// Insertion order is display order and duplicates are allowed. The value is
/// never mutated in place: every change produces a new collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileCollection {
    files: Arc<[PickedFile]>,
}

impl FileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PickedFile> {
        self.files.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PickedFile> {
        self.files.iter()
    }

    pub fn as_slice(&self) -> &[PickedFile] {
        &self.files
    }

    /// `self` followed by `files`, order preserved.
    pub fn appended(&self, files: impl IntoIterator<Item = PickedFile>) -> Self {
        let files: Vec<PickedFile> = self.files.iter().cloned().chain(files).collect();
        Self { files: files.into() }
    }

    /// `self` without the entry at `index`, or `None` if out of range.
    pub fn without(&self, index: usize) -> Option<Self> {
        if index >= self.files.len() {
            return None;
        }
        let files: Vec<PickedFile> = self
            .files
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, f)| f.clone())
            .collect();
        Some(Self { files: files.into() })
    }
}

impl From<Vec<PickedFile>> for FileCollection {
    fn from(files: Vec<PickedFile>) -> Self {
        Self { files: files.into() }
    }
}

impl<'a> IntoIterator for &'a FileCollection {
    type Item = &'a PickedFile;
    type IntoIter = std::slice::Iter<'a, PickedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content_type: &str) -> PickedFile {
        PickedFile::new(name, content_type, vec![1u8, 2, 3])
    }

    #[test]
    fn image_detection_uses_declared_type() {
        assert!(file("a.jpg", "image/jpeg").is_image());
        assert!(file("a", "IMAGE/PNG").is_image());
        assert!(!file("a.jpg", "application/pdf").is_image());
        assert!(!file("a.jpg", "").is_image());
        assert!(!file("a.jpg", "imag").is_image());
    }

    #[test]
    fn extension_from_name() {
        assert_eq!(file("IMG_001.JPG", "image/jpeg").extension().as_deref(), Some("jpg"));
        assert_eq!(file("archive.tar.gz", "x").extension().as_deref(), Some("gz"));
        assert_eq!(file("noext", "x").extension(), None);
        assert_eq!(file(".hidden", "x").extension(), None);
        assert_eq!(file("trailing.", "x").extension(), None);
    }

    #[test]
    fn appended_preserves_order_and_duplicates() {
        let a = file("a.jpg", "image/jpeg");
        let b = file("b.jpg", "image/jpeg");
        let collection = FileCollection::new().appended([a.clone(), b.clone()]);
        let collection = collection.appended([a.clone()]);

        let names: Vec<&str> = collection.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "a.jpg"]);
    }

    #[test]
    fn without_removes_one_entry() {
        let collection = FileCollection::from(vec![
            file("a.jpg", "image/jpeg"),
            file("b.jpg", "image/jpeg"),
            file("c.jpg", "image/jpeg"),
        ]);

        let smaller = collection.without(1).unwrap();
        let names: Vec<&str> = smaller.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a.jpg", "c.jpg"]);
        assert_eq!(collection.len(), 3);
        assert!(collection.without(3).is_none());
    }

    #[test]
    fn with_bytes_keeps_identity() {
        let original = file("a.png", "image/png");
        let resized = original.with_bytes(vec![9u8]);
        assert_eq!(resized.name(), "a.png");
        assert_eq!(resized.content_type(), "image/png");
        assert_eq!(resized.bytes(), &[9u8]);
        assert_eq!(original.bytes(), &[1u8, 2, 3]);
    }
}

use std::sync::mpsc;
use std::thread;

use crate::models::config::IntakeConfiguration;
use crate::models::error::{FileRejection, IntakeError};
use crate::models::picked_file::{FileCollection, PickedFile};
use crate::processing::resizer::{ImageResizer, ResizeResult};

/// A candidate file skipped during intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub name: String,
    pub reason: FileRejection,
}

/// Validated and resized files of one batch, not yet merged into a collection.
#[derive(Debug, Clone, Default)]
pub struct PreparedBatch {
    pub accepted: Vec<PickedFile>,
    pub rejected: Vec<RejectedFile>,
    /// Accepted files whose resize failed and kept their original bytes.
    pub fallbacks: usize,
}

#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub collection: FileCollection,
    pub rejected: Vec<RejectedFile>,
}

/// Validates a batch of picked files and merges the usable ones into the
/// current collection.
///
/// ```text
/// candidates → [count check] → [type filter] → [ImageResizer per file] → current ++ accepted
/// ```
#[derive(Clone)]
pub struct ImageIntakePipeline {
    config: IntakeConfiguration,
    resizer: ImageResizer,
}

impl ImageIntakePipeline {
    pub fn new(config: IntakeConfiguration, resizer: ImageResizer) -> Result<Self, IntakeError> {
        config.validate().map_err(IntakeError::ConfigurationFailed)?;
        Ok(Self { config, resizer })
    }

    pub fn config(&self) -> &IntakeConfiguration {
        &self.config
    }

    /// All-or-nothing bound on the collection size. Counts every candidate,
    /// including ones that would later be rejected by type.
    pub fn check_capacity(&self, current: usize, incoming: usize) -> Result<(), IntakeError> {
        if current + incoming > self.config.max_files {
            return Err(IntakeError::TooManyFiles {
                current,
                incoming,
                max: self.config.max_files,
            });
        }
        Ok(())
    }

    /// Add `candidates` to `current`. On error `current` is unaffected.
    pub fn accept(&self, candidates: &[PickedFile], current: &FileCollection) -> Result<IntakeOutcome, IntakeError> {
        let batch = self.prepare(candidates, current.len())?;
        Ok(IntakeOutcome {
            collection: current.appended(batch.accepted),
            rejected: batch.rejected,
        })
    }

    /// Validate and resize a batch destined for a collection of `current_len` files.
    pub fn prepare(&self, candidates: &[PickedFile], current_len: usize) -> Result<PreparedBatch, IntakeError> {
        self.check_capacity(current_len, candidates.len())?;

        let mut images = Vec::with_capacity(candidates.len());
        let mut rejected = Vec::new();
        for file in candidates {
            if file.is_image() {
                images.push(file);
            } else {
                log::warn!("Skipping {}: not an image ({})", file.name(), file.content_type());
                rejected.push(RejectedFile {
                    name: file.name().to_string(),
                    reason: FileRejection::InvalidType {
                        content_type: file.content_type().to_string(),
                    },
                });
            }
        }

        let (accepted, fallbacks) = if self.config.resize_enabled {
            let results = if self.config.concurrent_resize && images.len() > 1 {
                self.resize_concurrently(&images)
            } else {
                images
                    .iter()
                    .map(|file| self.resizer.resize(file, self.config.max_dimension))
                    .collect()
            };
            let fallbacks = results.iter().filter(|r| r.is_fallback()).count();
            (results.into_iter().map(|r| r.file).collect::<Vec<_>>(), fallbacks)
        } else {
            (images.into_iter().cloned().collect(), 0)
        };

        log::info!(
            "Intake: {} accepted, {} rejected, {} kept at original size",
            accepted.len(),
            rejected.len(),
            fallbacks
        );
        Ok(PreparedBatch {
            accepted,
            rejected,
            fallbacks,
        })
    }

    /// One scoped worker per file; results come back in submission order.
    fn resize_concurrently(&self, images: &[&PickedFile]) -> Vec<ResizeResult> {
        let (tx, rx) = mpsc::channel();
        let resizer = &self.resizer;
        let max_dimension = self.config.max_dimension;

        thread::scope(|scope| {
            for (index, &file) in images.iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move || {
                    let _ = tx.send((index, resizer.resize(file, max_dimension)));
                });
            }
        });
        drop(tx);

        let mut results: Vec<(usize, ResizeResult)> = rx.into_iter().collect();
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fake_image, FakeSurface};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn pipeline_with(config: IntakeConfiguration, surface: Arc<FakeSurface>) -> ImageIntakePipeline {
        ImageIntakePipeline::new(config, ImageResizer::new(surface)).unwrap()
    }

    fn pipeline() -> ImageIntakePipeline {
        pipeline_with(IntakeConfiguration::default(), Arc::new(FakeSurface::default()))
    }

    fn photos(n: usize) -> Vec<PickedFile> {
        (0..n)
            .map(|i| fake_image(&format!("p{}.jpg", i), "image/jpeg", 100, 100))
            .collect()
    }

    fn names(collection: &FileCollection) -> Vec<&str> {
        collection.iter().map(|f| f.name()).collect()
    }

    #[test]
    fn non_images_are_skipped_individually() {
        let current = FileCollection::from(photos(1));
        let batch = vec![
            fake_image("a.jpg", "image/jpeg", 100, 100),
            PickedFile::new("notes.pdf", "application/pdf", b"%PDF".to_vec()),
            fake_image("b.png", "image/png", 100, 100),
            fake_image("c.webp", "IMAGE/WEBP", 100, 100),
        ];

        let outcome = pipeline().accept(&batch, &current).unwrap();

        assert_eq!(names(&outcome.collection), vec!["p0.jpg", "a.jpg", "b.png", "c.webp"]);
        assert_eq!(
            outcome.rejected,
            vec![RejectedFile {
                name: "notes.pdf".into(),
                reason: FileRejection::InvalidType {
                    content_type: "application/pdf".into()
                },
            }]
        );
    }

    #[test]
    fn batch_filling_to_the_limit_is_accepted() {
        let current = FileCollection::from(photos(7));
        let outcome = pipeline().accept(&photos(3), &current).unwrap();
        assert_eq!(outcome.collection.len(), 10);
    }

    #[test]
    fn batch_over_the_limit_is_refused_whole() {
        let current = FileCollection::from(photos(8));
        let mut batch = photos(2);
        batch.push(PickedFile::new("readme.txt", "text/plain", b"hi".to_vec()));

        let err = pipeline().accept(&batch, &current).unwrap_err();

        assert_eq!(
            err,
            IntakeError::TooManyFiles {
                current: 8,
                incoming: 3,
                max: 10
            }
        );
        assert_eq!(current.len(), 8);
    }

    #[test]
    fn empty_batch_keeps_collection() {
        let current = FileCollection::from(photos(2));
        let outcome = pipeline().accept(&[], &current).unwrap();
        assert_eq!(outcome.collection, current);
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn oversized_photos_are_resized_in_place() {
        let batch = vec![
            fake_image("big.jpg", "image/jpeg", 1800, 1200),
            PickedFile::new("broken.jpg", "image/jpeg", b"BROKEN".to_vec()),
            fake_image("small.jpg", "image/jpeg", 300, 200),
        ];

        let batch_result = pipeline().prepare(&batch, 0).unwrap();

        assert_eq!(batch_result.fallbacks, 1);
        let bytes: Vec<&[u8]> = batch_result.accepted.iter().map(|f| f.bytes()).collect();
        assert_eq!(
            bytes,
            vec![
                &b"IMG:900x600:q=0.9:image/jpeg"[..],
                &b"BROKEN"[..],
                &b"IMG:300x200"[..],
            ]
        );
    }

    #[test]
    fn resize_can_be_disabled() {
        let surface = Arc::new(FakeSurface::default());
        let config = IntakeConfiguration {
            resize_enabled: false,
            ..Default::default()
        };
        let batch = vec![fake_image("big.jpg", "image/jpeg", 4000, 3000)];

        let outcome = pipeline_with(config, surface.clone())
            .accept(&batch, &FileCollection::new())
            .unwrap();

        assert_eq!(outcome.collection.get(0).unwrap().bytes(), batch[0].bytes());
        assert_eq!(surface.decodes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn concurrent_resize_keeps_submission_order() {
        let config = IntakeConfiguration {
            concurrent_resize: true,
            ..Default::default()
        };
        // Earlier files take longer, so workers finish in reverse order.
        let batch: Vec<PickedFile> = (0..4)
            .map(|i| {
                let bytes = format!("IMG:{}x1000:sleep={}", 1000 + i * 100, (4 - i) * 25);
                PickedFile::new(format!("p{}.jpg", i), "image/jpeg", bytes.into_bytes())
            })
            .collect();

        let outcome = pipeline_with(config, Arc::new(FakeSurface::default()))
            .accept(&batch, &FileCollection::new())
            .unwrap();

        assert_eq!(names(&outcome.collection), vec!["p0.jpg", "p1.jpg", "p2.jpg", "p3.jpg"]);
        let first = std::str::from_utf8(outcome.collection.get(0).unwrap().bytes()).unwrap();
        assert!(first.starts_with("IMG:900x900"));
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let config = IntakeConfiguration {
            max_dimension: 0,
            ..Default::default()
        };
        let result = ImageIntakePipeline::new(config, ImageResizer::new(Arc::new(FakeSurface::default())));
        assert!(matches!(result, Err(IntakeError::ConfigurationFailed(_))));
    }
}

use std::sync::Arc;

use crate::models::error::RasterError;
use crate::models::picked_file::PickedFile;
use crate::traits::raster_surface::RasterSurface;

/// Re-encode quality for resized photos.
pub const RESIZE_QUALITY: f32 = 0.9;

/// Scale `width` x `height` so the longest edge equals `max_dimension`.
///
/// Returns `None` when the image already fits. The short edge is rounded
/// half-up and never drops below one pixel.
pub fn bounded_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    if width <= max_dimension && height <= max_dimension {
        return None;
    }
    let scale_short = |short: u32, long: u32| -> u32 {
        let (short, long, max) = (short as u64, long as u64, max_dimension as u64);
        let scaled = (short * max + long / 2) / long;
        scaled.max(1) as u32
    };
    if width >= height {
        Some((max_dimension, scale_short(height, width)))
    } else {
        Some((scale_short(width, height), max_dimension))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// Already within bounds; the original bytes were kept.
    Unchanged,
    Resized { width: u32, height: u32 },
    /// Resizing failed; the original bytes were kept.
    Fallback(RasterError),
}

/// A photo after resizing, always usable for upload.
#[derive(Debug, Clone)]
pub struct ResizeResult {
    pub file: PickedFile,
    pub outcome: ResizeOutcome,
}

impl ResizeResult {
    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, ResizeOutcome::Fallback(_))
    }
}

/// Best-effort longest-edge downscaler.
///
/// Keeps the input MIME type and name; only the bytes change.
#[derive(Clone)]
pub struct ImageResizer {
    surface: Arc<dyn RasterSurface>,
}

impl ImageResizer {
    pub fn new(surface: Arc<dyn RasterSurface>) -> Self {
        Self { surface }
    }

    /// Bound `file` to `max_dimension` on its longest edge.
    ///
    /// Never fails: any raster error yields the original file with a
    /// `Fallback` outcome.
    pub fn resize(&self, file: &PickedFile, max_dimension: u32) -> ResizeResult {
        match self.try_resize(file, max_dimension) {
            Ok(Some((bytes, width, height))) => {
                log::debug!(
                    "Resized {} to {}x{} ({} -> {} bytes)",
                    file.name(),
                    width,
                    height,
                    file.size(),
                    bytes.len()
                );
                ResizeResult {
                    file: file.with_bytes(bytes),
                    outcome: ResizeOutcome::Resized { width, height },
                }
            }
            Ok(None) => ResizeResult {
                file: file.clone(),
                outcome: ResizeOutcome::Unchanged,
            },
            Err(e) => {
                log::warn!("Resize failed for {}, keeping original: {}", file.name(), e);
                ResizeResult {
                    file: file.clone(),
                    outcome: ResizeOutcome::Fallback(e),
                }
            }
        }
    }

    fn try_resize(&self, file: &PickedFile, max_dimension: u32) -> Result<Option<(Vec<u8>, u32, u32)>, RasterError> {
        let mime_type = file.content_type();
        let image = self.surface.decode(file.bytes(), mime_type)?;
        let Some((width, height)) = bounded_dimensions(image.width, image.height, max_dimension) else {
            return Ok(None);
        };
        let scaled = self.surface.draw_scaled(&image, width, height)?;
        drop(image);
        let bytes = self.surface.encode(&scaled, mime_type, RESIZE_QUALITY)?;
        Ok(Some((bytes, width, height)))
    }
}

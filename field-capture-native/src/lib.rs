//! # field-capture-native
//!
//! Native collaborators for field-capture-kit.
//!
//! Provides:
//! - `ImageRasterSurface`: `RasterSurface` on the `image` crate (decode, Lanczos3 scaling, encode)
//! - `InMemoryPreviewRegistry`: process-local preview URLs (`blob:field-capture/<uuid>`)
//! - `file_source`: load a file from disk as a `PickedFile`, content type sniffed with `infer`
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use field_capture_core::{ImageIntakePipeline, ImageResizer, IntakeConfiguration};
//! use field_capture_native::ImageRasterSurface;
//!
//! let resizer = ImageResizer::new(Arc::new(ImageRasterSurface::new()));
//! let pipeline = ImageIntakePipeline::new(IntakeConfiguration::default(), resizer)?;
//! ```

pub mod file_source;
pub mod image_surface;
pub mod preview_registry;

pub use file_source::{load_picked_file, SourceError};
pub use image_surface::ImageRasterSurface;
pub use preview_registry::InMemoryPreviewRegistry;

use crate::models::error::RasterError;

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self { width, height, pixels }
    }

    /// Transparent image of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * 4;
        Self::new(width, height, vec![0; len])
    }
}

/// Canvas-like raster collaborator used for resizing and camera frames.
pub trait RasterSurface: Send + Sync {
    /// Decode encoded image bytes to pixels.
    fn decode(&self, bytes: &[u8], mime_type: &str) -> Result<RasterImage, RasterError>;

    /// Draw `image` scaled onto a `width` x `height` surface.
    fn draw_scaled(&self, image: &RasterImage, width: u32, height: u32) -> Result<RasterImage, RasterError>;

    /// Encode pixels as `mime_type`. `quality` (0.0–1.0) applies to lossy formats.
    fn encode(&self, image: &RasterImage, mime_type: &str, quality: f32) -> Result<Vec<u8>, RasterError>;
}

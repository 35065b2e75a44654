use std::io::Cursor;

use field_capture_core::models::error::RasterError;
use field_capture_core::traits::raster_surface::{RasterImage, RasterSurface};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};

/// `RasterSurface` backed by the `image` crate.
///
/// Encodes JPEG (with quality), PNG, WebP, GIF and BMP.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRasterSurface;

impl ImageRasterSurface {
    pub fn new() -> Self {
        Self
    }
}

fn format_for(mime_type: &str) -> Result<ImageFormat, RasterError> {
    let essence = mime_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    let essence = match essence.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        _ => essence,
    };
    ImageFormat::from_mime_type(&essence).ok_or_else(|| RasterError::UnsupportedFormat(mime_type.to_string()))
}

fn to_buffer(image: &RasterImage) -> Result<RgbaImage, RasterError> {
    RgbaImage::from_raw(image.width, image.height, image.pixels.clone()).ok_or_else(|| {
        RasterError::Draw(format!(
            "pixel buffer of {} bytes does not match {}x{}",
            image.pixels.len(),
            image.width,
            image.height
        ))
    })
}

impl RasterSurface for ImageRasterSurface {
    fn decode(&self, bytes: &[u8], mime_type: &str) -> Result<RasterImage, RasterError> {
        let format = format_for(mime_type)?;
        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| RasterError::Decode(e.to_string()))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        Ok(RasterImage::new(width, height, decoded.into_raw()))
    }

    fn draw_scaled(&self, image: &RasterImage, width: u32, height: u32) -> Result<RasterImage, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::Draw(format!("invalid target size {}x{}", width, height)));
        }
        let source = to_buffer(image)?;
        let scaled = imageops::resize(&source, width, height, FilterType::Lanczos3);
        Ok(RasterImage::new(width, height, scaled.into_raw()))
    }

    fn encode(&self, image: &RasterImage, mime_type: &str, quality: f32) -> Result<Vec<u8>, RasterError> {
        let format = format_for(mime_type)?;
        let rgba = DynamicImage::ImageRgba8(to_buffer(image)?);
        let mut out = Vec::new();

        match format {
            ImageFormat::Jpeg => {
                let quality = (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
                // JPEG carries no alpha channel.
                let rgb = DynamicImage::ImageRgb8(rgba.to_rgb8());
                rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))
                    .map_err(|e| RasterError::Encode(e.to_string()))?;
            }
            ImageFormat::Png | ImageFormat::WebP | ImageFormat::Gif | ImageFormat::Bmp => {
                rgba.write_to(&mut Cursor::new(&mut out), format)
                    .map_err(|e| RasterError::Encode(e.to_string()))?;
            }
            other => {
                return Err(RasterError::UnsupportedFormat(format!("cannot encode {:?}", other)));
            }
        }
        Ok(out)
    }
}

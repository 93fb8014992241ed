use domain::bitmap::RgbaBitmap;
use image::{ImageBuffer, ImageFormat, ImageReader, Rgba};
use std::io::Cursor;
use tile_overlay_application::{
    error::{AppError, AppResult},
    ports::outgoing::image_codec::ImageCodecPort,
};
use tracing::{debug, instrument};

#[derive(Copy, Clone)]
pub struct ImagePngConfig {
    /// Larger images are rejected before their pixels are allocated.
    pub max_dimension: u32,
}

impl Default for ImagePngConfig {
    fn default() -> Self {
        Self {
            max_dimension: 16_384,
        }
    }
}

/// Decodes whatever the `image` crate recognises and always encodes PNG.
#[derive(Clone)]
pub struct ImagePngAdapter {
    max_dimension: u32,
}

impl ImagePngAdapter {
    pub fn new(config: ImagePngConfig) -> Self {
        Self {
            max_dimension: config.max_dimension,
        }
    }

    #[instrument(skip(self, bitmap), fields(width = bitmap.width(), height = bitmap.height()))]
    fn encode_png_impl(&self, bitmap: &RgbaBitmap) -> AppResult<Vec<u8>> {
        let img_buffer = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(
            bitmap.width(),
            bitmap.height(),
            bitmap.to_rgba_bytes(),
        )
        .ok_or_else(|| AppError::CodecError {
            message: "Failed to create image buffer from RGBA data".to_string(),
        })?;

        let mut png_bytes = Vec::new();
        img_buffer
            .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
            .map_err(|e| AppError::CodecError {
                message: format!("Failed to encode PNG: {e}"),
            })?;

        debug!("Encoded PNG: {} bytes", png_bytes.len());
        Ok(png_bytes)
    }

    #[instrument(skip(self, encoded), fields(bytes = encoded.len()))]
    fn decode_impl(&self, encoded: &[u8]) -> AppResult<RgbaBitmap> {
        let reader = ImageReader::new(Cursor::new(encoded))
            .with_guessed_format()
            .map_err(|e| AppError::CodecError {
                message: format!("Failed to read image header: {e}"),
            })?;

        let (width, height) = reader.into_dimensions().map_err(|e| AppError::CodecError {
            message: format!("Unrecognised image data: {e}"),
        })?;
        if width > self.max_dimension || height > self.max_dimension {
            return Err(AppError::CodecError {
                message: format!(
                    "Image {}x{} exceeds the {} pixel limit",
                    width, height, self.max_dimension
                ),
            });
        }

        let img = image::load_from_memory(encoded).map_err(|e| AppError::CodecError {
            message: format!("Failed to decode image: {e}"),
        })?;
        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        let bitmap = RgbaBitmap::from_rgba_bytes(width, height, rgba_img.as_raw())?;
        debug!(
            "Decoded image: {} bytes -> {}x{}",
            encoded.len(),
            width,
            height
        );
        Ok(bitmap)
    }
}

impl Default for ImagePngAdapter {
    fn default() -> Self {
        Self::new(ImagePngConfig::default())
    }
}

impl ImageCodecPort for ImagePngAdapter {
    fn decode(&self, encoded: &[u8]) -> AppResult<RgbaBitmap> {
        self.decode_impl(encoded)
    }

    fn encode_png(&self, bitmap: &RgbaBitmap) -> AppResult<Vec<u8>> {
        self.encode_png_impl(bitmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::color::pack_rgba;

    #[test]
    fn encode_then_decode_keeps_pixels() {
        let pixels = vec![
            pack_rgba(0, 0, 0, 255),
            pack_rgba(237, 28, 36, 255),
            0,
            pack_rgba(1, 2, 3, 128),
        ];
        let bitmap = RgbaBitmap::from_pixels(2, 2, pixels).unwrap();
        let codec = ImagePngAdapter::default();

        let png = codec.encode_png(&bitmap).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        assert_eq!(codec.decode(&png).unwrap(), bitmap);
    }

    #[test]
    fn rejects_oversized_images() {
        let codec = ImagePngAdapter::new(ImagePngConfig { max_dimension: 4 });
        let png = codec.encode_png(&RgbaBitmap::transparent(5, 1)).unwrap();
        assert!(matches!(
            codec.decode(&png),
            Err(AppError::CodecError { .. })
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(ImagePngAdapter::default().decode(b"not an image").is_err());
    }
}

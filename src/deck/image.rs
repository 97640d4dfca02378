use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

/// A bitmap normalized to 8-bit RGB and re-encoded as PNG, ready to embed.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PreparedImage {
    /// Decode any payload the `image` crate understands.
    ///
    /// Alpha, palette, greyscale and 16-bit images are flattened to RGB8 so
    /// every embedded part has the same encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        let decoded = image::load_from_memory(bytes).map_err(ImageError::Decode)?;
        let (width, height) = (decoded.width(), decoded.height());
        if width == 0 || height == 0 {
            return Err(ImageError::Empty { width, height });
        }

        let rgb = match decoded {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.to_rgb8(),
        };

        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(ImageError::Encode)?;

        Ok(Self {
            png: buffer.into_inner(),
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn rgba_is_flattened_to_rgb() {
        let source = RgbaImage::from_pixel(32, 16, Rgba([200, 10, 10, 128]));
        let prepared =
            PreparedImage::from_bytes(&encode(DynamicImage::ImageRgba8(source), ImageFormat::Png))
                .unwrap();

        assert_eq!((prepared.width, prepared.height), (32, 16));
        let reloaded = image::load_from_memory(&prepared.png).unwrap();
        assert!(matches!(reloaded, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn greyscale_is_converted() {
        let source = GrayImage::from_pixel(8, 8, Luma([90]));
        let prepared =
            PreparedImage::from_bytes(&encode(DynamicImage::ImageLuma8(source), ImageFormat::Png))
                .unwrap();
        let reloaded = image::load_from_memory(&prepared.png).unwrap();
        assert_eq!(reloaded.to_rgb8().get_pixel(0, 0).0, [90, 90, 90]);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = PreparedImage::from_bytes(b"definitely not a png").unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }
}

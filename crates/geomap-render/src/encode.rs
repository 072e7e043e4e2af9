//! PNG encoding and data URIs

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use serde::{Serialize, Serializer};

use geomap_core::error::{GeomapError, RenderMode, Result};

/// An encoded PNG image
#[derive(Debug, Clone, PartialEq)]
pub struct PngImage {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl PngImage {
    /// Encode a packed RGB8 buffer
    pub fn from_rgb(buffer: &[u8], width: u32, height: u32, mode: RenderMode) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if buffer.len() != expected {
            return Err(GeomapError::render(
                mode,
                format!("pixel buffer holds {} bytes, expected {}", buffer.len(), expected),
            ));
        }

        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(buffer, width, height, ExtendedColorType::Rgb8)
            .map_err(|e| GeomapError::render(mode, format!("PNG encoding failed: {}", e)))?;
        Ok(Self { width, height, bytes })
    }

    /// `data:image/png;base64,...`
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", BASE64.encode(&self.bytes))
    }
}

impl Serialize for PngImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.data_uri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_and_uri() {
        let buffer = vec![255u8; 4 * 3 * 3];
        let png = PngImage::from_rgb(&buffer, 4, 3, RenderMode::Static).unwrap();
        assert_eq!(&png.bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert!(png.data_uri().starts_with("data:image/png;base64,iVBORw0KGgo"));

        let json = serde_json::to_value(&png).unwrap();
        assert_eq!(json.as_str().unwrap(), png.data_uri());
    }

    #[test]
    fn test_buffer_size_mismatch_is_an_error() {
        let err = PngImage::from_rgb(&[0u8; 5], 4, 3, RenderMode::Raster).unwrap_err();
        assert!(matches!(err, GeomapError::Render { mode: RenderMode::Raster, .. }));
    }
}

//! RGBA page images and PNG data URLs
//!
//! The backend hands pages back as `data:image/png;base64,...` strings; the
//! blank detector and the editor both work on the decoded RGBA pixels.

use crate::error::DeskError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tiny_skia::{ColorU8, IntSize, Pixmap};

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// 8-bit RGBA image, row-major, no padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaImage {
    /// Image filled with one colour
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DeskError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(DeskError::ImageError(format!(
                "expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Copy out of a premultiplied pixmap
    pub fn from_pixmap(pixmap: &Pixmap) -> Self {
        let pixels = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        Self {
            width: pixmap.width(),
            height: pixmap.height(),
            pixels,
        }
    }

    pub fn to_pixmap(&self) -> Result<Pixmap, DeskError> {
        let size = IntSize::from_wh(self.width, self.height).ok_or_else(|| {
            DeskError::ImageError(format!("invalid image size {}x{}", self.width, self.height))
        })?;
        let data = self
            .pixels
            .chunks_exact(4)
            .flat_map(|c| {
                let p = ColorU8::from_rgba(c[0], c[1], c[2], c[3]).premultiply();
                [p.red(), p.green(), p.blue(), p.alpha()]
            })
            .collect();
        Pixmap::from_vec(data, size)
            .ok_or_else(|| DeskError::ImageError("pixel buffer does not match size".into()))
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some(&mut self.pixels[i..i + 4])
    }
}

/// Decode any PNG into straight (non-premultiplied) RGBA8
pub fn decode_png(bytes: &[u8]) -> Result<RgbaImage, DeskError> {
    Ok(RgbaImage::from_pixmap(&decode_pixmap(bytes)?))
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, DeskError> {
    encode_pixmap(&image.to_pixmap()?)
}

pub fn decode_pixmap(bytes: &[u8]) -> Result<Pixmap, DeskError> {
    Pixmap::decode_png(bytes).map_err(|e| DeskError::ImageError(e.to_string()))
}

pub fn encode_pixmap(pixmap: &Pixmap) -> Result<Vec<u8>, DeskError> {
    pixmap
        .encode_png()
        .map_err(|e| DeskError::ImageError(e.to_string()))
}

/// Accepts a full PNG data URL or bare base64
pub fn decode_data_url(data: &str) -> Result<Vec<u8>, DeskError> {
    let payload = match data.split_once(',') {
        Some((header, rest)) if header.starts_with("data:") => rest,
        _ => data,
    };
    BASE64
        .decode(payload.trim())
        .map_err(|e| DeskError::ImageError(format!("invalid base64 image data: {}", e)))
}

pub fn to_data_url(png_bytes: &[u8]) -> String {
    format!("{}{}", PNG_DATA_URL_PREFIX, BASE64.encode(png_bytes))
}

/// Data URL straight to pixels
pub fn decode_png_data_url(data: &str) -> Result<RgbaImage, DeskError> {
    decode_png(&decode_data_url(data)?)
}

pub fn encode_png_data_url(image: &RgbaImage) -> Result<String, DeskError> {
    Ok(to_data_url(&encode_png(image)?))
}

pub fn decode_pixmap_data_url(data: &str) -> Result<Pixmap, DeskError> {
    decode_pixmap(&decode_data_url(data)?)
}

pub fn encode_pixmap_data_url(pixmap: &Pixmap) -> Result<String, DeskError> {
    Ok(to_data_url(&encode_pixmap(pixmap)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use png::{BitDepth, ColorType, Encoder};

    #[test]
    fn test_png_data_url_preserves_pixels() {
        let mut image = RgbaImage::filled(3, 2, [255, 255, 255, 255]);
        image.pixel_mut(1, 1).unwrap().copy_from_slice(&[10, 20, 30, 255]);

        let url = encode_png_data_url(&image).unwrap();
        assert!(url.starts_with(PNG_DATA_URL_PREFIX));

        let decoded = decode_png_data_url(&url).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_decode_bare_base64() {
        let image = RgbaImage::filled(1, 1, [0, 0, 0, 255]);
        let png_bytes = encode_png(&image).unwrap();
        let bare = BASE64.encode(&png_bytes);
        assert_eq!(decode_data_url(&bare).unwrap(), png_bytes);
    }

    #[test]
    fn test_decode_rgb_png_gets_opaque_alpha() {
        let mut out = Vec::new();
        {
            let mut encoder = Encoder::new(&mut out, 2, 1);
            encoder.set_color(ColorType::Rgb);
            encoder.set_depth(BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[1, 2, 3, 4, 5, 6]).unwrap();
        }
        let image = decode_png(&out).unwrap();
        assert_eq!(image.pixel(1, 0), Some([4, 5, 6, 255]));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(decode_data_url("data:image/png;base64,!!!").is_err());
        assert!(decode_png(b"not a png").is_err());
        assert!(RgbaImage::from_raw(2, 2, vec![0; 3]).is_err());
    }

    #[test]
    fn test_pixmap_conversion_keeps_pixels() {
        let image = RgbaImage::from_raw(1, 1, vec![200, 100, 50, 255]).unwrap();
        assert_eq!(RgbaImage::from_pixmap(&image.to_pixmap().unwrap()), image);
        assert!(RgbaImage::filled(0, 3, [0, 0, 0, 0]).to_pixmap().is_err());
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let image = RgbaImage::filled(2, 2, [0, 0, 0, 0]);
        assert!(image.pixel(2, 0).is_none());
    }
}

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::{info, warn};

/// Largest texture side accepted by default device limits.
pub const MAX_TEXTURE_SIZE: u32 = 8192;

/// Decoded RGBA8 pixels, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Decodes an image file; the format is guessed from its contents.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("unable to read {}", path.display()))?;
        Self::from_bytes(&bytes).with_context(|| format!("unable to decode {}", path.display()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(anyhow!("image has zero area"));
        }
        Ok(Self {
            width,
            height,
            pixels: image.into_raw(),
        })
    }

    /// Loads `path`, falling back to a grey checkerboard when it is missing or unreadable.
    pub fn load_or_checkerboard(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path).and_then(|texture| texture.fit_within(MAX_TEXTURE_SIZE)) {
            Ok(texture) => {
                info!(
                    "loaded texture {} ({}x{})",
                    path.display(),
                    texture.width,
                    texture.height
                );
                texture
            }
            Err(err) => {
                warn!("{err:#}; using a procedural checkerboard");
                Self::checkerboard(256, 8, [200, 200, 200, 255], [90, 90, 110, 255])
            }
        }
    }

    /// Square checkerboard of `cells` x `cells` squares alternating between two colors.
    pub fn checkerboard(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let mut pixels = Vec::with_capacity(size as usize * size as usize * 4);
        for y in 0..size {
            for x in 0..size {
                let color = if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b };
                pixels.extend_from_slice(&color);
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    /// Scales the image down, keeping its aspect ratio, until neither side exceeds `max_size`.
    pub fn fit_within(self, max_size: u32) -> Result<Self> {
        let max_size = max_size.max(1);
        let (width, height) = (self.width, self.height);
        if width <= max_size && height <= max_size {
            return Ok(self);
        }
        let image = image::RgbaImage::from_raw(width, height, self.pixels)
            .ok_or_else(|| anyhow!("pixel buffer does not match {width}x{height}"))?;
        let scale = f64::from(max_size) / f64::from(width.max(height));
        let fit = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, max_size);
        let (new_width, new_height) = (fit(width), fit(height));
        warn!("texture is {width}x{height}; downscaling to {new_width}x{new_height}");
        let resized = image::imageops::resize(
            &image,
            new_width,
            new_height,
            image::imageops::FilterType::Triangle,
        );
        Ok(Self {
            width: new_width,
            height: new_height,
            pixels: resized.into_raw(),
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    #[test]
    fn checkerboard_alternates_cells() {
        let texture = TextureData::checkerboard(8, 4, WHITE, BLACK);
        assert_eq!(texture.pixels.len(), 8 * 8 * 4);
        assert_eq!(texture.pixel(0, 0), WHITE);
        assert_eq!(texture.pixel(1, 1), WHITE);
        assert_eq!(texture.pixel(2, 0), BLACK);
        assert_eq!(texture.pixel(2, 2), WHITE);
    }

    #[test]
    fn decodes_png_files() {
        let mut image = image::RgbaImage::new(2, 1);
        image.put_pixel(1, 0, image::Rgba([10, 20, 30, 255]));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        image.save(&path).unwrap();

        let texture = TextureData::load(&path).unwrap();
        assert_eq!((texture.width, texture.height), (2, 1));
        assert_eq!(texture.pixel(1, 0), [10, 20, 30, 255]);
    }

    #[test]
    fn oversized_textures_are_downscaled() {
        let texture = TextureData::checkerboard(16, 2, WHITE, BLACK);
        let small = texture.clone().fit_within(32).unwrap();
        assert_eq!(small, texture);

        let wide = TextureData {
            width: 16,
            height: 8,
            pixels: vec![128; 16 * 8 * 4],
        };
        let fitted = wide.fit_within(4).unwrap();
        assert_eq!((fitted.width, fitted.height), (4, 2));
        assert_eq!(fitted.pixels.len(), 4 * 2 * 4);

        let broken = TextureData {
            width: 16,
            height: 16,
            pixels: vec![0; 4],
        };
        assert!(broken.fit_within(4).is_err());
    }

    #[test]
    fn loaded_texture_respects_device_limit() {
        let image = image::RgbaImage::from_pixel(MAX_TEXTURE_SIZE + 8, 2, image::Rgba(WHITE));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        image.save(&path).unwrap();

        let texture = TextureData::load_or_checkerboard(&path);
        assert_eq!((texture.width, texture.height), (MAX_TEXTURE_SIZE, 2));
        assert_eq!(texture.pixels.len(), MAX_TEXTURE_SIZE as usize * 2 * 4);
    }

    #[test]
    fn missing_file_falls_back_to_checkerboard() {
        let texture = TextureData::load_or_checkerboard("does/not/exist.png");
        assert_eq!((texture.width, texture.height), (256, 256));
        assert!(TextureData::load("does/not/exist.png").is_err());
    }
}

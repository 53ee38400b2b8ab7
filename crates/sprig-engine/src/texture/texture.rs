use std::path::Path;

use image::RgbaImage;

use crate::coords::Vec2;
use crate::error::EngineError;

/// Decoded image pixels in straight-alpha sRGB RGBA8.
///
/// Dimensions are fixed for the lifetime of the texture; this is what makes
/// a sprite's natural size immutable once it is ready.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pixels: RgbaImage,
}

impl Texture {
    #[inline]
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Decodes an encoded image (PNG, JPEG, ...) from memory.
    pub fn decode(bytes: &[u8]) -> Result<Self, EngineError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_rgba(img.into_rgba8()))
    }

    /// Reads and decodes an image file. Blocking.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let img = image::open(path)?;
        Ok(Self::from_rgba(img.into_rgba8()))
    }

    /// A texture filled with one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_rgba(RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Natural size in pixels.
    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32)
    }

    /// Texel at `(x, y)`, or `None` outside the image.
    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixels.get_pixel_checked(x, y).map(|p| p.0)
    }

    #[inline]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

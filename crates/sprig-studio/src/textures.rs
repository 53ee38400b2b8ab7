//! Procedural textures so the demo runs without asset files.

use image::{Rgba, RgbaImage};
use sprig_engine::Texture;

/// Vertical two-colour gradient.
pub fn sky(width: u32, height: u32) -> Texture {
    let (top, bottom) = ([18.0, 22.0, 48.0], [70.0, 40.0, 90.0]);
    Texture::from_rgba(RgbaImage::from_fn(width, height, |_, y| {
        let t = y as f32 / height.max(1) as f32;
        let c = |i: usize| (top[i] + (bottom[i] - top[i]) * t) as u8;
        Rgba([c(0), c(1), c(2), 255])
    }))
}

/// Anti-aliased filled disc on a transparent background.
pub fn disc(size: u32, rgb: [u8; 3]) -> Texture {
    let r = size as f32 / 2.0;
    Texture::from_rgba(RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - r;
        let dy = y as f32 + 0.5 - r;
        let coverage = (r - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
        Rgba([rgb[0], rgb[1], rgb[2], (coverage * 255.0) as u8])
    }))
}

/// Square checkerboard with `cells` cells per side.
pub fn checker(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> Texture {
    let cell = (size / cells.max(1)).max(1);
    Texture::from_rgba(RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgba(a)
        } else {
            Rgba(b)
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disc_is_opaque_in_the_middle_and_clear_in_corners() {
        let t = disc(16, [255, 255, 255]);
        assert_eq!(t.texel(8, 8).map(|p| p[3]), Some(255));
        assert_eq!(t.texel(0, 0).map(|p| p[3]), Some(0));
    }

    #[test]
    fn checker_alternates() {
        let t = checker(4, 2, [1, 1, 1, 255], [2, 2, 2, 255]);
        assert_eq!(t.texel(0, 0), Some([1, 1, 1, 255]));
        assert_eq!(t.texel(2, 0), Some([2, 2, 2, 255]));
        assert_eq!(t.texel(2, 2), Some([1, 1, 1, 255]));
    }
}

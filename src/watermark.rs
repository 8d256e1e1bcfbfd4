// Tileable watermark composited into the mask on every full repaint.
// Visual: a repeating pattern printed on the scratch-off layer; it disappears
// wherever the layer is scratched away.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use image::RgbaImage;

use crate::compose::blend_over;
use crate::error::Error;

/// Decoded watermark tile in packed `0xAARRGGBB`.
#[derive(Clone, Debug)]
pub struct Watermark {
    width: usize,
    height: usize,
    pixels: Arc<[u32]>, // shared; clones are cheap
}

impl Watermark {
    /// Side of the built-in procedural tile, in pixels.
    pub const BUILTIN_TILE: usize = 48;

    /// Decode an image file (any format the `image` crate understands).
    pub fn load(path: &Path) -> Result<Self, Error> {
        let img = image::open(path)
            .map_err(|source| Error::ImageLoad { path: path.to_path_buf(), source })?
            .to_rgba8();
        tracing::debug!(path = %path.display(), width = img.width(), height = img.height(), "watermark loaded");
        Ok(Self::from_rgba(&img))
    }

    /// Build a tile from an RGBA image buffer.
    pub fn from_rgba(img: &RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        let pixels: Vec<u32> = img
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
            })
            .collect();
        Self { width: w as usize, height: h as usize, pixels: pixels.into() }
    }

    /// Procedural tile: a translucent white diamond outline with a dot in the middle.
    pub fn builtin() -> Self {
        let n = Self::BUILTIN_TILE;
        let c = (n / 2) as i32;
        let mut pixels = vec![0u32; n * n];
        for y in 0..n as i32 {
            for x in 0..n as i32 {
                let d = (x - c).abs() + (y - c).abs();
                let on_outline = (d - c / 2).abs() <= 1;
                let on_dot = d <= 2;
                if on_outline || on_dot {
                    pixels[y as usize * n + x as usize] = 0x60FF_FFFF;
                }
            }
        }
        Self { width: n, height: n, pixels: pixels.into() }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel of the infinitely repeated tile at (x, y).
    #[inline]
    pub fn sample(&self, x: usize, y: usize) -> u32 {
        self.pixels[(y % self.height) * self.width + (x % self.width)]
    }

    /// Tile the watermark over a `width`×`height` ARGB buffer, source-over.
    pub fn tile_over(&self, dst: &mut [u32], width: usize, height: usize) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        for y in 0..height {
            let row = &mut dst[y * width..(y + 1) * width];
            for (x, px) in row.iter_mut().enumerate() {
                let src = self.sample(x, y);
                if src >> 24 == 0 {
                    continue; // transparent tile texel leaves the mask color alone
                }
                *px = blend_over(src, *px);
            }
        }
    }
}

/// Where the watermark comes from: `none`, `builtin`, or a path to an image file.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkSource {
    #[default]
    None,
    Builtin,
    File(std::path::PathBuf),
}

impl WatermarkSource {
    /// Resolve the source into a decoded tile (`None` means no watermark).
    pub fn load(&self) -> Result<Option<Watermark>, Error> {
        match self {
            Self::None => Ok(None),
            Self::Builtin => Ok(Some(Watermark::builtin())),
            Self::File(path) => Watermark::load(path).map(Some),
        }
    }
}

impl FromStr for WatermarkSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "" | "none" | "-1" => Self::None,
            "builtin" => Self::Builtin,
            other => Self::File(other.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn from_rgba_packs_argb() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([0x11, 0x22, 0x33, 0x44]));
        img.put_pixel(1, 0, Rgba([0xFF, 0x00, 0x00, 0xFF]));
        let wm = Watermark::from_rgba(&img);
        assert_eq!((wm.width(), wm.height()), (2, 1));
        assert_eq!(wm.sample(0, 0), 0x4411_2233);
        assert_eq!(wm.sample(1, 0), 0xFFFF_0000);
        // wraps in both axes
        assert_eq!(wm.sample(2, 5), 0x4411_2233);
    }

    #[test]
    fn tile_over_repeats_and_skips_transparent_texels() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([0, 0, 255, 255]));
        let wm = Watermark::from_rgba(&img);

        let (w, h) = (5, 3);
        let mut buf = vec![0xFF88_8888u32; w * h];
        wm.tile_over(&mut buf, w, h);

        for y in 0..h {
            for x in 0..w {
                let expect = if x % 2 == 0 && y % 2 == 0 { 0xFF00_00FF } else { 0xFF88_8888 };
                assert_eq!(buf[y * w + x], expect, "pixel ({x},{y})");
            }
        }
    }

    #[test]
    fn builtin_tile_is_translucent_and_not_empty() {
        let wm = Watermark::builtin();
        let n = Watermark::BUILTIN_TILE;
        let mut lit = 0;
        for y in 0..n {
            for x in 0..n {
                let a = wm.sample(x, y) >> 24;
                assert!(a < 0xFF, "builtin texels must be translucent");
                if a > 0 {
                    lit += 1;
                }
            }
        }
        assert!(lit > 0);
    }

    #[test]
    fn source_parsing() {
        assert_eq!("none".parse::<WatermarkSource>().unwrap(), WatermarkSource::None);
        assert_eq!("-1".parse::<WatermarkSource>().unwrap(), WatermarkSource::None);
        assert_eq!("builtin".parse::<WatermarkSource>().unwrap(), WatermarkSource::Builtin);
        assert_eq!(
            "assets/wechat.png".parse::<WatermarkSource>().unwrap(),
            WatermarkSource::File("assets/wechat.png".into())
        );
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let err = WatermarkSource::File("/definitely/not/here.png".into()).load().unwrap_err();
        assert!(matches!(err, Error::ImageLoad { .. }));
    }

    #[test]
    fn load_decodes_png_into_argb_texels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mark.png");
        let mut img = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 0, 0]));
        img.put_pixel(0, 0, Rgba([0x11, 0x22, 0x33, 0x80]));
        img.put_pixel(2, 1, Rgba([0xFF, 0xFF, 0xFF, 0xFF]));
        img.save(&path).unwrap();

        let mark = Watermark::load(&path).unwrap();
        assert_eq!((mark.width(), mark.height()), (3, 2));
        assert_eq!(mark.sample(0, 0), 0x8011_2233);
        assert_eq!(mark.sample(2, 1), 0xFFFF_FFFF);
        assert_eq!(mark.sample(1, 0), 0);

        let via_source = WatermarkSource::File(path).load().unwrap().unwrap();
        assert_eq!(via_source.sample(3, 2), 0x8011_2233, "tile wraps");
    }
}

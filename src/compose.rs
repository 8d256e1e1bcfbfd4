// Pixel compositing: the mask over the revealed picture, plus picture loading.
// Visual: where the mask is opaque you see gray (or the chosen color); where it
// was scratched away you see the picture underneath.

use std::path::Path;

use image::{RgbaImage, imageops::FilterType};

use crate::error::Error;
use crate::gamma::GammaLut;
use crate::types::FrameBuffer;

/// Source-over of one non-premultiplied `0xAARRGGBB` pixel onto another.
pub fn blend_over(src: u32, dst: u32) -> u32 {
    let sa = src >> 24;
    if sa == 0xFF {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let da = dst >> 24;
    let inv = 255 - sa;
    let oa = sa + (da * inv + 127) / 255;
    if oa == 0 {
        return 0;
    }
    let denom = oa * 255;
    let mut out = oa << 24;
    for shift in [16u32, 8, 0] {
        let s = (src >> shift) & 0xFF;
        let d = (dst >> shift) & 0xFF;
        let v = (s * sa * 255 + d * da * inv + denom / 2) / denom;
        out |= v.min(255) << shift;
    }
    out
}

/// Draw the ARGB mask over `base` into `out` (all three the same size).
///
/// Pixels with alpha 0 show `base` untouched, alpha 255 shows the mask color,
/// anything in between (antialiased stroke rims, translucent mask colors) is
/// mixed in linear light.
pub fn composite_mask(base: &FrameBuffer, mask: &[u32], out: &mut FrameBuffer, lut: &GammaLut) {
    let len = out.width * out.height;
    if base.width != out.width || base.height != out.height || mask.len() != len {
        tracing::warn!(
            base = ?(base.width, base.height),
            out = ?(out.width, out.height),
            mask_len = mask.len(),
            "composite skipped: size mismatch"
        );
        if base.pixels.len() == out.pixels.len() {
            out.pixels.copy_from_slice(&base.pixels);
        }
        return;
    }

    for ((dst, &under), &m) in out.pixels.iter_mut().zip(&base.pixels).zip(mask) {
        let a = m >> 24;
        *dst = match a {
            0 => under,
            0xFF => m & 0x00FF_FFFF,
            _ => lut.mix_rgb(m, under, a as f32 / 255.0),
        };
    }
}

/// Decode the picture hidden under the mask.
pub fn load_picture(path: &Path) -> Result<RgbaImage, Error> {
    let img = image::open(path)
        .map_err(|source| Error::ImageLoad { path: path.to_path_buf(), source })?
        .to_rgba8();
    tracing::info!(path = %path.display(), width = img.width(), height = img.height(), "picture loaded");
    Ok(img)
}

/// Scale `img` to cover `width`×`height` (center-cropped), packed for the window.
pub fn fit_picture(img: &RgbaImage, width: usize, height: usize) -> FrameBuffer {
    let mut fb = FrameBuffer::new(width, height);
    let (iw, ih) = img.dimensions();
    if width == 0 || height == 0 || iw == 0 || ih == 0 {
        return fb;
    }

    let scale = (width as f32 / iw as f32).max(height as f32 / ih as f32);
    let sw = ((iw as f32 * scale).ceil() as u32).max(width as u32);
    let sh = ((ih as f32 * scale).ceil() as u32).max(height as u32);
    let scaled = image::imageops::resize(img, sw, sh, FilterType::Triangle);
    let ox = (sw as usize - width) / 2;
    let oy = (sh as usize - height) / 2;

    for y in 0..height {
        for x in 0..width {
            let [r, g, b, _] = scaled.get_pixel((x + ox) as u32, (y + oy) as u32).0;
            fb.pixels[y * width + x] = (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);
        }
    }
    fb
}

/// Picture used when none is configured: a warm diagonal gradient with stripes.
pub fn placeholder_picture(width: usize, height: usize) -> FrameBuffer {
    let mut fb = FrameBuffer::new(width, height);
    let span = (width + height).max(1) as f32;
    for y in 0..height {
        for x in 0..width {
            let t = (x + y) as f32 / span;
            let stripe = ((x + 2 * y) / 24) % 2 == 0;
            let boost = if stripe { 0 } else { 24 };
            let r = 255u32;
            let g = (80.0 + 150.0 * t) as u32 + boost;
            let b = (40.0 + 60.0 * (1.0 - t)) as u32;
            fb.pixels[y * width + x] = (r << 16) | (g.min(255) << 8) | b.min(255);
        }
    }
    fb
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn blend_over_opaque_and_transparent_sources() {
        assert_eq!(blend_over(0xFF12_3456, 0xFF88_8888), 0xFF12_3456);
        assert_eq!(blend_over(0x0012_3456, 0xFF88_8888), 0xFF88_8888);
    }

    #[test]
    fn blend_over_translucent_on_opaque_stays_opaque() {
        let out = blend_over(0x80FF_FFFF, 0xFF00_0000);
        assert_eq!(out >> 24, 0xFF);
        let r = (out >> 16) & 0xFF;
        assert!((126..=130).contains(&r), "got {r}");
    }

    #[test]
    fn blend_over_onto_transparent_keeps_source_color() {
        let out = blend_over(0x80FF_0000, 0x0000_0000);
        assert_eq!(out, 0x80FF_0000);
    }

    #[test]
    fn composite_shows_picture_only_where_erased() {
        let lut = GammaLut::new();
        let base = FrameBuffer { width: 3, height: 1, pixels: vec![0x0011_2233; 3] };
        let mask = [0xFF88_8888, 0x0000_0000, 0x8000_0000];
        let mut out = FrameBuffer::new(3, 1);
        composite_mask(&base, &mask, &mut out, &lut);
        assert_eq!(out.pixels[0], 0x0088_8888);
        assert_eq!(out.pixels[1], 0x0011_2233);
        assert_ne!(out.pixels[2], 0x0011_2233);
    }

    #[test]
    fn composite_size_mismatch_falls_back_to_picture() {
        let lut = GammaLut::new();
        let base = FrameBuffer { width: 2, height: 1, pixels: vec![7, 9] };
        let mut out = FrameBuffer::new(2, 1);
        composite_mask(&base, &[0xFFFF_FFFF], &mut out, &lut);
        assert_eq!(out.pixels, vec![7, 9]);
    }

    #[test]
    fn fit_picture_covers_target() {
        let img = RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255]));
        let fb = fit_picture(&img, 6, 6);
        assert_eq!((fb.width, fb.height), (6, 6));
        for &p in &fb.pixels {
            let (r, g, b) = ((p >> 16) & 0xFF, (p >> 8) & 0xFF, p & 0xFF);
            assert!(r.abs_diff(10) <= 1 && g.abs_diff(20) <= 1 && b.abs_diff(30) <= 1, "got {p:06X}");
        }
    }

    #[test]
    fn placeholder_has_requested_size() {
        let fb = placeholder_picture(17, 9);
        assert_eq!(fb.pixels.len(), 17 * 9);
    }

    #[test]
    fn loaded_png_is_fitted_to_the_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picture.png");
        // left half red, right half blue
        let img = RgbaImage::from_fn(8, 4, |x, _| if x < 4 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 0, 255, 255]) });
        img.save(&path).unwrap();

        let loaded = load_picture(&path).unwrap();
        assert_eq!(loaded.dimensions(), (8, 4));

        let fb = fit_picture(&loaded, 4, 2);
        assert_eq!((fb.width, fb.height), (4, 2));
        let near = |p: u32, rgb: u32| (0..3).all(|i| ((p >> (8 * i)) & 0xFF).abs_diff((rgb >> (8 * i)) & 0xFF) <= 2);
        assert!(near(fb.pixels[0], 0xFF_0000), "got {:06X}", fb.pixels[0]);
        assert!(near(fb.pixels[3], 0x00_00FF), "got {:06X}", fb.pixels[3]);
        assert!(fb.pixels.iter().all(|p| p >> 24 == 0), "packed for the window without alpha");
    }

    #[test]
    fn load_picture_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");
        match load_picture(&path) {
            Err(Error::ImageLoad { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected {other:?}"),
        }
    }
}

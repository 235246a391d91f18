use std::path::Path;

use glam::Vec2;
use image::RgbaImage;
use objvox_core::Argb;
use tracing::{debug, warn};

/// Decode an image file to RGBA8. Missing or unreadable files yield `None`.
pub fn load_texture(path: &Path) -> Option<RgbaImage> {
    if !path.is_file() {
        debug!(path = %path.display(), "texture not found");
        return None;
    }
    match image::open(path) {
        Ok(img) => Some(img.to_rgba8()),
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to decode texture; ignoring");
            None
        }
    }
}

/// Sample `image` at texture coordinate `uv`.
///
/// Coordinates wrap modulo the image size and V is flipped so that `v = 0` is the
/// bottom row. An empty image samples as transparent.
pub fn sample_texture(image: &RgbaImage, uv: Vec2) -> Argb {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Argb::TRANSPARENT;
    }
    let x = wrap(uv.x, w);
    let y = h - 1 - wrap(uv.y, h);
    Argb::from_rgba(image.get_pixel(x, y).0)
}

fn wrap(coord: f32, size: u32) -> u32 {
    let texel = (coord * size as f32).floor();
    if !texel.is_finite() {
        return 0;
    }
    (texel as i64).rem_euclid(i64::from(size)) as u32
}

/// Mean color of the opaque pixels of a block texture.
///
/// Pixels with zero alpha are skipped. An image without any visible pixel
/// averages to [`Argb::TRANSPARENT`].
pub fn average_color(image: &RgbaImage) -> Argb {
    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for px in image.pixels() {
        if px.0[3] == 0 {
            continue;
        }
        sum[0] += u64::from(px.0[0]);
        sum[1] += u64::from(px.0[1]);
        sum[2] += u64::from(px.0[2]);
        count += 1;
    }
    if count == 0 {
        return Argb::TRANSPARENT;
    }
    Argb::opaque(
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn two_rows() -> RgbaImage {
        // Top row red, bottom row blue.
        let mut img = RgbaImage::new(2, 2);
        for x in 0..2 {
            img.put_pixel(x, 0, Rgba([255, 0, 0, 255]));
            img.put_pixel(x, 1, Rgba([0, 0, 255, 255]));
        }
        img
    }

    #[test]
    fn v_axis_is_flipped() {
        let img = two_rows();
        assert_eq!(sample_texture(&img, Vec2::new(0.1, 0.1)), Argb::opaque(0, 0, 255));
        assert_eq!(sample_texture(&img, Vec2::new(0.1, 0.9)), Argb::opaque(255, 0, 0));
    }

    #[test]
    fn out_of_range_uv_wraps() {
        let img = two_rows();
        assert_eq!(
            sample_texture(&img, Vec2::new(3.1, 1.1)),
            sample_texture(&img, Vec2::new(0.1, 0.1))
        );
        assert_eq!(
            sample_texture(&img, Vec2::new(-0.9, -0.1)),
            sample_texture(&img, Vec2::new(0.1, 0.9))
        );
        assert_eq!(
            sample_texture(&img, Vec2::new(f32::NAN, 0.0)),
            sample_texture(&img, Vec2::new(0.0, 0.0))
        );
    }

    #[test]
    fn average_skips_transparent_pixels() {
        let mut img = two_rows();
        img.put_pixel(0, 0, Rgba([0, 255, 0, 0]));
        let avg = average_color(&img);
        assert_eq!(avg, Argb::opaque(85, 0, 170));
    }

    #[test]
    fn fully_transparent_image_averages_to_transparent() {
        let img = RgbaImage::new(4, 4);
        assert_eq!(average_color(&img), Argb::TRANSPARENT);
    }

    #[test]
    fn missing_texture_is_none() {
        assert!(load_texture(Path::new("definitely/not/here.png")).is_none());
    }
}

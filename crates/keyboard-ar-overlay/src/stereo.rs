//! Frame presentation helpers for head-mounted (Cardboard) viewing.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage, RgbaImage};

/// Squeeze `frame` to half width and place it in both halves of an output
/// of the original size, one copy per eye.
pub fn side_by_side(frame: &RgbImage) -> RgbImage {
    let (w, h) = frame.dimensions();
    let half_w = w / 2;
    let mut out = RgbImage::new(w, h);
    if half_w == 0 || h == 0 {
        return out;
    }

    let half = imageops::resize(frame, half_w, h, FilterType::Triangle);
    imageops::replace(&mut out, &half, 0, 0);
    imageops::replace(&mut out, &half, half_w as i64, 0);
    out
}

/// Drop the alpha channel of a camera frame.
pub fn rgba_to_rgb(frame: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b, _] = frame.get_pixel(x, y).0;
        Rgb([r, g, b])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn halves_are_identical_copies() {
        let frame = RgbImage::from_fn(8, 4, |x, _| Rgb([(x * 30) as u8, 0, 0]));
        let out = side_by_side(&frame);
        assert_eq!(out.dimensions(), (8, 4));
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(out.get_pixel(x, y), out.get_pixel(x + 4, y));
            }
        }
    }

    #[test]
    fn uniform_frame_stays_uniform() {
        let frame = RgbImage::from_pixel(10, 6, Rgb([12, 34, 56]));
        let out = side_by_side(&frame);
        assert!(out.pixels().all(|p| *p == Rgb([12, 34, 56])));
    }

    #[test]
    fn odd_width_leaves_last_column_black() {
        let frame = RgbImage::from_pixel(5, 2, Rgb([200, 200, 200]));
        let out = side_by_side(&frame);
        assert_eq!(*out.get_pixel(3, 0), Rgb([200, 200, 200]));
        assert_eq!(*out.get_pixel(4, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn alpha_is_dropped() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4]));
        let rgb = rgba_to_rgb(&rgba);
        assert!(rgb.pixels().all(|p| *p == Rgb([1, 2, 3])));
    }
}

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;

/// Draw a segment `thickness` pixels wide with round caps.
pub(crate) fn draw_thick_segment(
    img: &mut RgbImage,
    a: (f32, f32),
    b: (f32, f32),
    thickness: f32,
    color: Rgb<u8>,
) {
    let radius = 0.5 * thickness;
    if radius < 1.0 {
        draw_line_segment_mut(img, a, b, color);
        return;
    }

    let r = radius.round() as i32;
    draw_filled_circle_mut(img, round_pt(a), r, color);
    draw_filled_circle_mut(img, round_pt(b), r, color);

    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-3 {
        return;
    }
    let (nx, ny) = (-dy / len * radius, dx / len * radius);
    let poly = [
        to_point(a.0 + nx, a.1 + ny),
        to_point(b.0 + nx, b.1 + ny),
        to_point(b.0 - nx, b.1 - ny),
        to_point(a.0 - nx, a.1 - ny),
    ];
    // draw_polygon_mut rejects closed rings; tiny segments are covered by the caps.
    if poly[0] != poly[3] {
        draw_polygon_mut(img, &poly, color);
    }
}

#[inline]
fn round_pt(p: (f32, f32)) -> (i32, i32) {
    (p.0.round() as i32, p.1.round() as i32)
}

#[inline]
fn to_point(x: f32, y: f32) -> Point<i32> {
    Point::new(x.round() as i32, y.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thick_segment_covers_its_width() {
        let mut img = RgbImage::new(40, 20);
        let red = Rgb([255, 0, 0]);
        draw_thick_segment(&mut img, (5.0, 10.0), (35.0, 10.0), 6.0, red);
        assert_eq!(*img.get_pixel(20, 8), red);
        assert_eq!(*img.get_pixel(20, 12), red);
        assert_eq!(*img.get_pixel(20, 2), Rgb([0, 0, 0]));
    }

    #[test]
    fn segments_leaving_the_image_are_clipped() {
        let mut img = RgbImage::new(10, 10);
        draw_thick_segment(&mut img, (-20.0, 5.0), (30.0, 5.0), 4.0, Rgb([1, 2, 3]));
        assert_eq!(*img.get_pixel(0, 5), Rgb([1, 2, 3]));
        assert_eq!(*img.get_pixel(9, 5), Rgb([1, 2, 3]));
    }
}

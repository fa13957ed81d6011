//! Embedded single-stroke font for note and chord labels.
//!
//! Glyphs live on a 12 × 20 unit grid, y down, baseline at y = 20. At scale
//! 1.0 a capital is 22 px tall, roughly matching a Hershey simplex face.

use super::stroke::draw_thick_segment;
use image::{Rgb, RgbImage};

const GLYPH_HEIGHT: f32 = 20.0;
const ADVANCE: f32 = 16.0;
const PX_PER_UNIT: f32 = 1.1;

type Stroke = &'static [(f32, f32)];

fn glyph(c: char) -> Option<&'static [Stroke]> {
    let strokes: &'static [Stroke] = match c.to_ascii_uppercase() {
        'A' => &[
            &[(0.0, 20.0), (6.0, 0.0), (12.0, 20.0)],
            &[(2.5, 13.0), (9.5, 13.0)],
        ],
        'B' => &[
            &[(0.0, 0.0), (0.0, 20.0)],
            &[(0.0, 0.0), (8.0, 0.0), (11.0, 2.0), (11.0, 8.0), (8.0, 10.0), (0.0, 10.0)],
            &[(8.0, 10.0), (12.0, 12.0), (12.0, 18.0), (9.0, 20.0), (0.0, 20.0)],
        ],
        'C' => &[&[
            (12.0, 4.0),
            (9.0, 0.0),
            (3.0, 0.0),
            (0.0, 4.0),
            (0.0, 16.0),
            (3.0, 20.0),
            (9.0, 20.0),
            (12.0, 16.0),
        ]],
        'D' => &[&[
            (0.0, 0.0),
            (0.0, 20.0),
            (7.0, 20.0),
            (12.0, 15.0),
            (12.0, 5.0),
            (7.0, 0.0),
            (0.0, 0.0),
        ]],
        'E' => &[
            &[(12.0, 0.0), (0.0, 0.0), (0.0, 20.0), (12.0, 20.0)],
            &[(0.0, 10.0), (8.0, 10.0)],
        ],
        'F' => &[
            &[(12.0, 0.0), (0.0, 0.0), (0.0, 20.0)],
            &[(0.0, 10.0), (8.0, 10.0)],
        ],
        'G' => &[&[
            (12.0, 4.0),
            (9.0, 0.0),
            (3.0, 0.0),
            (0.0, 4.0),
            (0.0, 16.0),
            (3.0, 20.0),
            (9.0, 20.0),
            (12.0, 16.0),
            (12.0, 11.0),
            (7.0, 11.0),
        ]],
        'H' => &[
            &[(0.0, 0.0), (0.0, 20.0)],
            &[(12.0, 0.0), (12.0, 20.0)],
            &[(0.0, 10.0), (12.0, 10.0)],
        ],
        '0' => &[&[
            (3.0, 0.0),
            (9.0, 0.0),
            (12.0, 4.0),
            (12.0, 16.0),
            (9.0, 20.0),
            (3.0, 20.0),
            (0.0, 16.0),
            (0.0, 4.0),
            (3.0, 0.0),
        ]],
        '1' => &[&[(3.0, 4.0), (7.0, 0.0), (7.0, 20.0)]],
        '2' => &[&[
            (0.0, 4.0),
            (3.0, 0.0),
            (9.0, 0.0),
            (12.0, 4.0),
            (12.0, 8.0),
            (0.0, 20.0),
            (12.0, 20.0),
        ]],
        '3' => &[
            &[
                (0.0, 2.0),
                (3.0, 0.0),
                (9.0, 0.0),
                (12.0, 3.0),
                (12.0, 7.0),
                (9.0, 10.0),
                (4.0, 10.0),
            ],
            &[
                (9.0, 10.0),
                (12.0, 13.0),
                (12.0, 17.0),
                (9.0, 20.0),
                (3.0, 20.0),
                (0.0, 18.0),
            ],
        ],
        '4' => &[&[(9.0, 20.0), (9.0, 0.0), (0.0, 14.0), (12.0, 14.0)]],
        '5' => &[&[
            (12.0, 0.0),
            (1.0, 0.0),
            (0.0, 9.0),
            (8.0, 8.0),
            (12.0, 12.0),
            (12.0, 17.0),
            (9.0, 20.0),
            (3.0, 20.0),
            (0.0, 18.0),
        ]],
        '6' => &[&[
            (11.0, 2.0),
            (8.0, 0.0),
            (4.0, 0.0),
            (0.0, 5.0),
            (0.0, 16.0),
            (3.0, 20.0),
            (9.0, 20.0),
            (12.0, 16.0),
            (12.0, 13.0),
            (9.0, 10.0),
            (3.0, 10.0),
            (0.0, 13.0),
        ]],
        '7' => &[&[(0.0, 0.0), (12.0, 0.0), (4.0, 20.0)]],
        '8' => &[
            &[
                (3.0, 0.0),
                (9.0, 0.0),
                (12.0, 3.0),
                (12.0, 7.0),
                (9.0, 10.0),
                (3.0, 10.0),
                (0.0, 7.0),
                (0.0, 3.0),
                (3.0, 0.0),
            ],
            &[
                (3.0, 10.0),
                (0.0, 13.0),
                (0.0, 17.0),
                (3.0, 20.0),
                (9.0, 20.0),
                (12.0, 17.0),
                (12.0, 13.0),
                (9.0, 10.0),
            ],
        ],
        '9' => &[&[
            (12.0, 7.0),
            (9.0, 10.0),
            (3.0, 10.0),
            (0.0, 7.0),
            (0.0, 3.0),
            (3.0, 0.0),
            (9.0, 0.0),
            (12.0, 4.0),
            (12.0, 15.0),
            (8.0, 20.0),
            (4.0, 20.0),
            (1.0, 18.0),
        ]],
        '-' => &[&[(2.0, 12.0), (10.0, 12.0)]],
        _ => return None,
    };
    Some(strokes)
}

/// Horizontal extent of `text` at `scale`, in pixels.
pub fn text_width(text: &str, scale: f32) -> f32 {
    text.chars().count() as f32 * ADVANCE * PX_PER_UNIT * scale
}

/// Draw `text` with its baseline-left corner at `origin`.
///
/// Characters without a glyph advance the pen but draw nothing.
pub fn draw_text(
    img: &mut RgbImage,
    text: &str,
    origin: (f32, f32),
    scale: f32,
    thickness: u32,
    color: Rgb<u8>,
) {
    let px = PX_PER_UNIT * scale;
    let mut pen_x = origin.0;
    for c in text.chars() {
        if let Some(strokes) = glyph(c) {
            for stroke in strokes {
                for pair in stroke.windows(2) {
                    let a = (pen_x + pair[0].0 * px, origin.1 - (GLYPH_HEIGHT - pair[0].1) * px);
                    let b = (pen_x + pair[1].0 * px, origin.1 - (GLYPH_HEIGHT - pair[1].1) * px);
                    draw_thick_segment(img, a, b, thickness as f32, color);
                }
            }
        }
        pen_x += ADVANCE * px;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(img: &RgbImage) -> usize {
        img.pixels().filter(|p| p.0 != [0, 0, 0]).count()
    }

    #[test]
    fn every_label_character_has_a_glyph() {
        for c in "ABCDEFGH0123456789-".chars() {
            assert!(glyph(c).is_some(), "missing glyph for {c}");
        }
        assert!(glyph('?').is_none());
    }

    #[test]
    fn text_stays_above_the_baseline() {
        let mut img = RgbImage::new(120, 60);
        draw_text(&mut img, "C4", (10.0, 40.0), 1.0, 1, Rgb([0, 210, 0]));
        assert!(lit(&img) > 0);
        for (_, y, p) in img.enumerate_pixels() {
            if p.0 != [0, 0, 0] {
                assert!(y <= 41 && y >= 17, "pixel at row {y}");
            }
        }
    }

    #[test]
    fn unknown_characters_only_advance() {
        let mut a = RgbImage::new(100, 40);
        let mut b = RgbImage::new(100, 40);
        draw_text(&mut a, "?", (5.0, 30.0), 1.0, 2, Rgb([255, 255, 255]));
        assert_eq!(lit(&a), 0);
        draw_text(&mut a, "?E", (5.0, 30.0), 1.0, 2, Rgb([255, 255, 255]));
        draw_text(&mut b, "E", (5.0 + text_width("?", 1.0), 30.0), 1.0, 2, Rgb([255, 255, 255]));
        assert_eq!(a, b);
    }
}

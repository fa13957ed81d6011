//! Octave canvas rendering: note names and chord indicators.
//!
//! The canvas is divided into eight equal columns, one per white key
//! (C..H plus the closing C). All positions derive from the canvas size, so
//! rendering is a pure function of `(size, octave, style)`.

mod chords;
mod glyphs;
mod stroke;

pub use chords::{chord_tone_x, note_x, tone_slot, NoteNaming, ScaleDegree, TEXT_COLOR};
pub use glyphs::{draw_text, text_width};

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use stroke::draw_thick_segment;

#[cfg(feature = "tracing")]
use tracing::instrument;

const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Visual settings for canvases and the chord legend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub naming: NoteNaming,
    pub note_font_scale: f32,
    pub note_thickness: u32,
    pub legend_font_scale: f32,
    pub legend_thickness: u32,
    /// Stroke width of chord indicator segments.
    pub chord_thickness: u32,
    /// Indicator length as a fraction of the slot pitch (a quarter key).
    pub chord_length_rel: f32,
    /// Extra width of the black outline around root indicators.
    pub root_outline: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            naming: NoteNaming::German,
            note_font_scale: 2.0,
            note_thickness: 3,
            legend_font_scale: 1.4,
            legend_thickness: 5,
            chord_thickness: 8,
            chord_length_rel: 0.8,
            root_outline: 2,
        }
    }
}

/// Column width (integer eighth of `width`) and row height.
#[inline]
fn eighths(width: u32, height: u32) -> (f32, f32) {
    ((width / 8) as f32, (height / 8) as f32)
}

/// Render one octave canvas on a black background.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(style)))]
pub fn render_octave(width: u32, height: u32, octave: u32, style: &OverlayStyle) -> RgbImage {
    let mut canvas = RgbImage::new(width, height);
    draw_note_names(&mut canvas, octave, style);
    draw_chord_indicators(&mut canvas, style);
    canvas
}

/// Eight white-key labels with the octave number, along the bottom row.
pub fn draw_note_names(img: &mut RgbImage, octave: u32, style: &OverlayStyle) {
    let (eighth, v_eighth) = eighths(img.width(), img.height());
    let y = img.height() as f32 - v_eighth;
    let mut x = eighth / 8.0;
    for name in style.naming.key_names() {
        let label = format!("{name}{octave}");
        draw_text(
            img,
            &label,
            (x, y),
            style.note_font_scale,
            style.note_thickness,
            TEXT_COLOR,
        );
        x += eighth;
    }
}

/// One short segment per triad tone, colored by scale degree; roots outlined.
pub fn draw_chord_indicators(img: &mut RgbImage, style: &OverlayStyle) {
    let (eighth, v_eighth) = eighths(img.width(), img.height());
    let y = v_eighth * 6.0 - 10.0;
    let half = 0.5 * style.chord_length_rel * eighth / 4.0;
    let thickness = style.chord_thickness as f32;

    for degree in ScaleDegree::ALL {
        for tone in 0..3 {
            let x = chord_tone_x(degree, tone, eighth);
            if tone == 0 && style.root_outline > 0 {
                let pad = style.root_outline as f32;
                draw_thick_segment(
                    img,
                    (x - half - pad, y),
                    (x + half + pad, y),
                    thickness + 2.0 * pad,
                    OUTLINE_COLOR,
                );
            }
            draw_thick_segment(img, (x - half, y), (x + half, y), thickness, degree.color());
        }
    }
}

/// Chord names across the top of the frame, each in its degree color.
pub fn draw_chord_legend(frame: &mut RgbImage, style: &OverlayStyle) {
    let (eighth, v_eighth) = eighths(frame.width(), frame.height());
    let mut x = eighth;
    for degree in ScaleDegree::ALL {
        draw_text(
            frame,
            degree.name(style.naming),
            (x, v_eighth),
            style.legend_font_scale,
            style.legend_thickness,
            degree.color(),
        );
        x += eighth;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_color(img: &RgbImage, color: Rgb<u8>) -> usize {
        img.pixels().filter(|&&p| p == color).count()
    }

    #[test]
    fn rendering_is_repeatable() {
        let style = OverlayStyle::default();
        let first = render_octave(800, 480, 3, &style);
        let second = render_octave(800, 480, 3, &style);
        assert_eq!(first, second);
    }

    #[test]
    fn every_degree_color_is_drawn() {
        let style = OverlayStyle::default();
        let canvas = render_octave(800, 480, 2, &style);
        for degree in ScaleDegree::ALL {
            assert!(count_color(&canvas, degree.color()) > 0, "{degree:?}");
        }
        assert!(count_color(&canvas, TEXT_COLOR) > 0);
    }

    #[test]
    fn indicators_sit_on_the_chord_row() {
        let style = OverlayStyle::default();
        let mut canvas = RgbImage::new(800, 480);
        draw_chord_indicators(&mut canvas, &style);
        // eighth = 100, chord row y = 6 * 60 - 10 = 350
        let root_c = chord_tone_x(ScaleDegree::C, 0, 100.0).round() as u32;
        assert_eq!(*canvas.get_pixel(root_c, 350), ScaleDegree::C.color());
        assert_eq!(*canvas.get_pixel(root_c, 300), Rgb([0, 0, 0]));
    }

    #[test]
    fn octave_number_changes_the_labels() {
        let style = OverlayStyle::default();
        let a = render_octave(800, 480, 1, &style);
        let b = render_octave(800, 480, 2, &style);
        assert_ne!(a, b);
    }

    #[test]
    fn legend_is_drawn_near_the_top() {
        let style = OverlayStyle::default();
        let mut frame = RgbImage::new(800, 480);
        draw_chord_legend(&mut frame, &style);
        let lowest = frame
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 != [0, 0, 0])
            .map(|(_, y, _)| y)
            .max()
            .expect("legend pixels");
        assert!(lowest <= 60 + 4, "legend reaches row {lowest}");
    }
}

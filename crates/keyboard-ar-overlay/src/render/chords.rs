//! Scale degrees, their colors, and diatonic triad placement.

use image::Rgb;
use serde::{Deserialize, Serialize};

/// Note-name convention for labels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteNaming {
    /// `C D E F G A H` (central European).
    #[default]
    German,
    /// `C D E F G A B`.
    English,
}

impl NoteNaming {
    /// Names of the eight white keys of one octave, including the closing C.
    pub fn key_names(self) -> [&'static str; 8] {
        match self {
            Self::German => ["C", "D", "E", "F", "G", "A", "H", "C"],
            Self::English => ["C", "D", "E", "F", "G", "A", "B", "C"],
        }
    }
}

/// Color of note-name labels.
pub const TEXT_COLOR: Rgb<u8> = Rgb([0, 210, 0]);

/// Diatonic degree of the C major scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleDegree {
    C,
    D,
    E,
    F,
    G,
    A,
    H,
}

const DEGREE_COLORS: [Rgb<u8>; 7] = [
    Rgb([239, 10, 0]),
    Rgb([0, 14, 239]),
    Rgb([250, 90, 7]),
    Rgb([240, 0, 230]),
    Rgb([240, 240, 0]),
    Rgb([117, 44, 0]),
    Rgb([0, 230, 240]),
];

// White-key indices of each triad, root first.
const TRIADS: [[usize; 3]; 7] = [
    [0, 2, 4],
    [1, 3, 5],
    [2, 4, 6],
    [3, 0, 5],
    [4, 1, 6],
    [5, 2, 0],
    [6, 3, 1],
];

impl ScaleDegree {
    pub const ALL: [ScaleDegree; 7] = [
        ScaleDegree::C,
        ScaleDegree::D,
        ScaleDegree::E,
        ScaleDegree::F,
        ScaleDegree::G,
        ScaleDegree::A,
        ScaleDegree::H,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn color(self) -> Rgb<u8> {
        DEGREE_COLORS[self.index()]
    }

    /// White-key indices (0 = C) of the triad on this degree, root first.
    #[inline]
    pub fn triad(self) -> [usize; 3] {
        TRIADS[self.index()]
    }

    pub fn name(self, naming: NoteNaming) -> &'static str {
        naming.key_names()[self.index()]
    }
}

/// How many lower degrees already place a tone on the triad's `tone`-th note.
///
/// Chords sharing a key are drawn side by side on it, in degree order.
pub fn tone_slot(degree: ScaleDegree, tone: usize) -> usize {
    let note = degree.triad()[tone];
    TRIADS[..degree.index()]
        .iter()
        .filter(|triad| triad.contains(&note))
        .count()
}

/// X coordinate of the `slot`-th indicator on white key `note`.
#[inline]
pub fn note_x(note: usize, slot: usize, eighth: f32) -> f32 {
    eighth / 8.0 + note as f32 * eighth + slot as f32 * eighth / 4.0
}

/// X coordinate of the `tone`-th indicator of the triad on `degree`.
#[inline]
pub fn chord_tone_x(degree: ScaleDegree, tone: usize, eighth: f32) -> f32 {
    note_x(degree.triad()[tone], tone_slot(degree, tone), eighth)
}

use crate::octave::KeyboardSize;
use crate::render::OverlayStyle;
use crate::sorter::DEFAULT_ID_CAPACITY;
use keyboard_ar_core::HomographyMethod;
use serde::{Deserialize, Serialize};

/// Configuration for [`OverlayPipeline`](super::OverlayPipeline).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayParams {
    /// Keyboard the marker strip belongs to; selects the octave formula.
    pub keyboard: KeyboardSize,
    /// Size of the id table; ids at or above it are dropped.
    pub id_capacity: usize,
    /// Minimum number of detected markers before any overlay is drawn.
    pub min_markers: usize,
    /// Octave canvas size `[width, height]`. Defaults to the frame size.
    pub canvas_size: Option<[u32; 2]>,
    /// Estimator for canvas-to-frame homographies.
    pub homography: HomographyMethod,
    pub style: OverlayStyle,
    /// Draw chord names across the top of the frame.
    pub chord_legend: bool,
    /// Present frames as a side-by-side stereo pair (Cardboard viewers).
    pub stereo: bool,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            keyboard: KeyboardSize::Keys49,
            id_capacity: DEFAULT_ID_CAPACITY,
            min_markers: 4,
            canvas_size: None,
            homography: HomographyMethod::default(),
            style: OverlayStyle::default(),
            chord_legend: true,
            stereo: false,
        }
    }
}

impl OverlayParams {
    /// Defaults for a given keyboard size.
    pub fn for_keyboard(keyboard: KeyboardSize) -> Self {
        Self {
            keyboard,
            ..Self::default()
        }
    }
}

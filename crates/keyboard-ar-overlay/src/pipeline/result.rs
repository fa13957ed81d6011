use keyboard_ar_core::Homography;
use serde::{Deserialize, Serialize};

/// Outcome of overlaying one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameStatus {
    /// Too few markers; the frame was left untouched.
    NotEnoughMarkers { found: usize, required: usize },
    /// Every octave segment was composited.
    Composited,
    /// Homography estimation failed on `segment`; later segments were skipped.
    HomographyFailed { segment: usize },
}

/// One composited octave segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentReport {
    pub index: usize,
    pub octave: u32,
    /// Ids of the left-boundary pair followed by the right-boundary pair.
    pub marker_ids: [u32; 4],
    pub homography: Homography,
    pub replaced_pixels: usize,
}

/// Per-frame summary returned by the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameOverlayReport {
    pub markers_detected: usize,
    pub rejected_candidates: usize,
    /// Ids outside the id table, in detection order.
    pub dropped_ids: Vec<u32>,
    /// Octave of the first segment.
    pub base_octave: Option<u32>,
    pub segments: Vec<SegmentReport>,
    pub status: FrameStatus,
    /// Detector failure message, if detection failed for this frame.
    pub detector_error: Option<String>,
}

impl FrameOverlayReport {
    pub(crate) fn skipped(markers_detected: usize, required: usize) -> Self {
        Self {
            markers_detected,
            rejected_candidates: 0,
            dropped_ids: Vec::new(),
            base_octave: None,
            segments: Vec::new(),
            status: FrameStatus::NotEnoughMarkers {
                found: markers_detected,
                required,
            },
            detector_error: None,
        }
    }

    /// Whether at least one segment was composited.
    pub fn drew_overlay(&self) -> bool {
        !self.segments.is_empty()
    }
}

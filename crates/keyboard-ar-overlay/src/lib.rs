//! Piano keyboard overlay for marker-tagged keyboard strips.
//!
//! Per frame:
//! - detected marker ids are sorted into strip order ([`SortedIds`]),
//! - the lowest id selects the starting octave ([`octave_for_marker`]),
//! - one canvas per octave segment is rendered ([`render_octave`]),
//! - each canvas is warped onto its four-marker quad and composited into the
//!   color frame ([`composite_overlay`]).
//!
//! [`OverlayPipeline`] wires the stages together. Marker detection is supplied
//! by the caller through `keyboard_ar_core::MarkerDetector`.

mod composite;
mod io;
mod octave;
mod pipeline;
mod render;
mod sorter;
mod stereo;

pub use composite::{
    canvas_corners, composite_masked, composite_overlay, overlay_mask, segment_homography,
    segment_quad,
};
pub use io::{OverlayConfigError, OverlayIoError, OverlayRenderConfig, OverlayRenderReport};
pub use octave::{octave_for_marker, KeyboardSize};
pub use pipeline::{
    FrameOverlayReport, FrameStatus, OverlayParams, OverlayPipeline, SegmentReport,
};
pub use render::{
    chord_tone_x, draw_chord_indicators, draw_chord_legend, draw_note_names, draw_text,
    note_x, render_octave, text_width, tone_slot, NoteNaming, OverlayStyle, ScaleDegree,
    TEXT_COLOR,
};
pub use sorter::{SortedEntry, SortedIds, DEFAULT_ID_CAPACITY, MAX_ID_CAPACITY};
pub use stereo::{rgba_to_rgb, side_by_side};

pub use keyboard_ar_core::{
    DetectedMarker, GrayImageView, Homography, HomographyMethod, MarkerCorner, MarkerDetections,
    MarkerDetector, RecordedDetections,
};

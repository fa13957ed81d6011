//! Frame pipeline.
//!
//! Wires marker detection, id sorting, octave mapping, canvas rendering and
//! perspective compositing into one per-frame call.

mod frame;
mod params;
mod result;

pub use frame::OverlayPipeline;
pub use params::OverlayParams;
pub use result::{FrameOverlayReport, FrameStatus, SegmentReport};

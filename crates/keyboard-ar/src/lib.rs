//! High-level facade crate for the `keyboard-ar-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the geometry core and the overlay pipeline
//! - end-to-end helpers that take `image` buffers, run the pipeline and return
//!   the presented frame together with its report
//! - (feature `cli`) the `keyboard-ar` binary for offline rendering of
//!   recorded frames
//!
//! ## Quickstart
//!
//! ```no_run
//! use keyboard_ar::frame;
//! use keyboard_ar::overlay::{OverlayParams, OverlayPipeline, RecordedDetections};
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("frame.png")?.decode()?;
//! let detector = RecordedDetections::default();
//! let pipeline = OverlayPipeline::new(OverlayParams::default());
//!
//! let (out, report) = frame::overlay_image(&pipeline, &detector, &img);
//! println!("segments: {}", report.segments.len());
//! out.save("overlay.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `keyboard_ar::core`: homographies, warping, image views, marker types.
//! - `keyboard_ar::overlay`: id sorting, octave mapping, canvas rendering,
//!   compositing and the per-frame pipeline.
//! - `keyboard_ar::frame`: helpers from `image` buffers and JSON configs.

pub use keyboard_ar_core as core;
pub use keyboard_ar_overlay as overlay;

pub use keyboard_ar_core::{DetectedMarker, MarkerDetections, MarkerDetector, RecordedDetections};
pub use keyboard_ar_overlay::{
    FrameOverlayReport, FrameStatus, KeyboardSize, OverlayParams, OverlayPipeline,
};

pub mod frame;

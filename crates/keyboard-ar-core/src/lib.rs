//! Core types and utilities for the keyboard-ar overlay.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete marker detector or image crate: detectors plug in
//! through [`MarkerDetector`], images are passed as borrowed row-major views.

mod homography;
mod image;
mod logger;
mod marker;

pub use homography::{
    estimate_homography, estimate_homography_dlt, estimate_homography_ransac,
    homography_from_4pt, warp_perspective_rgb, Homography, HomographyError, HomographyMethod,
    RansacParams, WarpRegion,
};
pub use image::{rgb_luma, sample_bilinear_rgb, GrayImage, GrayImageView, RgbImage, RgbImageView};
pub use marker::{
    DetectedMarker, MarkerCorner, MarkerDetectError, MarkerDetections, MarkerDetector,
    RecordedDetections,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

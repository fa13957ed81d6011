//! Detected fiducial markers and the detector seam.
//!
//! Marker detection itself (quad finding, dictionary decoding, corner
//! refinement) is out of scope for this workspace. Anything able to turn a
//! grayscale frame into `(id, corners)` pairs can drive the overlay by
//! implementing [`MarkerDetector`].

use crate::GrayImageView;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Index of a corner inside [`DetectedMarker::corners`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerCorner {
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
}

/// One decoded marker in frame pixel coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedMarker {
    pub id: u32,
    /// Corners in TL, TR, BR, BL order.
    pub corners: [Point2<f32>; 4],
}

impl DetectedMarker {
    pub fn new(id: u32, corners: [Point2<f32>; 4]) -> Self {
        Self { id, corners }
    }

    #[inline]
    pub fn corner(&self, which: MarkerCorner) -> Point2<f32> {
        self.corners[which as usize]
    }
}

/// Full output of one detector run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerDetections {
    /// Markers in detection order.
    pub markers: Vec<DetectedMarker>,
    /// Candidate quads that did not decode to a dictionary id.
    #[serde(default)]
    pub rejected: Vec<[Point2<f32>; 4]>,
}

impl MarkerDetections {
    pub fn ids(&self) -> Vec<u32> {
        self.markers.iter().map(|m| m.id).collect()
    }
}

/// Errors a detector may report for a frame.
#[derive(thiserror::Error, Debug)]
pub enum MarkerDetectError {
    #[error("invalid grayscale frame (width={width}, height={height}, len={len})")]
    InvalidFrame {
        width: usize,
        height: usize,
        len: usize,
    },
    #[error("marker detector failed: {0}")]
    Backend(String),
}

/// A fiducial marker detector.
pub trait MarkerDetector {
    fn detect(&self, gray: &GrayImageView<'_>) -> Result<MarkerDetections, MarkerDetectError>;
}

impl<D: MarkerDetector + ?Sized> MarkerDetector for &D {
    fn detect(&self, gray: &GrayImageView<'_>) -> Result<MarkerDetections, MarkerDetectError> {
        (**self).detect(gray)
    }
}

/// Replays a fixed set of detections for every frame.
///
/// Used for offline rendering from recorded detector output and in tests.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedDetections {
    pub detections: MarkerDetections,
}

impl RecordedDetections {
    pub fn new(markers: Vec<DetectedMarker>) -> Self {
        Self {
            detections: MarkerDetections {
                markers,
                rejected: Vec::new(),
            },
        }
    }
}

impl MarkerDetector for RecordedDetections {
    fn detect(&self, gray: &GrayImageView<'_>) -> Result<MarkerDetections, MarkerDetectError> {
        if gray.data.len() != gray.width * gray.height {
            return Err(MarkerDetectError::InvalidFrame {
                width: gray.width,
                height: gray.height,
                len: gray.data.len(),
            });
        }
        Ok(self.detections.clone())
    }
}

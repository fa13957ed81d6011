//! JSON configuration and report helpers for offline overlay rendering.

use crate::{FrameOverlayReport, OverlayParams, OverlayPipeline, MAX_ID_CAPACITY};
use keyboard_ar_core::{MarkerDetections, RecordedDetections};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum OverlayIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum OverlayConfigError {
    #[error("id_capacity must be positive")]
    ZeroIdCapacity,
    #[error("id_capacity must be at most {max} (got {got})")]
    IdCapacityTooLarge { got: usize, max: usize },
    #[error("min_markers must be at least 4 to form an octave segment (got {0})")]
    TooFewMinMarkers(usize),
    #[error("canvas size must be non-zero (got {width}x{height})")]
    EmptyCanvas { width: u32, height: u32 },
}

/// Configuration for rendering one recorded frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayRenderConfig {
    pub image_path: String,
    /// JSON file holding a `MarkerDetections` object.
    pub detections_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub report_path: Option<String>,
    #[serde(default)]
    pub params: OverlayParams,
}

impl OverlayRenderConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, OverlayIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), OverlayIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output image path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("keyboard_overlay.png"))
    }

    pub fn report_path(&self) -> Option<PathBuf> {
        self.report_path.as_ref().map(PathBuf::from)
    }

    /// Load the recorded detections referenced by this config.
    pub fn load_detections(&self) -> Result<RecordedDetections, OverlayIoError> {
        let raw = fs::read_to_string(&self.detections_path)?;
        let detections: MarkerDetections = serde_json::from_str(&raw)?;
        Ok(RecordedDetections { detections })
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), OverlayConfigError> {
        let p = &self.params;
        if p.id_capacity == 0 {
            return Err(OverlayConfigError::ZeroIdCapacity);
        }
        if p.id_capacity > MAX_ID_CAPACITY {
            return Err(OverlayConfigError::IdCapacityTooLarge {
                got: p.id_capacity,
                max: MAX_ID_CAPACITY,
            });
        }
        if p.min_markers < 4 {
            return Err(OverlayConfigError::TooFewMinMarkers(p.min_markers));
        }
        if let Some([width, height]) = p.canvas_size {
            if width == 0 || height == 0 {
                return Err(OverlayConfigError::EmptyCanvas { width, height });
            }
        }
        Ok(())
    }

    /// Build a pipeline from this config.
    pub fn build_pipeline(&self) -> Result<OverlayPipeline, OverlayConfigError> {
        self.validate()?;
        Ok(OverlayPipeline::new(self.params.clone()))
    }
}

/// Report written next to a rendered frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayRenderReport {
    pub image_path: String,
    pub detections_path: String,
    pub output_path: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame: FrameOverlayReport,
}

impl OverlayRenderReport {
    pub fn new(
        cfg: &OverlayRenderConfig,
        output_path: &Path,
        frame_size: (u32, u32),
        frame: FrameOverlayReport,
    ) -> Self {
        Self {
            image_path: cfg.image_path.clone(),
            detections_path: cfg.detections_path.clone(),
            output_path: output_path.to_string_lossy().into_owned(),
            frame_width: frame_size.0,
            frame_height: frame_size.1,
            frame,
        }
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, OverlayIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), OverlayIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

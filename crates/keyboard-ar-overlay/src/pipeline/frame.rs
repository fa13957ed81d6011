use super::{FrameOverlayReport, FrameStatus, OverlayParams, SegmentReport};
use crate::composite::{composite_overlay, segment_homography, segment_quad};
use crate::render::{draw_chord_legend, render_octave};
use crate::sorter::SortedIds;
use crate::stereo::side_by_side;
use image::RgbImage;
use keyboard_ar_core::{GrayImageView, MarkerDetections, MarkerDetector};
use log::{debug, warn};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Markers spanned by one octave segment; fewer can never be composited.
const SEGMENT_MARKERS: usize = 4;

/// Per-frame overlay pipeline: sort → octave → render → composite.
///
/// The pipeline holds configuration only; every buffer it uses is local to
/// one call, so a single instance can serve any number of frames.
#[derive(Clone, Debug, Default)]
pub struct OverlayPipeline {
    params: OverlayParams,
}

impl OverlayPipeline {
    pub fn new(params: OverlayParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &OverlayParams {
        &self.params
    }

    /// Detect markers in `gray` and composite the keyboard into `frame`.
    ///
    /// Never fails: detector errors are logged and treated as an empty
    /// detection, so the frame is passed through unchanged.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, detector, gray, frame),
            fields(width = frame.width(), height = frame.height())
        )
    )]
    pub fn process_frame<D: MarkerDetector + ?Sized>(
        &self,
        detector: &D,
        gray: &GrayImageView<'_>,
        frame: &mut RgbImage,
    ) -> FrameOverlayReport {
        let (detections, detector_error) = match detector.detect(gray) {
            Ok(detections) => (detections, None),
            Err(err) => {
                warn!("marker detection failed, passing frame through: {err}");
                (MarkerDetections::default(), Some(err.to_string()))
            }
        };

        let mut report = self.overlay_detections(&detections, frame);
        report.detector_error = detector_error;
        report
    }

    /// Composite the keyboard for already-detected markers.
    pub fn overlay_detections(
        &self,
        detections: &MarkerDetections,
        frame: &mut RgbImage,
    ) -> FrameOverlayReport {
        let markers = &detections.markers;
        let required = self.params.min_markers.max(SEGMENT_MARKERS);
        let mut report = FrameOverlayReport::skipped(markers.len(), required);
        report.rejected_candidates = detections.rejected.len();

        if markers.len() < required {
            debug!("{} markers detected, {required} required", markers.len());
            return report;
        }

        let ids = detections.ids();
        let sorted = SortedIds::sort(&ids, self.params.id_capacity);
        report.dropped_ids = sorted.dropped_ids().to_vec();

        let min_id = match sorted.min_id() {
            Some(id) if sorted.len() >= required => id,
            _ => {
                debug!("{} usable markers after sorting, {required} required", sorted.len());
                report.status = FrameStatus::NotEnoughMarkers {
                    found: sorted.len(),
                    required,
                };
                return report;
            }
        };

        let base_octave = self.params.keyboard.octave_for_marker(min_id);
        report.base_octave = Some(base_octave);
        report.status = FrameStatus::Composited;

        let [canvas_w, canvas_h] = self
            .params
            .canvas_size
            .unwrap_or([frame.width(), frame.height()]);

        for (index, quartet) in sorted.segments().enumerate() {
            let octave = base_octave + index as u32;
            let marker_ids = quartet.map(|e| e.id);
            let quad = segment_quad(quartet.map(|e| &markers[e.detection_index]));

            let h = match segment_homography(canvas_w, canvas_h, &quad, &self.params.homography) {
                Ok(h) => h,
                Err(err) => {
                    warn!(
                        "segment {index} (markers {marker_ids:?}): {err}; \
                         skipping remaining octaves"
                    );
                    report.status = FrameStatus::HomographyFailed { segment: index };
                    break;
                }
            };

            let canvas = render_octave(canvas_w, canvas_h, octave, &self.params.style);
            let Some(replaced_pixels) = composite_overlay(frame, &canvas, h) else {
                warn!(
                    "segment {index} (markers {marker_ids:?}): singular homography; \
                     skipping remaining octaves"
                );
                report.status = FrameStatus::HomographyFailed { segment: index };
                break;
            };
            debug!("segment {index}: octave {octave}, {replaced_pixels} pixels composited");

            report.segments.push(SegmentReport {
                index,
                octave,
                marker_ids,
                homography: h,
                replaced_pixels,
            });
        }

        if self.params.chord_legend {
            draw_chord_legend(frame, &self.params.style);
        }

        report
    }

    /// Final presentation step: side-by-side stereo when enabled.
    pub fn present(&self, frame: RgbImage) -> RgbImage {
        if self.params.stereo {
            side_by_side(&frame)
        } else {
            frame
        }
    }
}

use crate::{core, overlay};
use ::image::{DynamicImage, GrayImage, ImageError, ImageReader, RgbImage, RgbaImage};
use log::info;
use std::path::PathBuf;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("frame and grayscale sizes differ (frame {frame:?}, gray {gray:?})")]
    SizeMismatch { frame: (u32, u32), gray: (u32, u32) },

    #[error("failed to read image {path}: {source}")]
    ReadImage {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("failed to write image {path}: {source}")]
    WriteImage {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error(transparent)]
    Io(#[from] overlay::OverlayIoError),

    #[error(transparent)]
    Config(#[from] overlay::OverlayConfigError),
}

/// Convert an `image::GrayImage` into the lightweight `keyboard-ar-core` view type.
pub fn gray_view(img: &GrayImage) -> core::GrayImageView<'_> {
    core::GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Run the pipeline on a decoded image and return the presented frame.
///
/// Detection runs on the luma channel; the overlay is composited into an RGB
/// copy, so any alpha channel is dropped.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(pipeline, detector, img),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn overlay_image<D: core::MarkerDetector + ?Sized>(
    pipeline: &overlay::OverlayPipeline,
    detector: &D,
    img: &DynamicImage,
) -> (RgbImage, overlay::FrameOverlayReport) {
    let gray = img.to_luma8();
    let mut frame = img.to_rgb8();
    let report = pipeline.process_frame(detector, &gray_view(&gray), &mut frame);
    (pipeline.present(frame), report)
}

/// Run the pipeline on a camera frame delivered as a grayscale plane plus an
/// RGBA color buffer of the same size.
pub fn overlay_camera_frame<D: core::MarkerDetector + ?Sized>(
    pipeline: &overlay::OverlayPipeline,
    detector: &D,
    gray: &GrayImage,
    rgba: &RgbaImage,
) -> Result<(RgbImage, overlay::FrameOverlayReport), RenderError> {
    if gray.dimensions() != rgba.dimensions() {
        return Err(RenderError::SizeMismatch {
            frame: rgba.dimensions(),
            gray: gray.dimensions(),
        });
    }
    let mut frame = overlay::rgba_to_rgb(rgba);
    let report = pipeline.process_frame(detector, &gray_view(gray), &mut frame);
    Ok((pipeline.present(frame), report))
}

/// Render one recorded frame described by `cfg`.
///
/// Reads the image and detections, writes the composited PNG and, when
/// `report_path` is set, the JSON report.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(cfg)))]
pub fn render_from_config(
    cfg: &overlay::OverlayRenderConfig,
) -> Result<overlay::OverlayRenderReport, RenderError> {
    let pipeline = cfg.build_pipeline()?;
    let detector = cfg.load_detections()?;

    let image_path = PathBuf::from(&cfg.image_path);
    let img = ImageReader::open(&image_path)
        .map_err(|e| RenderError::ReadImage {
            path: image_path.clone(),
            source: ImageError::IoError(e),
        })?
        .decode()
        .map_err(|source| RenderError::ReadImage {
            path: image_path.clone(),
            source,
        })?;

    let (out, frame_report) = overlay_image(&pipeline, &detector, &img);

    let output_path = cfg.output_path();
    out.save(&output_path).map_err(|source| RenderError::WriteImage {
        path: output_path.clone(),
        source,
    })?;
    info!(
        "wrote {} ({} segments, {} markers)",
        output_path.display(),
        frame_report.segments.len(),
        frame_report.markers_detected
    );

    let report = overlay::OverlayRenderReport::new(
        cfg,
        &output_path,
        (img.width(), img.height()),
        frame_report,
    );
    if let Some(report_path) = cfg.report_path() {
        report.write_json(&report_path)?;
        info!("wrote report {}", report_path.display());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{Luma, Rgb, Rgba};

    #[test]
    fn gray_view_borrows_raw_buffer() {
        let img = GrayImage::from_pixel(4, 3, Luma([7]));
        let view = gray_view(&img);
        assert_eq!((view.width, view.height), (4, 3));
        assert_eq!(view.data.len(), 12);
    }

    #[test]
    fn empty_detections_pass_the_image_through() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 8, Rgb([9, 8, 7])));
        let pipeline = overlay::OverlayPipeline::default();
        let (out, report) = overlay_image(&pipeline, &core::RecordedDetections::default(), &img);
        assert_eq!(out, img.to_rgb8());
        assert!(!report.drew_overlay());
    }

    #[test]
    fn camera_frame_sizes_must_match() {
        let gray = GrayImage::new(4, 4);
        let rgba = RgbaImage::from_pixel(5, 4, Rgba([1, 2, 3, 255]));
        let pipeline = overlay::OverlayPipeline::default();
        let detector = core::RecordedDetections::default();
        let err = overlay_camera_frame(&pipeline, &detector, &gray, &rgba).unwrap_err();
        assert!(matches!(err, RenderError::SizeMismatch { .. }));
    }

    #[test]
    fn camera_frame_drops_alpha() {
        let gray = GrayImage::new(4, 4);
        let rgba = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 128]));
        let pipeline = overlay::OverlayPipeline::default();
        let detector = core::RecordedDetections::default();
        let (out, _) = overlay_camera_frame(&pipeline, &detector, &gray, &rgba).expect("render");
        assert!(out.pixels().all(|p| *p == Rgb([1, 2, 3])));
    }
}

//! Perspective compositing of octave canvases into the camera frame.

use image::RgbImage;
use keyboard_ar_core::{
    estimate_homography, rgb_luma, warp_perspective_rgb, DetectedMarker, GrayImage, Homography,
    HomographyError, HomographyMethod, MarkerCorner, RgbImage as WarpedImage, RgbImageView,
    WarpRegion,
};
use nalgebra::Point2;

/// Canvas corners in the order matched by [`segment_quad`]:
/// top-left, bottom-left, top-right, bottom-right.
pub fn canvas_corners(width: u32, height: u32) -> [Point2<f32>; 4] {
    let (w, h) = (width as f32, height as f32);
    [
        Point2::new(0.0, 0.0),
        Point2::new(0.0, h),
        Point2::new(w, 0.0),
        Point2::new(w, h),
    ]
}

/// Frame-space quad of one octave segment.
///
/// The first two markers sit on the segment's left boundary, the last two on
/// its right boundary; the keyboard is anchored on their bottom edges.
pub fn segment_quad(markers: [&DetectedMarker; 4]) -> [Point2<f32>; 4] {
    [
        markers[0].corner(MarkerCorner::BottomLeft),
        markers[1].corner(MarkerCorner::BottomLeft),
        markers[2].corner(MarkerCorner::BottomRight),
        markers[3].corner(MarkerCorner::BottomRight),
    ]
}

/// Homography mapping canvas pixels onto the segment quad.
pub fn segment_homography(
    width: u32,
    height: u32,
    quad: &[Point2<f32>; 4],
    method: &HomographyMethod,
) -> Result<Homography, HomographyError> {
    estimate_homography(&canvas_corners(width, height), quad, method)
}

/// Binary mask (255) of non-black warped pixels inside `region`.
pub fn overlay_mask(warped: &WarpedImage, region: WarpRegion) -> GrayImage {
    let mut mask = GrayImage::new(warped.width, warped.height);
    for y in region.y0..region.y1.min(warped.height) {
        for x in region.x0..region.x1.min(warped.width) {
            if rgb_luma(warped.pixel(x, y)) > 0 {
                mask.data[y * warped.width + x] = 255;
            }
        }
    }
    mask
}

/// Replace frame pixels under `mask` with warped-overlay pixels.
///
/// Only the area covered by all three images is visited. Returns the number
/// of replaced pixels.
pub fn composite_masked(frame: &mut RgbImage, warped: &WarpedImage, mask: &GrayImage) -> usize {
    let frame_w = frame.width() as usize;
    let w = frame_w.min(warped.width).min(mask.width);
    let h = (frame.height() as usize).min(warped.height).min(mask.height);
    let dst: &mut [u8] = frame;
    let mut replaced = 0;
    for y in 0..h {
        for x in 0..w {
            if mask.data[y * mask.width + x] == 0 {
                continue;
            }
            let o = (y * frame_w + x) * 3;
            let s = (y * warped.width + x) * 3;
            dst[o..o + 3].copy_from_slice(&warped.data[s..s + 3]);
            replaced += 1;
        }
    }
    replaced
}

/// Warp `canvas` through `h_frame_from_canvas` and composite it into `frame`.
///
/// Returns the number of replaced pixels, or `None` when `h` is singular.
pub fn composite_overlay(
    frame: &mut RgbImage,
    canvas: &RgbImage,
    h_frame_from_canvas: Homography,
) -> Option<usize> {
    let (fw, fh) = (frame.width() as usize, frame.height() as usize);
    let corners = canvas_corners(canvas.width(), canvas.height())
        .map(|p| h_frame_from_canvas.try_apply(p));
    let region = if corners.iter().all(Option::is_some) {
        let pts: Vec<Point2<f32>> = corners.iter().flatten().copied().collect();
        WarpRegion::bounding(&pts, fw, fh)
    } else {
        WarpRegion::full(fw, fh)
    };
    if region.is_empty() {
        return Some(0);
    }

    let src = RgbImageView {
        width: canvas.width() as usize,
        height: canvas.height() as usize,
        data: canvas.as_raw(),
    };
    let warped = warp_perspective_rgb(&src, h_frame_from_canvas, fw, fh, region)?;
    let mask = overlay_mask(&warped, region);
    Some(composite_masked(frame, &warped, &mask))
}

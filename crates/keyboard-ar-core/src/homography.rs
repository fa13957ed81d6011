use crate::{sample_bilinear_rgb, RgbImage, RgbImageView};
use nalgebra::{DMatrix, Matrix3, Point2, SMatrix, SVector, Vector3};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn from_array(rows: [[f64; 3]; 3]) -> Self {
        Self::new(Matrix3::from_row_slice(&[
            rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
            rows[2][1], rows[2][2],
        ]))
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    /// Like [`Homography::apply`], but `None` for points mapped to (or behind)
    /// the line at infinity.
    #[inline]
    pub fn try_apply(&self, p: Point2<f32>) -> Option<Point2<f32>> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        if w <= 1e-12 {
            return None;
        }
        Some(Point2::new((v[0] / w) as f32, (v[1] / w) as f32))
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }

    fn is_well_formed(&self) -> bool {
        self.h.iter().all(|v| v.is_finite()) && self.h.determinant().abs() > 1e-12
    }
}

/// Errors produced by homography estimation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum HomographyError {
    #[error("mismatched correspondence counts (src={src}, dst={dst})")]
    MismatchedLengths { src: usize, dst: usize },
    #[error("too few correspondences: need 4, got {got}")]
    TooFewPoints { got: usize },
    #[error("degenerate point configuration (three or more points collinear)")]
    Degenerate,
    #[error("numerical failure while solving for the homography")]
    Numerical,
    #[error("insufficient RANSAC inliers: need {needed}, found {found}")]
    InsufficientInliers { needed: usize, found: usize },
}

/// RANSAC settings for [`estimate_homography_ransac`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacParams {
    /// Maximum number of minimal-sample iterations.
    pub max_iters: usize,
    /// Inlier threshold (reprojection error in destination pixels).
    pub inlier_threshold: f64,
    /// Minimum number of inliers for a valid model.
    pub min_inliers: usize,
    pub seed: u64,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            max_iters: 500,
            inlier_threshold: 3.0,
            min_inliers: 4,
            seed: 0,
        }
    }
}

/// Estimator used by [`estimate_homography`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HomographyMethod {
    /// Exact 4-point solve, least-squares DLT for more points.
    Direct,
    /// Outlier-robust fit, refined on the inlier set.
    Ransac(RansacParams),
}

impl Default for HomographyMethod {
    fn default() -> Self {
        Self::Ransac(RansacParams::default())
    }
}

fn hartley_normalization(cx: f64, cy: f64, mean_dist: f64) -> Matrix3<f64> {
    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };

    Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

fn normalize_points(pts: &[Point2<f32>]) -> (Vec<Point2<f64>>, Matrix3<f64>) {
    // Hartley normalization: translate to centroid, scale so mean distance = sqrt(2)
    let n = pts.len() as f64;
    let (mut cx, mut cy) = (0.0, 0.0);
    for p in pts {
        cx += p.x as f64;
        cy += p.y as f64;
    }
    cx /= n;
    cy /= n;

    let mean_dist = pts
        .iter()
        .map(|p| {
            let dx = p.x as f64 - cx;
            let dy = p.y as f64 - cy;
            (dx * dx + dy * dy).sqrt()
        })
        .sum::<f64>()
        / n;

    let t = hartley_normalization(cx, cy, mean_dist);
    let out = pts
        .iter()
        .map(|p| {
            let v = t * Vector3::new(p.x as f64, p.y as f64, 1.0);
            Point2::new(v[0], v[1])
        })
        .collect();
    (out, t)
}

fn normalize_homography(h: Matrix3<f64>) -> Option<Matrix3<f64>> {
    let s = h[(2, 2)];
    if s.abs() < 1e-12 {
        return None;
    }
    Some(h / s)
}

fn denormalize_homography(
    hn: Matrix3<f64>,
    t_src: Matrix3<f64>,
    t_dst: Matrix3<f64>,
) -> Option<Matrix3<f64>> {
    let t_dst_inv = t_dst.try_inverse()?;
    Some(t_dst_inv * hn * t_src)
}

/// True when any three of the points are (nearly) collinear.
///
/// The tolerance is relative to the squared extent of the point set, so the
/// check is scale invariant.
fn has_collinear_triple(pts: &[Point2<f32>]) -> bool {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in pts {
        min_x = min_x.min(p.x as f64);
        min_y = min_y.min(p.y as f64);
        max_x = max_x.max(p.x as f64);
        max_y = max_y.max(p.y as f64);
    }
    let extent = (max_x - min_x).max(max_y - min_y);
    if !extent.is_finite() || extent <= 1e-9 {
        return true;
    }
    let tol = 1e-6 * extent * extent;

    let n = pts.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let (a, b, c) = (pts[i], pts[j], pts[k]);
                let cross = (b.x as f64 - a.x as f64) * (c.y as f64 - a.y as f64)
                    - (b.y as f64 - a.y as f64) * (c.x as f64 - a.x as f64);
                if cross.abs() <= tol {
                    return true;
                }
            }
        }
    }
    false
}

/// Compute H such that: dst ~ H * src (projective), using 4 point correspondences.
/// - `src`: points in overlay canvas coords
/// - `dst`: points in frame coords
///
/// Corner order must be consistent between `src` and `dst`.
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    // Unknowns: [h11 h12 h13 h21 h22 h23 h31 h32], with h33 = 1
    // For each correspondence (x,y)->(u,v):
    // h11 x + h12 y + h13 - u h31 x - u h32 y = u
    // h21 x + h22 y + h23 - v h31 x - v h32 y = v
    let (src_n, t_src) = normalize_points(src);
    let (dst_n, t_dst) = normalize_points(dst);

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for k in 0..4 {
        let x = src_n[k].x;
        let y = src_n[k].y;
        let u = dst_n[k].x;
        let v = dst_n[k].y;

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        let r1 = 2 * k + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let x = a.lu().solve(&b)?;

    let hn = Matrix3::<f64>::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    let h_den = denormalize_homography(hn, t_src, t_dst)?;
    let h_den = normalize_homography(h_den)?;

    let h = Homography::new(h_den);
    h.is_well_formed().then_some(h)
}

fn check_lengths(src: &[Point2<f32>], dst: &[Point2<f32>]) -> Result<(), HomographyError> {
    if src.len() != dst.len() {
        return Err(HomographyError::MismatchedLengths {
            src: src.len(),
            dst: dst.len(),
        });
    }
    if src.len() < 4 {
        return Err(HomographyError::TooFewPoints { got: src.len() });
    }
    Ok(())
}

/// Least-squares DLT estimate of H such that `dst ~ H * src`.
///
/// Exactly four correspondences use the closed 4-point solve and are rejected
/// when any three points on either side are collinear.
pub fn estimate_homography_dlt(
    src: &[Point2<f32>],
    dst: &[Point2<f32>],
) -> Result<Homography, HomographyError> {
    check_lengths(src, dst)?;

    if src.len() == 4 {
        if has_collinear_triple(src) || has_collinear_triple(dst) {
            return Err(HomographyError::Degenerate);
        }
        let s: &[Point2<f32>; 4] = src.try_into().map_err(|_| HomographyError::Numerical)?;
        let d: &[Point2<f32>; 4] = dst.try_into().map_err(|_| HomographyError::Numerical)?;
        return homography_from_4pt(s, d).ok_or(HomographyError::Numerical);
    }

    let (r, tr) = normalize_points(src);
    let (i, ti) = normalize_points(dst);

    // Build A (2N x 9)
    let n = src.len();
    let mut a = DMatrix::<f64>::zeros(2 * n, 9);

    for k in 0..n {
        let x = r[k].x;
        let y = r[k].y;
        let u = i[k].x;
        let v = i[k].y;

        // [ -x -y -1   0  0  0   u*x u*y u ]
        a[(2 * k, 0)] = -x;
        a[(2 * k, 1)] = -y;
        a[(2 * k, 2)] = -1.0;
        a[(2 * k, 6)] = u * x;
        a[(2 * k, 7)] = u * y;
        a[(2 * k, 8)] = u;

        // [ 0  0  0  -x -y -1   v*x v*y v ]
        a[(2 * k + 1, 3)] = -x;
        a[(2 * k + 1, 4)] = -y;
        a[(2 * k + 1, 5)] = -1.0;
        a[(2 * k + 1, 6)] = v * x;
        a[(2 * k + 1, 7)] = v * y;
        a[(2 * k + 1, 8)] = v;
    }

    // Solve Ah = 0 -> h is right singular vector with smallest singular value
    let svd = a.svd(true, true);
    let vt = svd.v_t.ok_or(HomographyError::Numerical)?;
    let last = vt.nrows().checked_sub(1).ok_or(HomographyError::Numerical)?;
    let h = vt.row(last);

    let hn =
        Matrix3::<f64>::from_row_slice(&[h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]]);

    // Denormalize: H = Ti^{-1} * Hn * Tr
    let h_den = denormalize_homography(hn, tr, ti).ok_or(HomographyError::Numerical)?;
    let h_den = normalize_homography(h_den).ok_or(HomographyError::Numerical)?;

    let h = Homography::new(h_den);
    if h.is_well_formed() {
        Ok(h)
    } else {
        Err(HomographyError::Degenerate)
    }
}

fn reprojection_error(h: &Homography, src: Point2<f32>, dst: Point2<f32>) -> f64 {
    match h.try_apply(src) {
        Some(p) => {
            let dx = (p.x - dst.x) as f64;
            let dy = (p.y - dst.y) as f64;
            (dx * dx + dy * dy).sqrt()
        }
        None => f64::INFINITY,
    }
}

/// Outlier-robust homography: best minimal 4-point model by inlier count,
/// refit with DLT on its inliers.
///
/// With exactly four correspondences every sample is the full set, so this
/// reduces to the exact 4-point solve.
pub fn estimate_homography_ransac(
    src: &[Point2<f32>],
    dst: &[Point2<f32>],
    params: &RansacParams,
) -> Result<Homography, HomographyError> {
    check_lengths(src, dst)?;
    let n = src.len();
    if n == 4 {
        return estimate_homography_dlt(src, dst);
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut best_mask: Vec<bool> = Vec::new();
    let mut best_count = 0usize;

    for _ in 0..params.max_iters {
        let idx = sample(&mut rng, n, 4);
        let s4: Vec<Point2<f32>> = idx.iter().map(|i| src[i]).collect();
        let d4: Vec<Point2<f32>> = idx.iter().map(|i| dst[i]).collect();

        let Ok(h) = estimate_homography_dlt(&s4, &d4) else {
            continue;
        };

        let mask: Vec<bool> = src
            .iter()
            .zip(dst)
            .map(|(&s, &d)| reprojection_error(&h, s, d) < params.inlier_threshold)
            .collect();
        let count = mask.iter().filter(|&&m| m).count();

        if count > best_count {
            best_count = count;
            best_mask = mask;
            if count == n {
                break;
            }
        }
    }

    let needed = params.min_inliers.max(4);
    if best_count < needed {
        return Err(HomographyError::InsufficientInliers {
            needed,
            found: best_count,
        });
    }

    let (inlier_src, inlier_dst): (Vec<Point2<f32>>, Vec<Point2<f32>>) = src
        .iter()
        .zip(dst)
        .zip(&best_mask)
        .filter(|(_, &m)| m)
        .map(|((&s, &d), _)| (s, d))
        .unzip();

    estimate_homography_dlt(&inlier_src, &inlier_dst)
}

/// Estimate H such that `dst ~ H * src` with the selected method.
pub fn estimate_homography(
    src: &[Point2<f32>],
    dst: &[Point2<f32>],
    method: &HomographyMethod,
) -> Result<Homography, HomographyError> {
    match method {
        HomographyMethod::Direct => estimate_homography_dlt(src, dst),
        HomographyMethod::Ransac(params) => estimate_homography_ransac(src, dst, params),
    }
}

/// Axis-aligned pixel rectangle `[x0, x1) × [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarpRegion {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl WarpRegion {
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }

    /// Bounding box of `pts` (plus one pixel of slack), clipped to the image.
    pub fn bounding(pts: &[Point2<f32>], width: usize, height: usize) -> Self {
        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in pts {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return Self::full(width, height);
        }
        let clip = |v: f32, hi: usize| v.clamp(0.0, hi as f32) as usize;
        Self {
            x0: clip(min_x.floor() - 1.0, width),
            y0: clip(min_y.floor() - 1.0, height),
            x1: clip(max_x.ceil() + 2.0, width),
            y1: clip(max_y.ceil() + 2.0, height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// Warp `src` into an `out_w × out_h` image: for each destination pixel in
/// `region`, map back through `h_dst_from_src` and sample bilinearly. Pixels
/// outside `region`, or mapping outside `src`, stay black.
pub fn warp_perspective_rgb(
    src: &RgbImageView<'_>,
    h_dst_from_src: Homography,
    out_w: usize,
    out_h: usize,
    region: WarpRegion,
) -> Option<RgbImage> {
    let h_src_from_dst = h_dst_from_src.inverse()?;
    let mut out = RgbImage::new(out_w, out_h);

    let x1 = region.x1.min(out_w);
    let y1 = region.y1.min(out_h);
    for y in region.y0..y1 {
        for x in region.x0..x1 {
            // sample at pixel center
            let pd = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
            let Some(ps) = h_src_from_dst.try_apply(pd) else {
                continue;
            };
            if ps.x < 0.0 || ps.y < 0.0 || ps.x > src.width as f32 || ps.y > src.height as f32 {
                continue;
            }
            let px = sample_bilinear_rgb(src, ps.x - 0.5, ps.y - 0.5);
            let i = (y * out_w + x) * 3;
            out.data[i..i + 3].copy_from_slice(&px);
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_close(a: Point2<f32>, b: Point2<f32>, tol: f32) {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        assert!(
            dx < tol && dy < tol,
            "expected ({:.6},{:.6}) ~ ({:.6},{:.6}) within {}",
            a.x,
            a.y,
            b.x,
            b.y,
            tol
        );
    }

    fn ground_truth() -> Homography {
        Homography::new(Matrix3::new(
            0.8, 0.05, 120.0, //
            -0.02, 1.1, 80.0, //
            0.0009, -0.0004, 1.0,
        ))
    }

    #[test]
    fn unit_square_maps_to_identity() {
        let canvas = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
        ];
        let h = estimate_homography(&canvas, &canvas, &HomographyMethod::default())
            .expect("identity");
        for (got, want) in h.h.iter().zip(Matrix3::<f64>::identity().iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-9);
        }
    }

    #[test]
    fn four_point_specialization_recovers_h() {
        let gt = ground_truth();
        let rect = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(180.0_f32, 0.0),
            Point2::new(180.0_f32, 130.0),
            Point2::new(0.0_f32, 130.0),
        ];
        let dst = rect.map(|p| gt.apply(p));

        let recovered = homography_from_4pt(&rect, &dst).expect("recoverable");

        for p in [
            Point2::new(0.0_f32, 0.0),
            Point2::new(60.0, 40.0),
            Point2::new(150.0, 120.0),
        ] {
            assert_close(recovered.apply(p), gt.apply(p), 1e-3);
        }
    }

    #[test]
    fn dlt_handles_overdetermined_case() {
        let gt = Homography::new(Matrix3::new(
            1.0, 0.2, 12.0, //
            -0.1, 0.9, 6.0, //
            0.0006, 0.0004, 1.0,
        ));

        let rect: Vec<Point2<f32>> = (0..3)
            .flat_map(|y| (0..3).map(move |x| Point2::new(x as f32 * 40.0, y as f32 * 50.0)))
            .collect();
        let img: Vec<Point2<f32>> = rect.iter().map(|&p| gt.apply(p)).collect();

        let estimated = estimate_homography_dlt(&rect, &img).expect("estimate");
        for p in [Point2::new(0.0_f32, 0.0), Point2::new(60.0, 40.0)] {
            assert_close(estimated.apply(p), gt.apply(p), 1e-3);
        }
    }

    #[test]
    fn ransac_ignores_outliers() {
        let gt = ground_truth();
        let src: Vec<Point2<f32>> = (0..4)
            .flat_map(|y| (0..4).map(move |x| Point2::new(x as f32 * 30.0, y as f32 * 25.0)))
            .collect();
        let mut dst: Vec<Point2<f32>> = src.iter().map(|&p| gt.apply(p)).collect();
        dst[3] = Point2::new(-400.0, 900.0);
        dst[10] = Point2::new(1000.0, -50.0);

        let h = estimate_homography_ransac(&src, &dst, &RansacParams::default())
            .expect("robust estimate");
        assert_close(h.apply(src[5]), gt.apply(src[5]), 1e-2);
        assert_close(h.apply(src[3]), gt.apply(src[3]), 1e-2);
    }

    #[test]
    fn collinear_quad_is_rejected() {
        let canvas = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
        ];
        let dst = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(5.0, 5.0),
            Point2::new(10.0, 10.0),
            Point2::new(30.0, 2.0),
        ];
        assert_eq!(
            estimate_homography(&canvas, &dst, &HomographyMethod::Direct),
            Err(HomographyError::Degenerate)
        );
    }

    #[test]
    fn duplicated_corner_is_rejected() {
        let canvas = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
        ];
        let mut dst = canvas;
        dst[3] = dst[2];
        assert!(estimate_homography(&canvas, &dst, &HomographyMethod::default()).is_err());
    }

    #[test]
    fn mismatched_input_lengths_fail() {
        let rect = [Point2::new(0.0_f32, 0.0); 4];
        let img = [Point2::new(1.0_f32, 1.0); 3];
        assert_eq!(
            estimate_homography_dlt(&rect, &img),
            Err(HomographyError::MismatchedLengths { src: 4, dst: 3 })
        );
    }

    #[test]
    fn identity_warp_copies_the_source() {
        let mut src = RgbImage::new(4, 3);
        for (i, v) in src.data.iter_mut().enumerate() {
            *v = (i * 7 % 251) as u8;
        }
        let out = warp_perspective_rgb(
            &src.view(),
            Homography::identity(),
            4,
            3,
            WarpRegion::full(4, 3),
        )
        .expect("invertible");
        assert_eq!(out.data, src.data);
    }

    #[test]
    fn warp_leaves_pixels_outside_region_black() {
        let src = RgbImage {
            width: 2,
            height: 2,
            data: vec![255; 12],
        };
        let shift = Homography::from_array([[1.0, 0.0, 10.0], [0.0, 1.0, 10.0], [0.0, 0.0, 1.0]]);
        let out = warp_perspective_rgb(&src.view(), shift, 16, 16, WarpRegion::full(16, 16))
            .expect("invertible");
        assert_eq!(out.pixel(0, 0), [0, 0, 0]);
        assert_eq!(out.pixel(10, 10), [255, 255, 255]);
        assert_eq!(out.pixel(11, 11), [255, 255, 255]);
        assert_eq!(out.pixel(13, 13), [0, 0, 0]);
    }

    #[test]
    fn bounding_region_is_clipped() {
        let pts = [Point2::new(-5.0_f32, 2.0), Point2::new(50.0, 7.5)];
        let r = WarpRegion::bounding(&pts, 20, 20);
        assert_eq!(r, WarpRegion { x0: 0, y0: 1, x1: 20, y1: 10 });
    }
}

//! Waist width estimation from torso contours.
//!
//! Two regions beside the body at waist height are searched for the
//! torso edges. Each symmetric pair of edges yields a waist to face width
//! ratio, and the ratios are binned until one bin holds enough samples to
//! trust its median.

use crate::config::WaistConfig;
use crate::contours::vertical_contours;
use crate::face_detection::FaceRegion;
use crate::utils::clip_to_image;
use crate::utils::safe_cast::round_to_i32;
use crate::Result;
use log::debug;
use opencv::core::{Mat, Point, Rect};
use opencv::prelude::*;
use std::collections::HashMap;

/// Median of `values`, the mean of the two central values for even counts
///
/// Returns 0 for an empty slice.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let len = sorted.len();
    if len == 0 {
        0.0
    } else if len % 2 == 0 {
        (sorted[len / 2 - 1] + sorted[len / 2]) / 2.0
    } else {
        sorted[len / 2]
    }
}

/// ROI-local rows to scan, starting at `center` and alternating outward
///
/// `center, center - 1, center + 1, ...` down to an offset of `center - 1`.
#[must_use]
pub fn scan_rows(center: i32) -> Vec<i32> {
    if center <= 0 {
        return Vec::new();
    }
    let mut rows = Vec::with_capacity(usize::try_from(2 * center - 1).unwrap_or_default());
    rows.push(center);
    for offset in 1..center {
        rows.push(center - offset);
        rows.push(center + offset);
    }
    rows
}

/// Bucketed median filter for waist ratios
///
/// Bucket `n` holds values in `((0.5 + n) * precision, (1.5 + n) * precision]`,
/// bucket 0 also everything below. The first bucket to reach `min_matches`
/// samples decides the calibrated ratio.
#[derive(Debug, Clone)]
pub struct WaistCalibrator {
    precision: f64,
    min_matches: usize,
    buckets: HashMap<i64, Vec<f64>>,
}

impl WaistCalibrator {
    #[must_use]
    pub fn new(precision: f64, min_matches: usize) -> Self {
        Self {
            precision,
            min_matches,
            buckets: HashMap::new(),
        }
    }

    /// Bucket index of `value`
    #[allow(clippy::cast_possible_truncation)] // Saturating float-to-int cast
    fn bucket(&self, value: f64) -> i64 {
        (value / self.precision - 1.5).ceil().max(0.0) as i64
    }

    /// Record a ratio, returning the calibrated ratio once its bucket is full
    ///
    /// Non-finite samples are ignored, as is everything when the precision is
    /// not positive.
    pub fn add_sample(&mut self, value: f64) -> Option<f64> {
        if !value.is_finite() || !(self.precision > 0.0) {
            return None;
        }

        let key = self.bucket(value);
        let samples = self.buckets.entry(key).or_default();
        samples.push(value);

        (samples.len() >= self.min_matches).then(|| median(samples))
    }

    /// Number of samples recorded since the last reset
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Drop all samples
    pub fn reset(&mut self) {
        self.buckets.clear();
    }
}

/// Vertical contour points of `image` inside `roi`, with the clipped ROI
fn roi_contours(image: &Mat, roi: Rect) -> Result<Option<(Rect, Vec<Point>)>> {
    let Some(roi) = clip_to_image(roi, image.cols(), image.rows()) else {
        return Ok(None);
    };
    let region = Mat::roi(image, roi)?.try_clone()?;
    Ok(Some((roi, vertical_contours(&region)?)))
}

/// Per row, the edge point closest to the body centre
fn edges_by_row(points: &[Point], innermost: fn(i32, i32) -> i32) -> HashMap<i32, i32> {
    let mut rows = HashMap::new();
    for point in points {
        rows.entry(point.y)
            .and_modify(|x: &mut i32| *x = innermost(*x, point.x))
            .or_insert(point.x);
    }
    rows
}

/// Search the waist edges below `face` and feed matches to `calibrator`
///
/// Returns the waist to face width ratio once calibration completes, or
/// `None` when the scan ends first.
///
/// # Errors
///
/// Returns an error if an OpenCV operation fails
pub fn calculate_waist_width(
    image: &Mat,
    face: FaceRegion,
    config: &WaistConfig,
    calibrator: &mut WaistCalibrator,
) -> Result<Option<f64>> {
    if face.width <= 0 || face.height <= 0 {
        return Ok(None);
    }
    let face_width = f64::from(face.width);
    let face_height = f64::from(face.height);

    // the ROIs are half a face high, centred at the waist
    let roi_width = round_to_i32(face_width * config.roi_width_multiplier);
    let roi_y = face.y + round_to_i32(face_height * (config.waist_shift - 0.25));
    let roi_height = face.height / 2;
    let left_roi = Rect::new(
        round_to_i32(f64::from(face.x) - face_width * config.roi_width_multiplier),
        roi_y,
        roi_width,
        roi_height,
    );
    let right_roi = Rect::new(face.x + face.width, roi_y, roi_width, roi_height);

    let (Some((left_roi, left_points)), Some((right_roi, right_points))) =
        (roi_contours(image, left_roi)?, roi_contours(image, right_roi)?)
    else {
        debug!("Waist search regions fall outside the image");
        return Ok(None);
    };

    let left_edges = edges_by_row(&left_points, i32::max);
    let right_edges = edges_by_row(&right_points, i32::min);

    let middle = face.x + face.width / 2;
    let tolerance = f64::from(image.cols()) * config.max_reference_difference;

    for y in scan_rows(round_to_i32(face_height / 4.0)) {
        let (Some(&left_x), Some(&right_x)) = (left_edges.get(&y), right_edges.get(&y)) else {
            continue;
        };
        let left_x = left_x + left_roi.x;
        let right_x = right_x + right_roi.x;

        let left_distance = middle - left_x;
        let right_distance = right_x - middle;
        if f64::from((right_distance - left_distance).abs()) > tolerance {
            continue;
        }

        let ratio = f64::from(right_x - left_x) / face_width;
        if let Some(calibrated) = calibrator.add_sample(ratio) {
            debug!("Waist calibrated at {:.3} face widths", calibrated);
            return Ok(Some(calibrated));
        }
    }

    Ok(None)
}

/// One-shot waist ratio for a still image
///
/// Uses a fresh calibrator with the photo precision so a live session is
/// never disturbed.
///
/// # Errors
///
/// Returns an error if an OpenCV operation fails
pub fn photo_waist_ratio(image: &Mat, face: FaceRegion, config: &WaistConfig) -> Result<Option<f64>> {
    let mut calibrator = WaistCalibrator::new(config.photo_precision, config.photo_min_matches);
    calculate_waist_width(image, face, config, &mut calibrator)
}

/// Live waist estimator caching the first calibrated ratio
#[derive(Debug, Clone)]
pub struct WaistEstimator {
    config: WaistConfig,
    calibrator: WaistCalibrator,
    ratio: Option<f64>,
}

impl WaistEstimator {
    /// Create an uncalibrated estimator using the live precision
    #[must_use]
    pub fn new(config: &WaistConfig) -> Self {
        Self {
            config: config.clone(),
            calibrator: WaistCalibrator::new(config.live_precision, config.live_min_matches),
            ratio: None,
        }
    }

    /// Cached ratio, if calibrated
    #[must_use]
    pub fn ratio(&self) -> Option<f64> {
        self.ratio
    }

    /// Cached ratio, or one calibration pass over `frame`
    ///
    /// # Errors
    ///
    /// Returns an error if an OpenCV operation fails
    pub fn ratio_or_calibrate(&mut self, frame: &Mat, face: FaceRegion) -> Result<Option<f64>> {
        if self.ratio.is_none() {
            self.ratio = calculate_waist_width(frame, face, &self.config, &mut self.calibrator)?;
        }
        Ok(self.ratio)
    }

    /// Forget the cached ratio and all collected samples
    pub fn recalculate(&mut self) {
        self.ratio = None;
        self.calibrator.reset();
    }
}

use crate::classifier::{apply_classifier, Classifier};
use crate::config::DetectionConfig;
use crate::utils::safe_cast::round_to_i32;
use crate::Result;
use log::{debug, info};
use opencv::core::{Mat, Rect};
use opencv::prelude::*;

/// Face rectangle in image pixels; an empty rectangle means "no face"
pub type FaceRegion = Rect;

/// True when the region has zero width or height
#[must_use]
pub fn is_empty_region(region: &FaceRegion) -> bool {
    region.width == 0 || region.height == 0
}

/// Area of a region in square pixels
#[must_use]
pub fn region_area(region: &FaceRegion) -> i64 {
    i64::from(region.width) * i64::from(region.height)
}

/// Pick the region with the largest area, the first one on ties
///
/// The largest face is taken to be the one closest to the camera.
#[must_use]
pub fn select_largest(regions: &[FaceRegion]) -> Option<FaceRegion> {
    regions.iter().fold(None, |best: Option<FaceRegion>, region| match best {
        Some(current) if region_area(&current) >= region_area(region) => Some(current),
        _ => Some(*region),
    })
}

/// Haar face detector with a primary and a fallback classifier
pub struct FaceDetector {
    primary: Box<dyn Classifier>,
    secondary: Box<dyn Classifier>,
    min_face_size: f64,
    max_face_size: f64,
}

impl FaceDetector {
    /// Create a detector from the accurate `primary` and the faster `secondary` classifier
    #[must_use]
    pub fn new(primary: Box<dyn Classifier>, secondary: Box<dyn Classifier>, config: &DetectionConfig) -> Self {
        Self {
            primary,
            secondary,
            min_face_size: config.min_face_size,
            max_face_size: config.max_face_size,
        }
    }

    /// Face size bounds in pixels for an image `width` pixels wide
    fn size_bounds(&self, width: i32) -> (i32, i32) {
        let width = f64::from(width);
        (
            round_to_i32(width * self.min_face_size),
            round_to_i32(width * self.max_face_size),
        )
    }

    /// Find the face closest to the camera in a still image
    ///
    /// Runs the primary classifier and falls back to the secondary one.
    /// Returns an empty region when neither finds a face.
    ///
    /// # Errors
    ///
    /// Returns an error if an OpenCV operation fails
    pub fn detect_face(&mut self, image: &Mat) -> Result<FaceRegion> {
        let (min_size, max_size) = self.size_bounds(image.cols());

        let mut faces = apply_classifier(image, self.primary.as_mut(), min_size, max_size)?;
        if faces.is_empty() {
            debug!("Primary face classifier found nothing, trying the secondary one");
            faces = apply_classifier(image, self.secondary.as_mut(), min_size, max_size)?;
        }

        Ok(select_largest(&faces).unwrap_or_default())
    }

    /// Detect faces in the top half of a video frame with the faster classifier
    ///
    /// Size bounds still follow the full frame width.
    ///
    /// # Errors
    ///
    /// Returns an error if an OpenCV operation fails
    pub fn detect_upper_half(&mut self, frame: &Mat) -> Result<Vec<FaceRegion>> {
        let half = Rect::new(0, 0, frame.cols(), round_to_i32(f64::from(frame.rows()) / 2.0));
        if half.width == 0 || half.height == 0 {
            return Ok(Vec::new());
        }
        let upper = Mat::roi(frame, half)?.try_clone()?;
        let (min_size, max_size) = self.size_bounds(frame.cols());
        apply_classifier(&upper, self.secondary.as_mut(), min_size, max_size)
    }
}

/// Result of feeding one detection pass to a [`FaceTracker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedFace {
    /// Face to render with, possibly the previous one
    pub region: FaceRegion,
    /// The subject was missing long enough to be considered gone
    pub subject_lost: bool,
}

/// Stabilizes face detections across video frames
///
/// Small changes are suppressed so garments do not jitter, and short
/// detection dropouts reuse the last face.
#[derive(Debug, Clone)]
pub struct FaceTracker {
    previous: FaceRegion,
    skipped_frames: u32,
    max_face_difference: i32,
    max_skipped_frames: u32,
}

impl FaceTracker {
    #[must_use]
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            previous: FaceRegion::default(),
            skipped_frames: 0,
            max_face_difference: config.max_face_difference,
            max_skipped_frames: config.max_skipped_frames,
        }
    }

    /// Last committed face
    #[must_use]
    pub fn current(&self) -> FaceRegion {
        self.previous
    }

    /// Consecutive frames without a detection
    #[must_use]
    pub fn skipped_frames(&self) -> u32 {
        self.skipped_frames
    }

    /// Feed the detections of one frame
    pub fn observe(&mut self, detections: &[FaceRegion]) -> TrackedFace {
        let Some(largest) = select_largest(detections) else {
            self.skipped_frames += 1;
            if self.skipped_frames > self.max_skipped_frames {
                info!("Face lost for {} frames, resetting subject", self.skipped_frames);
                self.reset();
                return TrackedFace {
                    region: self.previous,
                    subject_lost: true,
                };
            }
            return TrackedFace {
                region: self.previous,
                subject_lost: false,
            };
        };

        self.skipped_frames = 0;
        self.previous = self.stabilize(largest);
        TrackedFace {
            region: self.previous,
            subject_lost: false,
        }
    }

    /// Keep the previous face unless some side moved by more than the allowed difference
    #[must_use]
    pub fn stabilize(&self, detected: FaceRegion) -> FaceRegion {
        let moved = |old: i32, new: i32| (old - new).abs() > self.max_face_difference;
        let previous = self.previous;
        if moved(previous.x, detected.x)
            || moved(previous.y, detected.y)
            || moved(previous.width, detected.width)
            || moved(previous.height, detected.height)
        {
            detected
        } else {
            previous
        }
    }

    /// Forget the tracked face and the miss counter
    pub fn reset(&mut self) {
        self.previous = FaceRegion::default();
        self.skipped_frames = 0;
    }
}

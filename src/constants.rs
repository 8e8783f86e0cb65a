//! Constants used throughout the dressing room

/// Smallest detectable face, as a fraction of image width
pub const MIN_FACE_SIZE: f64 = 0.07;

/// Largest detectable face, as a fraction of image width
pub const MAX_FACE_SIZE: f64 = 0.8;

/// Cascade pyramid scale step
pub const DETECTION_SCALE_FACTOR: f64 = 1.1;

/// Neighbouring hits required to keep a cascade detection
pub const DETECTION_MIN_NEIGHBORS: i32 = 3;

/// Pixels two consecutive face detections may differ by before the change is accepted
pub const MAX_FACE_DIFFERENCE: i32 = 5;

/// Consecutive misses tolerated before the tracked face is dropped
pub const MAX_SKIPPED_FRAMES: u32 = 5;

/// Glasses vertical anchor, fraction of face height
pub const EYE_LEVEL: f64 = 0.4;

/// Face mask vertical anchor, fraction of face height
pub const MASK_SHIFT: f64 = 1.15;

/// Glasses and mask width, fraction of face width
pub const FACE_WIDTH_MULTIPLIER: f64 = 0.8;

/// Top (neck) vertical anchor, fraction of face height
pub const NECK_SHIFT: f64 = 1.3;

/// Where the waist is measured, fraction of face height below the face top
pub const WAIST_SHIFT: f64 = 3.2;

/// Top width relative to the measured waist
pub const WAIST_WIDTH: f64 = 1.05;

/// Waist search ROI width, fraction of face width
pub const WAIST_ROI_WIDTH_MULTIPLIER: f64 = 1.5;

/// Allowed asymmetry of waist edges, fraction of image width
pub const MAX_WAIST_REF_DIFFERENCE: f64 = 0.05;

/// Waist estimate used for photos when contours fail, fraction of face width
pub const WAIST_WIDTH_APPROX: f64 = 1.85;

/// Calibration bucket width for still images
pub const PHOTO_WAIST_PRECISION: f64 = 0.08;

/// Samples needed to calibrate on a still image
pub const PHOTO_WAIST_MIN_MATCHES: usize = 5;

/// Calibration bucket width for live video
pub const LIVE_WAIST_PRECISION: f64 = 0.06;

/// Samples needed to calibrate on live video
pub const LIVE_WAIST_MIN_MATCHES: usize = 25;

/// Canny lower hysteresis threshold
pub const CANNY_THRESHOLD_LOW: f64 = 85.0;

/// Canny upper hysteresis threshold
pub const CANNY_THRESHOLD_HIGH: f64 = CANNY_THRESHOLD_LOW * 2.0;

/// Box blur kernel applied before edge detection
pub const BLUR_KERNEL_SIZE: i32 = 3;

/// Divisor turning a region side into the long side of the morphology kernel
pub const CONTOUR_KERNEL_DIVISOR: i32 = 30;

/// Smallest long side of the morphology kernel
pub const MIN_CONTOUR_KERNEL: i32 = 2;

//! Configuration management for the dressing room

use crate::constants::{
    EYE_LEVEL, FACE_WIDTH_MULTIPLIER, LIVE_WAIST_MIN_MATCHES, LIVE_WAIST_PRECISION, MASK_SHIFT,
    MAX_FACE_DIFFERENCE, MAX_FACE_SIZE, MAX_SKIPPED_FRAMES, MAX_WAIST_REF_DIFFERENCE, MIN_FACE_SIZE,
    NECK_SHIFT, PHOTO_WAIST_MIN_MATCHES, PHOTO_WAIST_PRECISION, WAIST_ROI_WIDTH_MULTIPLIER,
    WAIST_SHIFT, WAIST_WIDTH, WAIST_WIDTH_APPROX,
};
use crate::garment::GarmentSpec;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cascade classifier files
    pub classifiers: ClassifierConfig,

    /// Tunables shared by both dressing pipelines
    #[serde(flatten)]
    pub dressing: DressingConfig,

    /// Garments worn by default
    pub outfit: Vec<GarmentSpec>,
}

/// Everything the detection and compositing pipelines need at run time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DressingConfig {
    /// Face detection configuration
    pub detection: DetectionConfig,

    /// Garment anchoring configuration
    pub placement: PlacementConfig,

    /// Waist estimation configuration
    pub waist: WaistConfig,
}

/// Cascade classifier file paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// More accurate frontal face cascade, tried first on photos
    pub primary_face: PathBuf,

    /// Faster frontal face cascade, used as fallback and for live video
    pub secondary_face: PathBuf,

    /// Eye cascade that copes with eyeglasses
    pub eyes: PathBuf,
}

/// Face detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum face size as a fraction of image width
    pub min_face_size: f64,

    /// Maximum face size as a fraction of image width
    pub max_face_size: f64,

    /// Jitter (in pixels) suppressed by stabilization
    pub max_face_difference: i32,

    /// Misses tolerated before the tracked face is dropped
    pub max_skipped_frames: u32,
}

/// Garment anchor parameters, all fractions of the face rectangle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Glasses anchor height
    pub eye_level: f64,

    /// Mask anchor height
    pub mask_shift: f64,

    /// Glasses and mask width relative to face width
    pub face_width_multiplier: f64,

    /// Top anchor height
    pub neck_shift: f64,

    /// Top width relative to waist width
    pub waist_width: f64,
}

/// Waist estimation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaistConfig {
    /// Waist height below the face top, fraction of face height
    pub waist_shift: f64,

    /// Width of each side ROI, fraction of face width
    pub roi_width_multiplier: f64,

    /// Allowed edge asymmetry, fraction of image width
    pub max_reference_difference: f64,

    /// Fallback waist ratio for photos
    pub fallback_ratio: f64,

    /// Calibration bucket width for photos
    pub photo_precision: f64,

    /// Calibration sample count for photos
    pub photo_min_matches: usize,

    /// Calibration bucket width for live video
    pub live_precision: f64,

    /// Calibration sample count for live video
    pub live_min_matches: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            primary_face: PathBuf::from("assets/haarcascade_frontalface_alt.xml"),
            secondary_face: PathBuf::from("assets/haarcascade_frontalface_alt2.xml"),
            eyes: PathBuf::from("assets/haarcascade_eye_tree_eyeglasses.xml"),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_face_size: MIN_FACE_SIZE,
            max_face_size: MAX_FACE_SIZE,
            max_face_difference: MAX_FACE_DIFFERENCE,
            max_skipped_frames: MAX_SKIPPED_FRAMES,
        }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            eye_level: EYE_LEVEL,
            mask_shift: MASK_SHIFT,
            face_width_multiplier: FACE_WIDTH_MULTIPLIER,
            neck_shift: NECK_SHIFT,
            waist_width: WAIST_WIDTH,
        }
    }
}

impl Default for WaistConfig {
    fn default() -> Self {
        Self {
            waist_shift: WAIST_SHIFT,
            roi_width_multiplier: WAIST_ROI_WIDTH_MULTIPLIER,
            max_reference_difference: MAX_WAIST_REF_DIFFERENCE,
            fallback_ratio: WAIST_WIDTH_APPROX,
            photo_precision: PHOTO_WAIST_PRECISION,
            photo_min_matches: PHOTO_WAIST_MIN_MATCHES,
            live_precision: LIVE_WAIST_PRECISION,
            live_min_matches: LIVE_WAIST_MIN_MATCHES,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// Classifier paths are checked when the classifiers are loaded.
    pub fn validate(&self) -> Result<()> {
        self.dressing.validate()
    }
}

impl DressingConfig {
    /// Validate numeric ranges
    pub fn validate(&self) -> Result<()> {
        let detection = &self.detection;
        if !(0.0..=1.0).contains(&detection.min_face_size) || !(0.0..=1.0).contains(&detection.max_face_size) {
            return Err(Error::ConfigError(
                "Face size bounds must be between 0.0 and 1.0".to_string(),
            ));
        }
        if detection.min_face_size >= detection.max_face_size {
            return Err(Error::ConfigError(
                "Minimum face size must be smaller than maximum face size".to_string(),
            ));
        }
        if detection.max_face_difference < 0 {
            return Err(Error::ConfigError(
                "Maximum face difference cannot be negative".to_string(),
            ));
        }

        let placement = &self.placement;
        if placement.face_width_multiplier <= 0.0 || placement.waist_width <= 0.0 {
            return Err(Error::ConfigError(
                "Garment width multipliers must be greater than 0".to_string(),
            ));
        }

        let waist = &self.waist;
        if waist.photo_precision <= 0.0 || waist.live_precision <= 0.0 {
            return Err(Error::ConfigError(
                "Waist calibration precision must be greater than 0".to_string(),
            ));
        }
        if waist.photo_min_matches == 0 || waist.live_min_matches == 0 {
            return Err(Error::ConfigError(
                "Waist calibration needs at least one match".to_string(),
            ));
        }
        if waist.roi_width_multiplier <= 0.0 || waist.fallback_ratio <= 0.0 {
            return Err(Error::ConfigError(
                "Waist ROI multiplier and fallback ratio must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&waist.max_reference_difference) {
            return Err(Error::ConfigError(
                "Waist reference difference must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Virtual Dressing Room Configuration

# Haar cascade files
classifiers:
  primary_face: "assets/haarcascade_frontalface_alt.xml"
  secondary_face: "assets/haarcascade_frontalface_alt2.xml"
  eyes: "assets/haarcascade_eye_tree_eyeglasses.xml"

# Face detection parameters
detection:
  min_face_size: 0.07
  max_face_size: 0.8
  max_face_difference: 5
  max_skipped_frames: 5

# Garment anchors
placement:
  eye_level: 0.4
  mask_shift: 1.15
  face_width_multiplier: 0.8
  neck_shift: 1.3
  waist_width: 1.05

# Waist estimation
waist:
  waist_shift: 3.2
  roi_width_multiplier: 1.5
  max_reference_difference: 0.05
  fallback_ratio: 1.85
  photo_precision: 0.08
  photo_min_matches: 5
  live_precision: 0.06
  live_min_matches: 25

# Garments
outfit:
  - kind: glasses
    image: "assets/glasses.png"
  - kind: top
    image: "assets/tshirt.png"
    left: [40.0, 30.0]
    right: [260.0, 30.0]
"#;

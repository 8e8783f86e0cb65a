//! The dressing room: still-image and real-time garment pipelines.

use crate::classifier::{Classifier, ClassifierSet};
use crate::compositor::{draw_clothing_on_image, BlendOutcome};
use crate::config::{Config, DressingConfig, PlacementConfig};
use crate::face_detection::{is_empty_region, FaceDetector, FaceRegion, FaceTracker, TrackedFace};
use crate::garment::{Garment, Outfit};
use crate::head_pose::head_rotation_angle;
use crate::rotation::{crop_centered, rotate_image, rotate_image_back};
use crate::session::DressingSession;
use crate::utils::safe_cast::round_to_i32;
use crate::waist::{photo_waist_ratio, WaistEstimator};
use crate::{Error, Result};
use log::{debug, info, warn};
use opencv::core::{Mat, Point2d};
use opencv::prelude::*;

/// Nose bridge, where glasses are centred
#[must_use]
pub fn glasses_anchor(face: FaceRegion, eye_level: f64) -> Point2d {
    Point2d::new(
        f64::from(round_to_i32(f64::from(face.x) + f64::from(face.width) / 2.0)),
        f64::from(round_to_i32(f64::from(face.y) + f64::from(face.height) * eye_level)),
    )
}

/// Chin, where face masks are centred
#[must_use]
pub fn mask_anchor(face: FaceRegion, mask_shift: f64) -> Point2d {
    Point2d::new(
        f64::from(face.x) + f64::from(face.width) / 2.0,
        f64::from(face.y) + f64::from(face.height) * mask_shift,
    )
}

/// Neck, where tops are centred
#[must_use]
pub fn neck_anchor(face: FaceRegion, neck_shift: f64) -> Point2d {
    Point2d::new(
        f64::from(round_to_i32(f64::from(face.x) + f64::from(face.width) / 2.0)),
        f64::from(round_to_i32(f64::from(face.y) + f64::from(face.height) * neck_shift)),
    )
}

fn draw_all(image: &mut Mat, garments: &[Garment], anchor: Point2d, target_width: f64) -> Result<()> {
    for garment in garments {
        let scale = target_width / garment.reference_width();
        if draw_clothing_on_image(image, garment, scale, anchor)? == BlendOutcome::Skipped {
            debug!("{:?} not drawn, nothing visible at {:?}", garment.kind(), anchor);
        }
    }
    Ok(())
}

fn add_glasses(image: &mut Mat, outfit: &Outfit, face: FaceRegion, placement: &PlacementConfig) -> Result<()> {
    if outfit.glasses().is_empty() {
        return Ok(());
    }
    let width = f64::from(face.width) * placement.face_width_multiplier;
    draw_all(image, outfit.glasses(), glasses_anchor(face, placement.eye_level), width)
}

fn add_face_masks(image: &mut Mat, outfit: &Outfit, face: FaceRegion, placement: &PlacementConfig) -> Result<()> {
    if outfit.face_masks().is_empty() {
        return Ok(());
    }
    let width = f64::from(face.width) * placement.face_width_multiplier;
    draw_all(image, outfit.face_masks(), mask_anchor(face, placement.mask_shift), width)
}

/// Tops on a still image, falling back to an approximate waist
fn add_tops(image: &mut Mat, outfit: &Outfit, face: FaceRegion, config: &DressingConfig) -> Result<()> {
    if outfit.tops().is_empty() {
        return Ok(());
    }
    let face_width = f64::from(face.width);
    let waist = match photo_waist_ratio(image, face, &config.waist)? {
        Some(ratio) => ratio * face_width,
        None => {
            debug!("Waist not found, using the approximate width");
            f64::from(round_to_i32(face_width * config.waist.fallback_ratio))
        }
    };
    let width = waist * config.placement.waist_width;
    draw_all(image, outfit.tops(), neck_anchor(face, config.placement.neck_shift), width)
}

/// Dress a video frame at an already stabilized face
///
/// Tops need a calibrated waist and are skipped until `waist` has one.
pub(crate) fn dress_realtime(
    frame: &mut Mat,
    outfit: &Outfit,
    face: FaceRegion,
    placement: &PlacementConfig,
    waist: &mut WaistEstimator,
) -> Result<()> {
    if frame.empty() {
        return Err(Error::InvalidInput("Frame cannot be empty".to_string()));
    }

    add_face_masks(frame, outfit, face, placement)?;
    add_glasses(frame, outfit, face, placement)?;

    if outfit.tops().is_empty() {
        return Ok(());
    }
    let Some(ratio) = waist.ratio_or_calibrate(frame, face)? else {
        return Ok(());
    };
    let width = ratio * placement.waist_width * f64::from(face.width);
    draw_all(frame, outfit.tops(), neck_anchor(face, placement.neck_shift), width)
}

/// Face detection plus garment compositing
///
/// Owns the loaded classifiers. Live sessions keep their state in a
/// [`DressingSession`] so one room can serve a photo and a video stream.
pub struct DressingRoom {
    detector: FaceDetector,
    eyes: Box<dyn Classifier>,
    config: DressingConfig,
}

impl DressingRoom {
    /// Create a dressing room from loaded classifiers
    #[must_use]
    pub fn new(classifiers: ClassifierSet, config: DressingConfig) -> Self {
        let detector = FaceDetector::new(classifiers.primary_face, classifiers.secondary_face, &config.detection);
        Self {
            detector,
            eyes: classifiers.eyes,
            config,
        }
    }

    /// Validate `config` and load every cascade it names
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a cascade fails to load
    pub fn load(config: &Config) -> Result<Self> {
        config.validate()?;
        let classifiers = ClassifierSet::load(&config.classifiers)?;
        info!("Dressing room ready");
        Ok(Self::new(classifiers, config.dressing.clone()))
    }

    /// Tunables in use
    #[must_use]
    pub fn config(&self) -> &DressingConfig {
        &self.config
    }

    /// Start a live session with this room's settings
    #[must_use]
    pub fn new_session(&self) -> DressingSession {
        DressingSession::new(&self.config)
    }

    /// Largest face in a still image, empty when none is found
    ///
    /// # Errors
    ///
    /// Returns an error if an OpenCV operation fails
    pub fn detect_face(&mut self, image: &Mat) -> Result<FaceRegion> {
        self.detector.detect_face(image)
    }

    /// Dress the person in a still image
    ///
    /// The head tilt is measured from the eyes and glasses and masks are drawn
    /// on a levelled copy, which is then turned back. Tops are drawn last on
    /// the unrotated image.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoFaceDetected` when no face is found, or an error if an
    /// OpenCV operation fails
    pub fn detect_and_add_clothing(&mut self, image: &Mat, outfit: &Outfit) -> Result<Mat> {
        if outfit.is_empty() {
            return Ok(image.try_clone()?);
        }
        if image.empty() {
            return Err(Error::InvalidInput("Image cannot be empty".to_string()));
        }

        let face = self.detector.detect_face(image)?;
        if is_empty_region(&face) {
            return Err(Error::NoFaceDetected);
        }
        debug!("Face found at {:?}", face);

        let angle = head_rotation_angle(image, face, self.eyes.as_mut(), self.config.placement.eye_level)?;
        let mut rotated = rotate_image(image, -angle)?;
        let rotated_face = self.detector.detect_face(&rotated)?;
        let placement = &self.config.placement;

        if is_empty_region(&rotated_face) {
            debug!("Face lost after levelling by {:.1} degrees, drawing untilted", angle);
            let mut result = image.try_clone()?;
            add_glasses(&mut result, outfit, face, placement)?;
            add_face_masks(&mut result, outfit, face, placement)?;
            add_tops(&mut result, outfit, face, &self.config)?;
            return Ok(result);
        }

        add_face_masks(&mut rotated, outfit, rotated_face, placement)?;
        add_glasses(&mut rotated, outfit, rotated_face, placement)?;

        let restored = rotate_image_back(&rotated, angle)?;
        let mut result = crop_centered(&restored, image.cols(), image.rows())?;

        // tops cover features face detection relies on
        add_tops(&mut result, outfit, face, &self.config)?;
        Ok(result)
    }

    /// Run top-half face detection on a video frame and update `tracker`
    ///
    /// Never fails: detection errors count as a missed frame.
    pub fn track_face(&mut self, frame: &Mat, tracker: &mut FaceTracker) -> TrackedFace {
        tracker.observe(&self.upper_half_faces(frame))
    }

    /// Stabilized face for a video frame
    ///
    /// Returns the cached face on a miss and an empty region once the subject
    /// is lost, which also resets the session's waist calibration.
    pub fn get_face(&mut self, frame: &Mat, session: &mut DressingSession) -> FaceRegion {
        session.observe(&self.upper_half_faces(frame)).region
    }

    fn upper_half_faces(&mut self, frame: &Mat) -> Vec<FaceRegion> {
        if frame.empty() {
            return Vec::new();
        }
        self.detector.detect_upper_half(frame).unwrap_or_else(|e| {
            warn!("Face detection failed: {}", e);
            Vec::new()
        })
    }

    /// Dress a video frame in place at `face`
    ///
    /// No tilt correction is done. Tops are drawn once the session's waist is
    /// calibrated.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty frame, or an error if an
    /// OpenCV operation fails
    pub fn add_clothes_rt(&self, frame: &mut Mat, outfit: &Outfit, face: FaceRegion, session: &mut DressingSession) -> Result<()> {
        dress_realtime(frame, outfit, face, &self.config.placement, session.waist_mut())
    }

    /// Forget the session's waist so it is measured again
    pub fn recalculate_waist_width(&self, session: &mut DressingSession) {
        session.recalculate_waist_width();
    }
}

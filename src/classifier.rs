//! Cascade classifier loading and application.

use crate::config::ClassifierConfig;
use crate::constants::{DETECTION_MIN_NEIGHBORS, DETECTION_SCALE_FACTOR};
use crate::utils::to_grayscale;
use crate::{Error, Result};
use log::info;
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::imgproc;
use opencv::objdetect::{self, CascadeClassifier};
use opencv::prelude::*;
use std::path::Path;

/// A pre-trained object detector applied to an equalized grayscale image
pub trait Classifier: Send {
    /// Run multi-scale detection
    ///
    /// A zero `Size` leaves that bound open.
    fn detect_multi_scale(&mut self, gray: &Mat, min_size: Size, max_size: Size) -> Result<Vec<Rect>>;
}

/// Haar cascade backed by OpenCV
pub struct HaarClassifier {
    cascade: CascadeClassifier,
}

impl HaarClassifier {
    /// Load a cascade from an XML file
    ///
    /// # Errors
    ///
    /// Returns `Error::ClassifierLoad` if the file is missing or is not a valid cascade
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        if !path.exists() {
            return Err(Error::ClassifierLoad(format!("Cascade file not found: {name}")));
        }

        let cascade = CascadeClassifier::new(&name)
            .map_err(|e| Error::ClassifierLoad(format!("Failed to load {name}: {e}")))?;
        if cascade.empty()? {
            return Err(Error::ClassifierLoad(format!("Cascade {name} is empty")));
        }

        info!("Loaded cascade {}", name);
        Ok(Self { cascade })
    }
}

impl Classifier for HaarClassifier {
    fn detect_multi_scale(&mut self, gray: &Mat, min_size: Size, max_size: Size) -> Result<Vec<Rect>> {
        let mut objects = Vector::<Rect>::new();
        self.cascade.detect_multi_scale(
            gray,
            &mut objects,
            DETECTION_SCALE_FACTOR,
            DETECTION_MIN_NEIGHBORS,
            objdetect::CASCADE_SCALE_IMAGE,
            min_size,
            max_size,
        )?;
        Ok(objects.to_vec())
    }
}

/// The three classifiers the dressing room needs
pub struct ClassifierSet {
    /// More accurate face cascade
    pub primary_face: Box<dyn Classifier>,
    /// Faster face cascade
    pub secondary_face: Box<dyn Classifier>,
    /// Eye cascade
    pub eyes: Box<dyn Classifier>,
}

impl ClassifierSet {
    /// Load every cascade named in the configuration
    ///
    /// # Errors
    ///
    /// Any cascade that fails to load is fatal
    pub fn load(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            primary_face: Box::new(HaarClassifier::load(&config.primary_face)?),
            secondary_face: Box::new(HaarClassifier::load(&config.secondary_face)?),
            eyes: Box::new(HaarClassifier::load(&config.eyes)?),
        })
    }
}

/// Grayscale, equalize, then detect objects whose size lies within `[min_size, max_size]` pixels
///
/// # Errors
///
/// Returns an error if preprocessing or detection fails
pub fn apply_classifier(image: &Mat, classifier: &mut dyn Classifier, min_size: i32, max_size: i32) -> Result<Vec<Rect>> {
    let equalized = equalized_gray(image)?;
    classifier.detect_multi_scale(
        &equalized,
        Size::new(min_size, min_size),
        Size::new(max_size, max_size),
    )
}

/// Like [`apply_classifier`] without any size filter
///
/// # Errors
///
/// Returns an error if preprocessing or detection fails
pub fn apply_classifier_unbounded(image: &Mat, classifier: &mut dyn Classifier) -> Result<Vec<Rect>> {
    let equalized = equalized_gray(image)?;
    classifier.detect_multi_scale(&equalized, Size::default(), Size::default())
}

fn equalized_gray(image: &Mat) -> Result<Mat> {
    let gray = to_grayscale(image)?;
    let mut equalized = Mat::default();
    imgproc::equalize_hist(&gray, &mut equalized)?;
    Ok(equalized)
}

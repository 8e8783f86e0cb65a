//! Garment sprites and outfits.

use crate::utils::image_conversion::mat_from_rgba_image;
use crate::{Error, Result};
use opencv::core::{Mat, Point2d};
use opencv::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What a garment is, which fixes the meaning of its reference points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GarmentKind {
    /// Reference points mark the waist edges; aligned below the neck
    Top,
    /// Reference points mark the face edges at eye level; aligned to the nose bridge
    Glasses,
    /// Reference points mark the face edges at the chin; aligned to the chin
    FaceMask,
}

/// A garment sprite with its two anchor points
#[derive(Debug, Clone)]
pub struct Garment {
    buffer: Mat,
    left_reference_point: Point2d,
    right_reference_point: Point2d,
    kind: GarmentKind,
}

impl Garment {
    /// Create a garment from a BGR or BGRA sprite and explicit reference points
    #[must_use]
    pub fn new(buffer: Mat, left_reference_point: Point2d, right_reference_point: Point2d, kind: GarmentKind) -> Self {
        Self {
            buffer,
            left_reference_point,
            right_reference_point,
            kind,
        }
    }

    /// Create a garment with reference points derived from the sprite size
    ///
    /// Glasses use the sprite edges at a third of its height, masks use the
    /// bottom corners.
    ///
    /// # Errors
    ///
    /// Tops have no sensible default and are rejected
    pub fn with_default_reference_points(buffer: Mat, kind: GarmentKind) -> Result<Self> {
        let width = f64::from(buffer.cols());
        let height = f64::from(buffer.rows());
        let (left, right) = match kind {
            GarmentKind::Glasses => (Point2d::new(0.0, height / 3.0), Point2d::new(width, height / 3.0)),
            GarmentKind::FaceMask => (Point2d::new(0.0, height), Point2d::new(width, height)),
            GarmentKind::Top => {
                return Err(Error::InvalidInput(
                    "Tops need explicit reference points".to_string(),
                ))
            }
        };
        Ok(Self::new(buffer, left, right, kind))
    }

    /// Decode an image file into a garment
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails or a top has no reference points
    pub fn from_image_file<P: AsRef<Path>>(path: P, kind: GarmentKind, points: Option<(Point2d, Point2d)>) -> Result<Self> {
        let image = image::open(path)?.to_rgba8();
        let buffer = mat_from_rgba_image(&image)?;
        match points {
            Some((left, right)) => Ok(Self::new(buffer, left, right, kind)),
            None => Self::with_default_reference_points(buffer, kind),
        }
    }

    /// Sprite pixels
    #[must_use]
    pub fn buffer(&self) -> &Mat {
        &self.buffer
    }

    /// Replace the sprite pixels
    pub fn set_buffer(&mut self, buffer: Mat) {
        self.buffer = buffer;
    }

    /// Garment kind
    #[must_use]
    pub fn kind(&self) -> GarmentKind {
        self.kind
    }

    #[must_use]
    pub fn left_reference_point(&self) -> Point2d {
        self.left_reference_point
    }

    #[must_use]
    pub fn right_reference_point(&self) -> Point2d {
        self.right_reference_point
    }

    pub fn set_left_reference_point(&mut self, point: Point2d) {
        self.left_reference_point = point;
    }

    pub fn set_right_reference_point(&mut self, point: Point2d) {
        self.right_reference_point = point;
    }

    /// Midpoint of the two reference points
    #[must_use]
    pub fn reference_center(&self) -> Point2d {
        Point2d::new(
            (self.left_reference_point.x + self.right_reference_point.x) / 2.0,
            (self.left_reference_point.y + self.right_reference_point.y) / 2.0,
        )
    }

    /// Distance between the two reference points
    #[must_use]
    pub fn reference_width(&self) -> f64 {
        let dx = self.right_reference_point.x - self.left_reference_point.x;
        let dy = self.right_reference_point.y - self.left_reference_point.y;
        dx.hypot(dy)
    }
}

/// Garment described in a configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentSpec {
    /// Garment kind
    pub kind: GarmentKind,
    /// Image file (PNG with alpha recommended)
    pub image: PathBuf,
    /// Left reference point in sprite pixels
    #[serde(default)]
    pub left: Option<[f64; 2]>,
    /// Right reference point in sprite pixels
    #[serde(default)]
    pub right: Option<[f64; 2]>,
}

impl GarmentSpec {
    /// Load the described garment
    ///
    /// # Errors
    ///
    /// Returns an error if only one reference point is given, or loading fails
    pub fn load(&self) -> Result<Garment> {
        let points = match (self.left, self.right) {
            (Some([lx, ly]), Some([rx, ry])) => Some((Point2d::new(lx, ly), Point2d::new(rx, ry))),
            (None, None) => None,
            _ => {
                return Err(Error::InvalidInput(format!(
                    "Garment {} needs both reference points or neither",
                    self.image.display()
                )))
            }
        };
        Garment::from_image_file(&self.image, self.kind, points)
    }
}

/// A bundle of selected garments
///
/// Order within each kind is the draw order.
#[derive(Debug, Clone, Default)]
pub struct Outfit {
    glasses: Vec<Garment>,
    face_masks: Vec<Garment>,
    tops: Vec<Garment>,
}

impl Outfit {
    /// Create an empty outfit
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an outfit holding at most one garment of each kind
    ///
    /// Each garment is retagged to the slot it is given in.
    #[must_use]
    pub fn from_parts(glasses: Option<Garment>, face_mask: Option<Garment>, top: Option<Garment>) -> Self {
        let mut outfit = Self::new();
        outfit.set(GarmentKind::Glasses, glasses);
        outfit.set(GarmentKind::FaceMask, face_mask);
        outfit.set(GarmentKind::Top, top);
        outfit
    }

    /// Add a garment to the list matching its kind
    pub fn push(&mut self, garment: Garment) {
        self.list_mut(garment.kind()).push(garment);
    }

    /// Garments of one kind
    #[must_use]
    pub fn garments(&self, kind: GarmentKind) -> &[Garment] {
        match kind {
            GarmentKind::Glasses => &self.glasses,
            GarmentKind::FaceMask => &self.face_masks,
            GarmentKind::Top => &self.tops,
        }
    }

    #[must_use]
    pub fn glasses(&self) -> &[Garment] {
        &self.glasses
    }

    #[must_use]
    pub fn face_masks(&self) -> &[Garment] {
        &self.face_masks
    }

    #[must_use]
    pub fn tops(&self) -> &[Garment] {
        &self.tops
    }

    /// Append glasses; the garment is retagged as glasses
    pub fn add_glasses(&mut self, garment: Garment) {
        self.add(GarmentKind::Glasses, garment);
    }

    /// Append a face mask; the garment is retagged as a mask
    pub fn add_face_mask(&mut self, garment: Garment) {
        self.add(GarmentKind::FaceMask, garment);
    }

    /// Append a top; the garment is retagged as a top
    pub fn add_top(&mut self, garment: Garment) {
        self.add(GarmentKind::Top, garment);
    }

    /// Replace all glasses
    pub fn set_glasses(&mut self, garment: Option<Garment>) {
        self.set(GarmentKind::Glasses, garment);
    }

    /// Replace all face masks
    pub fn set_face_mask(&mut self, garment: Option<Garment>) {
        self.set(GarmentKind::FaceMask, garment);
    }

    /// Replace all tops
    pub fn set_top(&mut self, garment: Option<Garment>) {
        self.set(GarmentKind::Top, garment);
    }

    pub fn clear_glasses(&mut self) {
        self.glasses.clear();
    }

    pub fn clear_face_masks(&mut self) {
        self.face_masks.clear();
    }

    pub fn clear_tops(&mut self) {
        self.tops.clear();
    }

    /// Remove and return the garment of `kind` at `index`, if present
    pub fn remove(&mut self, kind: GarmentKind, index: usize) -> Option<Garment> {
        let list = self.list_mut(kind);
        (index < list.len()).then(|| list.remove(index))
    }

    /// True when no garment of any kind is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        // every kind must be listed here
        self.tops.is_empty() && self.glasses.is_empty() && self.face_masks.is_empty()
    }

    /// Total number of garments
    #[must_use]
    pub fn len(&self) -> usize {
        self.tops.len() + self.glasses.len() + self.face_masks.len()
    }

    fn add(&mut self, kind: GarmentKind, mut garment: Garment) {
        garment.kind = kind;
        self.list_mut(kind).push(garment);
    }

    fn set(&mut self, kind: GarmentKind, garment: Option<Garment>) {
        self.list_mut(kind).clear();
        if let Some(garment) = garment {
            self.add(kind, garment);
        }
    }

    fn list_mut(&mut self, kind: GarmentKind) -> &mut Vec<Garment> {
        match kind {
            GarmentKind::Glasses => &mut self.glasses,
            GarmentKind::FaceMask => &mut self.face_masks,
            GarmentKind::Top => &mut self.tops,
        }
    }
}

//! Helper functions and utilities for tests

#![allow(dead_code)]

use opencv::{
    core::{Mat, Point2d, Rect, Scalar, Size, CV_8UC3, CV_8UC4},
    imgproc,
    prelude::*,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use virtual_dressing_room::{
    classifier::{Classifier, ClassifierSet},
    config::DressingConfig,
    engine::DressingRoom,
    garment::{Garment, GarmentKind},
    Result,
};

/// Classifier that replays scripted detections, then repeats the last one
pub struct ScriptedClassifier {
    responses: VecDeque<Vec<Rect>>,
    last: Vec<Rect>,
}

impl ScriptedClassifier {
    pub fn new(responses: Vec<Vec<Rect>>) -> Self {
        Self {
            responses: responses.into(),
            last: Vec::new(),
        }
    }

    /// Always report the same detections
    pub fn always(hits: Vec<Rect>) -> Box<dyn Classifier> {
        Box::new(Self::new(vec![hits]))
    }

    /// Never detect anything
    pub fn never() -> Box<dyn Classifier> {
        Box::new(Self::new(Vec::new()))
    }
}

impl Classifier for ScriptedClassifier {
    fn detect_multi_scale(&mut self, _gray: &Mat, _min_size: Size, _max_size: Size) -> Result<Vec<Rect>> {
        if let Some(next) = self.responses.pop_front() {
            self.last = next;
        }
        Ok(self.last.clone())
    }
}

/// Classifier that records the size of every image it is shown
pub struct RecordingClassifier {
    seen: Arc<Mutex<Vec<Size>>>,
    hits: Vec<Rect>,
}

impl RecordingClassifier {
    /// Classifier plus a handle to the sizes it has seen
    pub fn new(hits: Vec<Rect>) -> (Box<dyn Classifier>, Arc<Mutex<Vec<Size>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let classifier = Self {
            seen: Arc::clone(&seen),
            hits,
        };
        (Box::new(classifier), seen)
    }
}

impl Classifier for RecordingClassifier {
    fn detect_multi_scale(&mut self, gray: &Mat, _min_size: Size, _max_size: Size) -> Result<Vec<Rect>> {
        self.seen.lock().unwrap().push(gray.size()?);
        Ok(self.hits.clone())
    }
}

/// Dressing room whose classifiers are fakes
pub fn fake_room(primary: Box<dyn Classifier>, secondary: Box<dyn Classifier>, eyes: Box<dyn Classifier>) -> DressingRoom {
    fake_room_with_config(primary, secondary, eyes, DressingConfig::default())
}

pub fn fake_room_with_config(
    primary: Box<dyn Classifier>,
    secondary: Box<dyn Classifier>,
    eyes: Box<dyn Classifier>,
    config: DressingConfig,
) -> DressingRoom {
    DressingRoom::new(
        ClassifierSet {
            primary_face: primary,
            secondary_face: secondary,
            eyes,
        },
        config,
    )
}

/// Uniform BGR image
pub fn create_test_image(height: i32, width: i32, value: f64) -> Mat {
    Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(value)).unwrap()
}

/// 600x400 white image with a dark torso spanning x `left..right` from y 150 down
pub fn torso_image(left: i32, right: i32) -> Mat {
    let mut image = create_test_image(600, 400, 255.0);
    imgproc::rectangle(
        &mut image,
        Rect::new(left, 150, right - left, 450),
        Scalar::all(0.0),
        -1,
        imgproc::LINE_8,
        0,
    )
    .unwrap();
    image
}

/// Face matching [`torso_image`]
pub const TORSO_FACE: Rect = Rect {
    x: 150,
    y: 50,
    width: 100,
    height: 100,
};

/// Opaque single-colour BGRA sprite
pub fn solid_sprite(width: i32, height: i32, bgr: (f64, f64, f64)) -> Mat {
    Mat::new_rows_cols_with_default(height, width, CV_8UC4, Scalar::new(bgr.0, bgr.1, bgr.2, 255.0)).unwrap()
}

/// 40x20 red glasses referenced at their vertical centre
pub fn red_glasses() -> Garment {
    Garment::new(
        solid_sprite(40, 20, (0.0, 0.0, 255.0)),
        Point2d::new(0.0, 10.0),
        Point2d::new(40.0, 10.0),
        GarmentKind::Glasses,
    )
}

/// 100x10 blue top referenced along its upper edge
pub fn blue_top() -> Garment {
    Garment::new(
        solid_sprite(100, 10, (255.0, 0.0, 0.0)),
        Point2d::new(0.0, 0.0),
        Point2d::new(100.0, 0.0),
        GarmentKind::Top,
    )
}

/// 50x20 green mask referenced along its lower edge
pub fn green_mask() -> Garment {
    Garment::new(
        solid_sprite(50, 20, (0.0, 255.0, 0.0)),
        Point2d::new(0.0, 20.0),
        Point2d::new(50.0, 20.0),
        GarmentKind::FaceMask,
    )
}

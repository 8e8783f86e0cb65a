//! Head tilt estimation from eye positions.

use crate::classifier::{apply_classifier_unbounded, Classifier};
use crate::face_detection::FaceRegion;
use crate::utils::clip_to_image;
use crate::Result;
use log::debug;
use opencv::core::{Mat, Point2d, Rect};
use opencv::prelude::*;

/// Rotation, in degrees, that levels the eyes inside `face`
///
/// Eyes are searched inside the face region without a size filter. With
/// fewer than two eyes no correction is possible and 0 is returned.
///
/// # Errors
///
/// Returns an error if an OpenCV operation fails
pub fn head_rotation_angle(image: &Mat, face: FaceRegion, eyes: &mut dyn Classifier, eye_level: f64) -> Result<f64> {
    let Some(face) = clip_to_image(face, image.cols(), image.rows()) else {
        return Ok(0.0);
    };
    let face_image = Mat::roi(image, face)?.try_clone()?;
    let detected = apply_classifier_unbounded(&face_image, eyes)?;

    Ok(correction_angle(&detected, face.height, eye_level))
}

/// Correction angle for eye rectangles given in face-local coordinates
///
/// When more than two eyes are found, the two whose centres lie closest to
/// `eye_level * face_height` are used. The result is the negated tilt of the
/// line through both eye centres.
#[must_use]
pub fn correction_angle(eyes: &[Rect], face_height: i32, eye_level: f64) -> f64 {
    if eyes.len() < 2 {
        debug!("Less than 2 eyes detected");
        return 0.0;
    }

    let level = f64::from(face_height) * eye_level;
    let mut centers: Vec<Point2d> = eyes.iter().map(eye_center).collect();
    centers.sort_by(|a, b| (level - a.y).abs().total_cmp(&(level - b.y).abs()));

    let (left, right) = if centers[0].x > centers[1].x {
        (centers[1], centers[0])
    } else {
        (centers[0], centers[1])
    };

    let tilt = (right.y - left.y).atan2(right.x - left.x).to_degrees();
    -tilt
}

fn eye_center(eye: &Rect) -> Point2d {
    Point2d::new(
        f64::from(eye.x) + f64::from(eye.width) / 2.0,
        f64::from(eye.y) + f64::from(eye.height) / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, Size, CV_8UC3};

    struct ScriptedEyes(Vec<Rect>);

    impl Classifier for ScriptedEyes {
        fn detect_multi_scale(&mut self, _gray: &Mat, _min: Size, _max: Size) -> Result<Vec<Rect>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_single_eye_gives_no_correction() {
        assert!(correction_angle(&[Rect::new(10, 10, 10, 10)], 100, 0.4).abs() < f64::EPSILON);
        assert!(correction_angle(&[], 100, 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_level_eyes_give_zero() {
        let eyes = [Rect::new(20, 30, 10, 10), Rect::new(60, 30, 10, 10)];
        assert!(correction_angle(&eyes, 100, 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_tilt_is_negated() {
        // right eye 40 px right and 40 px lower: a 45 degree tilt
        let eyes = [Rect::new(60, 70, 10, 10), Rect::new(20, 30, 10, 10)];
        let angle = correction_angle(&eyes, 100, 0.4);
        assert!((angle + 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_extra_candidates_filtered_by_eye_level() {
        // mouth false positive far below eye level
        let eyes = [
            Rect::new(40, 80, 20, 10),
            Rect::new(20, 35, 10, 10),
            Rect::new(60, 35, 10, 10),
        ];
        assert!(correction_angle(&eyes, 100, 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_head_rotation_angle_uses_classifier() {
        let image = Mat::new_rows_cols_with_default(200, 200, CV_8UC3, Scalar::all(128.0)).unwrap();
        let mut eyes = ScriptedEyes(vec![Rect::new(20, 30, 10, 10), Rect::new(60, 70, 10, 10)]);
        let angle = head_rotation_angle(&image, Rect::new(50, 50, 100, 100), &mut eyes, 0.4).unwrap();
        assert!((angle + 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_face_outside_image_gives_zero() {
        let image = Mat::new_rows_cols_with_default(50, 50, CV_8UC3, Scalar::all(128.0)).unwrap();
        let mut eyes = ScriptedEyes(vec![Rect::new(0, 0, 5, 5), Rect::new(10, 10, 5, 5)]);
        let angle = head_rotation_angle(&image, Rect::new(100, 100, 20, 20), &mut eyes, 0.4).unwrap();
        assert!(angle.abs() < f64::EPSILON);
    }
}

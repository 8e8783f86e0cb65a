//! Integration tests for the still-image dressing pipeline

mod test_helpers;

use opencv::{
    core::{self, Mat, Rect, Scalar, Size, Vec3b, VecN},
    prelude::*,
};
use test_helpers::{blue_top, create_test_image, fake_room, green_mask, red_glasses, torso_image, ScriptedClassifier, TORSO_FACE};
use virtual_dressing_room::{garment::Outfit, Error};

const FACE: Rect = Rect {
    x: 100,
    y: 100,
    width: 200,
    height: 200,
};

fn red_pixel_count(image: &Mat) -> i32 {
    let mut mask = Mat::default();
    core::in_range(image, &Scalar::new(0.0, 0.0, 200.0, 0.0), &Scalar::new(50.0, 50.0, 255.0, 0.0), &mut mask).unwrap();
    core::count_non_zero(&mask).unwrap()
}

#[test]
fn test_glasses_reference_center_lands_on_nose_bridge() {
    let mut room = fake_room(
        ScriptedClassifier::always(vec![FACE]),
        ScriptedClassifier::never(),
        ScriptedClassifier::never(),
    );
    let outfit = Outfit::from_parts(Some(red_glasses()), None, None);

    let result = room.detect_and_add_clothing(&create_test_image(400, 400, 128.0), &outfit).unwrap();

    // scale 0.8 * 200 / 40 = 4, the 160x80 sprite is centred at (200, 180)
    assert_eq!(*result.at_2d::<Vec3b>(180, 200).unwrap(), VecN([0, 0, 255]));
    assert_eq!(red_pixel_count(&result), 160 * 80);
}

#[test]
fn test_mask_sits_on_chin() {
    let mut room = fake_room(
        ScriptedClassifier::always(vec![FACE]),
        ScriptedClassifier::never(),
        ScriptedClassifier::never(),
    );
    let outfit = Outfit::from_parts(Some(red_glasses()), Some(green_mask()), None);

    let result = room.detect_and_add_clothing(&create_test_image(400, 400, 128.0), &outfit).unwrap();

    // 160x64 mask whose lower edge is the chin at y 330
    assert_eq!(*result.at_2d::<Vec3b>(300, 200).unwrap(), VecN([0, 255, 0]));
    assert_eq!(*result.at_2d::<Vec3b>(328, 121).unwrap(), VecN([0, 255, 0]));
    assert_eq!(*result.at_2d::<Vec3b>(335, 200).unwrap(), VecN([128, 128, 128]));
    assert_eq!(*result.at_2d::<Vec3b>(180, 200).unwrap(), VecN([0, 0, 255]));
}

#[test]
fn test_tilted_head_keeps_image_size() {
    // eye centres (50, 80) and (150, 100) inside the face: about 11 degrees of tilt
    let eyes = ScriptedClassifier::always(vec![Rect::new(40, 70, 20, 20), Rect::new(140, 90, 20, 20)]);
    let mut room = fake_room(ScriptedClassifier::always(vec![FACE]), ScriptedClassifier::never(), eyes);
    let outfit = Outfit::from_parts(Some(red_glasses()), None, None);

    let image = create_test_image(400, 400, 128.0);
    let result = room.detect_and_add_clothing(&image, &outfit).unwrap();

    assert_eq!(result.size().unwrap(), Size::new(400, 400));
    assert!(red_pixel_count(&result) > 10_000);
    // the rotation centre is away from the glasses
    assert_eq!(*result.at_2d::<Vec3b>(200, 200).unwrap(), VecN([128, 128, 128]));
}

#[test]
fn test_tilted_head_top_stays_level_at_neck() {
    let eyes = ScriptedClassifier::always(vec![Rect::new(40, 70, 20, 20), Rect::new(140, 90, 20, 20)]);
    let mut room = fake_room(ScriptedClassifier::always(vec![FACE]), ScriptedClassifier::never(), eyes);
    let outfit = Outfit::from_parts(None, None, Some(blue_top()));

    let result = room.detect_and_add_clothing(&create_test_image(400, 400, 128.0), &outfit).unwrap();

    // no torso: 1.85 * 200 * 1.05 wide, 389x39 from x 5, upper edge at 100 + 1.3 * 200
    let blue = VecN([255, 0, 0]);
    let gray = VecN([128, 128, 128]);
    for col in [10, 100, 200, 300, 390] {
        assert_eq!(*result.at_2d::<Vec3b>(359, col).unwrap(), gray, "above the neck at column {col}");
        assert_eq!(*result.at_2d::<Vec3b>(360, col).unwrap(), blue, "neck row at column {col}");
        assert_eq!(*result.at_2d::<Vec3b>(398, col).unwrap(), blue, "lowest row at column {col}");
    }
}

#[test]
fn test_steep_tilt_on_wide_photo_is_dressed() {
    // eye centres (25, 25) and (45, 60): about 60 degrees
    let face = Rect::new(270, 80, 100, 100);
    let eyes = ScriptedClassifier::always(vec![Rect::new(20, 20, 10, 10), Rect::new(40, 55, 10, 10)]);
    let mut room = fake_room(ScriptedClassifier::always(vec![face]), ScriptedClassifier::never(), eyes);
    let outfit = Outfit::from_parts(Some(red_glasses()), None, None);

    let result = room.detect_and_add_clothing(&create_test_image(360, 640, 128.0), &outfit).unwrap();

    assert_eq!(result.size().unwrap(), Size::new(640, 360));
    assert!(red_pixel_count(&result) > 0);
}

#[test]
fn test_top_uses_measured_waist() {
    let mut room = fake_room(
        ScriptedClassifier::always(vec![TORSO_FACE]),
        ScriptedClassifier::never(),
        ScriptedClassifier::never(),
    );
    let outfit = Outfit::from_parts(None, None, Some(blue_top()));

    let result = room.detect_and_add_clothing(&torso_image(80, 320), &outfit).unwrap();

    // waist about 2.4 face widths: 252 px wide from x 74, top edge at the neck (y 180)
    assert_eq!(*result.at_2d::<Vec3b>(190, 200).unwrap(), VecN([255, 0, 0]));
    assert_eq!(*result.at_2d::<Vec3b>(190, 78).unwrap(), VecN([255, 0, 0]));
    assert_eq!(*result.at_2d::<Vec3b>(190, 60).unwrap(), VecN([255, 255, 255]));
    assert_eq!(*result.at_2d::<Vec3b>(175, 200).unwrap(), VecN([0, 0, 0]));
}

#[test]
fn test_top_without_waist_uses_approximation() {
    let mut room = fake_room(
        ScriptedClassifier::always(vec![TORSO_FACE]),
        ScriptedClassifier::never(),
        ScriptedClassifier::never(),
    );
    let outfit = Outfit::from_parts(None, None, Some(blue_top()));

    let result = room.detect_and_add_clothing(&create_test_image(600, 400, 255.0), &outfit).unwrap();

    // 1.85 * 100 rounded, times 1.05: 194 px wide from x 102
    assert_eq!(*result.at_2d::<Vec3b>(190, 105).unwrap(), VecN([255, 0, 0]));
    assert_eq!(*result.at_2d::<Vec3b>(190, 100).unwrap(), VecN([255, 255, 255]));
}

#[test]
fn test_no_face_is_reported() {
    let mut room = fake_room(ScriptedClassifier::never(), ScriptedClassifier::never(), ScriptedClassifier::never());
    let outfit = Outfit::from_parts(Some(red_glasses()), None, None);

    let result = room.detect_and_add_clothing(&create_test_image(300, 300, 90.0), &outfit);
    assert!(matches!(result, Err(Error::NoFaceDetected)));
}

#[test]
fn test_empty_outfit_skips_detection() {
    let mut room = fake_room(ScriptedClassifier::never(), ScriptedClassifier::never(), ScriptedClassifier::never());
    let image = create_test_image(300, 300, 90.0);

    let result = room.detect_and_add_clothing(&image, &Outfit::new()).unwrap();
    assert_eq!(*result.at_2d::<Vec3b>(150, 150).unwrap(), VecN([90, 90, 90]));
}

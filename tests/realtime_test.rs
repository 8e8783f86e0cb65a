//! Integration tests for the real-time dressing path with an explicit session

mod test_helpers;

use opencv::{
    core::{Rect, Size, Vec3b, VecN},
    prelude::*,
};
use test_helpers::{
    blue_top, create_test_image, fake_room, red_glasses, torso_image, RecordingClassifier, ScriptedClassifier, TORSO_FACE,
};
use virtual_dressing_room::garment::Outfit;

#[test]
fn test_session_calibrates_waist_from_first_frame() {
    let mut room = fake_room(
        ScriptedClassifier::never(),
        ScriptedClassifier::always(vec![TORSO_FACE]),
        ScriptedClassifier::never(),
    );
    let mut session = room.new_session();
    let outfit = Outfit::from_parts(None, None, Some(blue_top()));

    let mut frame = torso_image(80, 320);
    let face = room.get_face(&frame, &mut session);
    assert_eq!(face, TORSO_FACE);

    room.add_clothes_rt(&mut frame, &outfit, face, &mut session).unwrap();

    let ratio = session.waist().ratio().expect("waist calibrated");
    assert!((ratio - 2.4).abs() < 0.05, "ratio {ratio}");
    assert_eq!(*frame.at_2d::<Vec3b>(190, 200).unwrap(), VecN([255, 0, 0]));
}

#[test]
fn test_recalculation_forgets_ratio() {
    let mut room = fake_room(
        ScriptedClassifier::never(),
        ScriptedClassifier::always(vec![TORSO_FACE]),
        ScriptedClassifier::never(),
    );
    let mut session = room.new_session();
    let outfit = Outfit::from_parts(None, None, Some(blue_top()));

    let mut frame = torso_image(80, 320);
    let face = room.get_face(&frame, &mut session);
    room.add_clothes_rt(&mut frame, &outfit, face, &mut session).unwrap();
    assert!(session.waist().ratio().is_some());

    room.recalculate_waist_width(&mut session);
    assert!(session.waist().ratio().is_none());

    // a frame without a visible torso leaves the top off
    let mut blank = create_test_image(600, 400, 255.0);
    room.add_clothes_rt(&mut blank, &outfit, face, &mut session).unwrap();
    assert!(session.waist().ratio().is_none());
    assert_eq!(*blank.at_2d::<Vec3b>(190, 200).unwrap(), VecN([255, 255, 255]));
}

#[test]
fn test_face_held_through_short_gaps_then_lost() {
    let mut detections = vec![vec![TORSO_FACE]];
    detections.extend(std::iter::repeat(Vec::new()).take(6));
    let mut room = fake_room(
        ScriptedClassifier::never(),
        Box::new(ScriptedClassifier::new(detections)),
        ScriptedClassifier::never(),
    );
    let mut session = room.new_session();
    let frame = torso_image(80, 320);

    assert_eq!(room.get_face(&frame, &mut session), TORSO_FACE);
    for _ in 0..5 {
        assert_eq!(room.get_face(&frame, &mut session), TORSO_FACE);
    }
    assert_eq!(room.get_face(&frame, &mut session), Rect::default());
}

#[test]
fn test_losing_subject_resets_waist() {
    let mut detections = vec![vec![TORSO_FACE]];
    detections.extend(std::iter::repeat(Vec::new()).take(6));
    let mut room = fake_room(
        ScriptedClassifier::never(),
        Box::new(ScriptedClassifier::new(detections)),
        ScriptedClassifier::never(),
    );
    let mut session = room.new_session();
    let outfit = Outfit::from_parts(None, None, Some(blue_top()));

    let mut frame = torso_image(80, 320);
    let face = room.get_face(&frame, &mut session);
    room.add_clothes_rt(&mut frame, &outfit, face, &mut session).unwrap();
    assert!(session.waist().ratio().is_some());

    for _ in 0..6 {
        room.get_face(&frame, &mut session);
    }
    assert!(session.waist().ratio().is_none());
}

#[test]
fn test_small_jitter_keeps_previous_face() {
    let moved = Rect::new(TORSO_FACE.x + 3, TORSO_FACE.y - 2, TORSO_FACE.width + 4, TORSO_FACE.height);
    let mut room = fake_room(
        ScriptedClassifier::never(),
        Box::new(ScriptedClassifier::new(vec![vec![TORSO_FACE], vec![moved]])),
        ScriptedClassifier::never(),
    );
    let mut session = room.new_session();
    let frame = torso_image(80, 320);

    room.get_face(&frame, &mut session);
    assert_eq!(room.get_face(&frame, &mut session), TORSO_FACE);
}

#[test]
fn test_glasses_drawn_without_tilt_correction() {
    let face = Rect::new(100, 100, 200, 200);
    let mut room = fake_room(
        ScriptedClassifier::never(),
        ScriptedClassifier::always(vec![face]),
        ScriptedClassifier::never(),
    );
    let mut session = room.new_session();
    let outfit = Outfit::from_parts(Some(red_glasses()), None, None);

    let mut frame = create_test_image(400, 400, 128.0);
    let detected = room.get_face(&frame, &mut session);
    room.add_clothes_rt(&mut frame, &outfit, detected, &mut session).unwrap();

    assert_eq!(*frame.at_2d::<Vec3b>(180, 200).unwrap(), VecN([0, 0, 255]));
    assert_eq!(*frame.at_2d::<Vec3b>(180, 100).unwrap(), VecN([128, 128, 128]));
}

#[test]
fn test_get_face_searches_top_half_only() {
    let (secondary, seen) = RecordingClassifier::new(vec![TORSO_FACE]);
    let (primary, primary_seen) = RecordingClassifier::new(Vec::new());
    let mut room = fake_room(primary, secondary, ScriptedClassifier::never());
    let mut session = room.new_session();

    assert_eq!(room.get_face(&torso_image(80, 320), &mut session), TORSO_FACE);
    // odd heights round the half up
    room.get_face(&create_test_image(401, 300, 128.0), &mut session);

    assert_eq!(*seen.lock().unwrap(), vec![Size::new(400, 300), Size::new(300, 201)]);
    assert!(primary_seen.lock().unwrap().is_empty());
}

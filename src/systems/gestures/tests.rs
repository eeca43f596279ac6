use super::*;
use crate::data::landmarks::{poses, HandLandmarks, LandmarkFrame};

const EPSILON: f32 = 1e-3;

fn classify_one(hand: HandLandmarks) -> Vec<GestureEvent> {
    GestureClassifier::default().classify(&LandmarkFrame::single(hand))
}

fn sole(events: Vec<GestureEvent>) -> GestureEvent {
    assert_eq!(events.len(), 1, "expected a single event, got {events:?}");
    events.into_iter().next().unwrap()
}

#[test]
fn static_poses_classify_alone() {
    let cases = [
        (poses::open_palm_hand(), GestureKind::OpenPalm, 0.9),
        (poses::fist_hand(), GestureKind::Fist, 0.6),
        (poses::peace_hand(), GestureKind::PeaceSign, 0.8),
        (poses::ok_hand(), GestureKind::OkSign, 0.8),
        (poses::thumbs_up_hand(), GestureKind::ThumbsUp, 0.9),
        (poses::thumbs_down_hand(), GestureKind::ThumbsDown, 0.9),
        (poses::point_right_hand(), GestureKind::PointRight, 0.8),
        (poses::point_up_hand(), GestureKind::PointUp, 0.8),
    ];
    for (hand, kind, confidence) in cases {
        let event = sole(classify_one(hand));
        assert_eq!(event.kind, kind);
        assert!(
            (event.confidence - confidence).abs() < EPSILON,
            "{kind} confidence {} != {confidence}",
            event.confidence
        );
        assert_eq!(event.hand_index, Some(0));
    }
}

#[test]
fn empty_frame_reports_the_idle_sentinel() {
    let event = sole(GestureClassifier::default().classify(&LandmarkFrame::new(Vec::new())));
    assert_eq!(event.kind, GestureKind::None);
    assert_eq!(event.confidence, 1.0);
    assert_eq!(event.hand_index, None);
}

#[test]
fn unrecognized_pose_reports_the_idle_sentinel() {
    let event = sole(classify_one(poses::neutral_hand(Vec2::new(0.50, 0.70))));
    assert_eq!(event.kind, GestureKind::None);
}

#[test]
fn malformed_hands_are_skipped_but_keep_frame_indices() {
    let stub = HandLandmarks::new(vec![Vec3::ZERO; 5], None);
    let frame = LandmarkFrame::new(vec![stub.clone(), poses::open_palm_hand()]);
    let event = sole(GestureClassifier::default().classify(&frame));
    assert_eq!(event.kind, GestureKind::OpenPalm);
    assert_eq!(event.hand_index, Some(1));

    let only_stub = sole(GestureClassifier::default().classify(&LandmarkFrame::single(stub)));
    assert_eq!(only_stub.kind, GestureKind::None);
}

#[test]
fn pinch_confidence_rises_as_the_gap_closes() {
    let mut last = 0.0;
    for (gap, expected) in [(0.04, 0.2), (0.03, 0.4), (0.02, 0.6), (0.01, 0.8)] {
        let event = sole(classify_one(poses::pinch_hand(gap)));
        assert_eq!(event.kind, GestureKind::Pinch);
        assert!(
            (event.confidence - expected).abs() < EPSILON,
            "gap {gap} gave confidence {}",
            event.confidence
        );
        assert!((event.distance.unwrap() - gap).abs() < EPSILON);
        assert!(event.confidence > last);
        last = event.confidence;
    }

    // At the touch threshold and beyond the pinch disappears entirely.
    for gap in [0.05, 0.08] {
        let event = sole(classify_one(poses::pinch_hand(gap)));
        assert_eq!(event.kind, GestureKind::None, "gap {gap} should not pinch");
    }
}

#[test]
fn ok_sign_outranks_the_pinch_on_the_same_contact() {
    let event = sole(classify_one(poses::ok_hand()));
    assert_eq!(event.kind, GestureKind::OkSign);
}

#[test]
fn point_direction_follows_the_index() {
    use std::f32::consts::PI;
    let left = poses::rotated_about_wrist(&poses::point_right_hand(), PI);
    assert_eq!(sole(classify_one(left)).kind, GestureKind::PointLeft);

    let down = poses::rotated_about_wrist(&poses::point_up_hand(), PI);
    assert_eq!(sole(classify_one(down)).kind, GestureKind::PointDown);
}

#[test]
fn swipes_need_history_and_follow_the_dominant_axis() {
    let first = sole(classify_one(poses::neutral_hand(Vec2::new(0.45, 0.70))));
    assert_eq!(first.kind, GestureKind::None, "no history, no swipe");

    let cases = [
        (Vec2::new(0.08, 0.0), GestureKind::SwipeRight),
        (Vec2::new(-0.08, 0.0), GestureKind::SwipeLeft),
        (Vec2::new(0.0, -0.08), GestureKind::SwipeUp),
        (Vec2::new(0.0, 0.08), GestureKind::SwipeDown),
    ];
    for (delta, kind) in cases {
        let mut classifier = GestureClassifier::default();
        let start = Vec2::new(0.45, 0.70);
        classifier.classify(&LandmarkFrame::single(poses::neutral_hand(start)));
        let event = sole(classifier.classify(&LandmarkFrame::single(poses::neutral_hand(start + delta))));
        assert_eq!(event.kind, kind);
        assert!((event.confidence - 0.08 / 0.15).abs() < EPSILON);
        assert!(event.velocity.unwrap().distance(delta) < EPSILON);
    }
}

#[test]
fn rotation_direction_follows_the_twist() {
    for (angle, kind) in [(0.3, GestureKind::RotateCw), (-0.3, GestureKind::RotateCcw)] {
        let mut classifier = GestureClassifier::default();
        let rest = poses::neutral_hand(Vec2::new(0.50, 0.70));
        classifier.classify(&LandmarkFrame::single(rest.clone()));
        let twisted = poses::rotated_about_wrist(&rest, angle);
        let event = sole(classifier.classify(&LandmarkFrame::single(twisted)));
        assert_eq!(event.kind, kind);
        assert!((event.confidence - 0.5).abs() < EPSILON, "|0.3| / 0.6 capped");
        assert!((event.angle.unwrap() - angle).abs() < EPSILON);
    }
}

#[test]
fn wave_emerges_from_sustained_oscillation() {
    let mut classifier = GestureClassifier::default();
    let mut last = Vec::new();
    for step in 0..=8 {
        let x = 0.50 + 0.048 * (step as f32 * std::f32::consts::TAU / 8.0).sin();
        last = classifier.classify(&LandmarkFrame::single(poses::neutral_hand(Vec2::new(x, 0.70))));
    }
    let event = sole(last);
    assert_eq!(event.kind, GestureKind::Wave);
    assert!((event.confidence - 0.8).abs() < EPSILON);
}

#[test]
fn two_hands_report_spread_and_clap() {
    let pair = |a: f32, b: f32| {
        LandmarkFrame::new(vec![
            poses::neutral_hand(Vec2::new(a, 0.70)),
            poses::neutral_hand(Vec2::new(b, 0.70)),
        ])
    };

    let spread = sole(GestureClassifier::default().classify(&pair(0.20, 0.85)));
    assert_eq!(spread.kind, GestureKind::TwoHandSpread);
    assert_eq!(spread.hand_index, None);
    assert!((spread.distance.unwrap() - 0.65).abs() < EPSILON);
    assert!((spread.confidence - 0.65 / 1.2).abs() < EPSILON);

    let clap = sole(GestureClassifier::default().classify(&pair(0.46, 0.54)));
    assert_eq!(clap.kind, GestureKind::TwoHandClap);
    assert!((clap.confidence - (1.0 - 0.08 / 0.12 + 0.6)).abs() < EPSILON);

    let apart = sole(GestureClassifier::default().classify(&pair(0.40, 0.70)));
    assert_eq!(apart.kind, GestureKind::None, "mid-range separation is idle");
}

#[test]
fn reset_forgets_motion_state() {
    let mut classifier = GestureClassifier::default();
    classifier.classify(&LandmarkFrame::single(poses::neutral_hand(Vec2::new(0.45, 0.70))));
    classifier.reset();
    let event = sole(classifier.classify(&LandmarkFrame::single(poses::neutral_hand(Vec2::new(0.53, 0.70)))));
    assert_eq!(event.kind, GestureKind::None);
}

#[test]
fn a_vanished_hand_loses_its_trail() {
    let mut classifier = GestureClassifier::default();
    classifier.classify(&LandmarkFrame::single(poses::neutral_hand(Vec2::new(0.45, 0.70))));
    classifier.classify(&LandmarkFrame::new(Vec::new()));
    let event = sole(classifier.classify(&LandmarkFrame::single(poses::neutral_hand(Vec2::new(0.53, 0.70)))));
    assert_eq!(event.kind, GestureKind::None, "history must not bridge the gap");
}

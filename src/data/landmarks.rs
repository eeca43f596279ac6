use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Landmarks per well-formed hand, in the provider's skeleton order.
pub const LANDMARK_COUNT: usize = 21;

// ----- Skeleton indices -----
pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// The palm center proxy used by curl predicates.
pub const PALM_CENTER: usize = MIDDLE_MCP;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
}

/// One observed hand. Coordinates are normalized image space: x,y in
/// roughly [0, 1] with y increasing downward, z optional (0 when absent).
#[derive(Debug, Clone, Default)]
pub struct HandLandmarks {
    pub points: Vec<Vec3>,
    pub handedness: Option<Handedness>,
}

impl HandLandmarks {
    pub fn new(points: Vec<Vec3>, handedness: Option<Handedness>) -> Self {
        Self { points, handedness }
    }

    /// A hand missing landmarks is ignored by the classifier rather than
    /// indexed out of range.
    pub fn is_well_formed(&self) -> bool {
        self.points.len() >= LANDMARK_COUNT
    }
}

/// One provider observation. Zero hands is a valid, frequent frame, and
/// frames may arrive at a different cadence than render ticks.
#[derive(Debug, Clone, Default)]
pub struct LandmarkFrame {
    pub hands: Vec<HandLandmarks>,
}

impl LandmarkFrame {
    pub fn new(hands: Vec<HandLandmarks>) -> Self {
        Self { hands }
    }

    pub fn single(hand: HandLandmarks) -> Self {
        Self { hands: vec![hand] }
    }
}

/// Canonical synthetic hands. The demo reel feeds these through the real
/// pipeline and the classifier tests assert their classifications, so the
/// geometry here deliberately sits well inside each predicate's thresholds.
pub mod poses {
    use super::*;

    fn p(x: f32, y: f32) -> Vec3 {
        Vec3::new(x, y, 0.0)
    }

    fn chain(points: &mut [Vec3], start: usize, joints: [Vec3; 4]) {
        points[start] = joints[0];
        points[start + 1] = joints[1];
        points[start + 2] = joints[2];
        points[start + 3] = joints[3];
    }

    fn hand_from(points: Vec<Vec3>) -> HandLandmarks {
        HandLandmarks::new(points, Some(Handedness::Right))
    }

    /// All five fingers extended and fanned wide, thumb clear of the wrist.
    pub fn open_palm_hand() -> HandLandmarks {
        let mut pts = vec![Vec3::ZERO; LANDMARK_COUNT];
        pts[WRIST] = p(0.50, 0.75);
        chain(&mut pts, THUMB_CMC, [p(0.43, 0.72), p(0.38, 0.68), p(0.33, 0.64), p(0.28, 0.60)]);
        chain(&mut pts, INDEX_MCP, [p(0.40, 0.62), p(0.34, 0.52), p(0.30, 0.46), p(0.26, 0.40)]);
        chain(&mut pts, MIDDLE_MCP, [p(0.47, 0.62), p(0.45, 0.51), p(0.43, 0.45), p(0.42, 0.40)]);
        chain(&mut pts, RING_MCP, [p(0.54, 0.62), p(0.56, 0.51), p(0.57, 0.45), p(0.58, 0.40)]);
        chain(&mut pts, PINKY_MCP, [p(0.61, 0.62), p(0.66, 0.52), p(0.70, 0.46), p(0.74, 0.40)]);
        hand_from(pts)
    }

    /// Every fingertip tucked against the palm, thumb wrapped over.
    pub fn fist_hand() -> HandLandmarks {
        let mut pts = vec![Vec3::ZERO; LANDMARK_COUNT];
        pts[WRIST] = p(0.50, 0.75);
        chain(&mut pts, THUMB_CMC, [p(0.45, 0.72), p(0.43, 0.69), p(0.44, 0.67), p(0.46, 0.65)]);
        chain(&mut pts, INDEX_MCP, [p(0.44, 0.62), p(0.45, 0.57), p(0.46, 0.58), p(0.47, 0.60)]);
        chain(&mut pts, MIDDLE_MCP, [p(0.50, 0.62), p(0.50, 0.56), p(0.50, 0.57), p(0.50, 0.59)]);
        chain(&mut pts, RING_MCP, [p(0.56, 0.62), p(0.55, 0.57), p(0.54, 0.58), p(0.53, 0.60)]);
        chain(&mut pts, PINKY_MCP, [p(0.62, 0.63), p(0.59, 0.58), p(0.57, 0.59), p(0.56, 0.61)]);
        hand_from(pts)
    }

    /// Index and middle raised, ring and pinky folded.
    pub fn peace_hand() -> HandLandmarks {
        let mut pts = vec![Vec3::ZERO; LANDMARK_COUNT];
        pts[WRIST] = p(0.50, 0.75);
        chain(&mut pts, THUMB_CMC, [p(0.45, 0.72), p(0.43, 0.70), p(0.42, 0.68), p(0.42, 0.66)]);
        chain(&mut pts, INDEX_MCP, [p(0.45, 0.62), p(0.44, 0.52), p(0.44, 0.47), p(0.44, 0.42)]);
        chain(&mut pts, MIDDLE_MCP, [p(0.51, 0.62), p(0.52, 0.51), p(0.52, 0.46), p(0.52, 0.41)]);
        chain(&mut pts, RING_MCP, [p(0.57, 0.63), p(0.58, 0.62), p(0.58, 0.64), p(0.57, 0.66)]);
        chain(&mut pts, PINKY_MCP, [p(0.62, 0.64), p(0.63, 0.64), p(0.63, 0.66), p(0.62, 0.68)]);
        hand_from(pts)
    }

    /// Thumb and index pinched into a ring, remaining fingers raised.
    pub fn ok_hand() -> HandLandmarks {
        let mut pts = vec![Vec3::ZERO; LANDMARK_COUNT];
        pts[WRIST] = p(0.50, 0.75);
        chain(&mut pts, THUMB_CMC, [p(0.45, 0.70), p(0.42, 0.65), p(0.41, 0.60), p(0.40, 0.55)]);
        chain(&mut pts, INDEX_MCP, [p(0.44, 0.62), p(0.42, 0.58), p(0.42, 0.56), p(0.41, 0.54)]);
        chain(&mut pts, MIDDLE_MCP, [p(0.50, 0.62), p(0.51, 0.53), p(0.51, 0.46), p(0.52, 0.40)]);
        chain(&mut pts, RING_MCP, [p(0.56, 0.62), p(0.57, 0.54), p(0.58, 0.47), p(0.58, 0.41)]);
        chain(&mut pts, PINKY_MCP, [p(0.62, 0.63), p(0.63, 0.56), p(0.64, 0.50), p(0.65, 0.44)]);
        hand_from(pts)
    }

    /// Thumb and index tips separated by `gap`, other fingers folded.
    pub fn pinch_hand(gap: f32) -> HandLandmarks {
        let mut pts = vec![Vec3::ZERO; LANDMARK_COUNT];
        pts[WRIST] = p(0.50, 0.75);
        chain(&mut pts, THUMB_CMC, [p(0.46, 0.71), p(0.44, 0.67), p(0.44, 0.62), p(0.45, 0.58)]);
        chain(&mut pts, INDEX_MCP, [p(0.46, 0.63), p(0.47, 0.60), p(0.46 + gap, 0.59), p(0.45 + gap, 0.58)]);
        chain(&mut pts, MIDDLE_MCP, [p(0.52, 0.62), p(0.52, 0.64), p(0.52, 0.65), p(0.52, 0.66)]);
        chain(&mut pts, RING_MCP, [p(0.58, 0.63), p(0.58, 0.65), p(0.58, 0.66), p(0.58, 0.67)]);
        chain(&mut pts, PINKY_MCP, [p(0.63, 0.64), p(0.63, 0.65), p(0.63, 0.66), p(0.63, 0.67)]);
        hand_from(pts)
    }

    /// Index stretched toward +x, everything else folded back.
    pub fn point_right_hand() -> HandLandmarks {
        let mut pts = vec![Vec3::ZERO; LANDMARK_COUNT];
        pts[WRIST] = p(0.50, 0.75);
        chain(&mut pts, THUMB_CMC, [p(0.50, 0.68), p(0.51, 0.64), p(0.51, 0.62), p(0.52, 0.60)]);
        chain(&mut pts, INDEX_MCP, [p(0.56, 0.70), p(0.62, 0.69), p(0.66, 0.69), p(0.70, 0.68)]);
        chain(&mut pts, MIDDLE_MCP, [p(0.54, 0.64), p(0.55, 0.67), p(0.55, 0.68), p(0.54, 0.68)]);
        chain(&mut pts, RING_MCP, [p(0.52, 0.65), p(0.53, 0.68), p(0.53, 0.69), p(0.52, 0.69)]);
        chain(&mut pts, PINKY_MCP, [p(0.50, 0.66), p(0.51, 0.68), p(0.51, 0.69), p(0.50, 0.69)]);
        hand_from(pts)
    }

    /// Index stretched straight up.
    pub fn point_up_hand() -> HandLandmarks {
        let mut pts = vec![Vec3::ZERO; LANDMARK_COUNT];
        pts[WRIST] = p(0.50, 0.75);
        chain(&mut pts, THUMB_CMC, [p(0.46, 0.71), p(0.44, 0.68), p(0.44, 0.66), p(0.45, 0.64)]);
        chain(&mut pts, INDEX_MCP, [p(0.52, 0.62), p(0.52, 0.55), p(0.52, 0.51), p(0.52, 0.47)]);
        chain(&mut pts, MIDDLE_MCP, [p(0.56, 0.63), p(0.57, 0.66), p(0.57, 0.67), p(0.56, 0.67)]);
        chain(&mut pts, RING_MCP, [p(0.58, 0.64), p(0.59, 0.67), p(0.59, 0.68), p(0.58, 0.68)]);
        chain(&mut pts, PINKY_MCP, [p(0.60, 0.65), p(0.61, 0.67), p(0.61, 0.68), p(0.60, 0.68)]);
        hand_from(pts)
    }

    /// Fingers folded, thumb raised well above its knuckle.
    pub fn thumbs_up_hand() -> HandLandmarks {
        thumbs_hand(p(0.44, 0.52))
    }

    /// Fingers folded, thumb dropped below its knuckle.
    pub fn thumbs_down_hand() -> HandLandmarks {
        thumbs_hand(p(0.44, 0.84))
    }

    fn thumbs_hand(thumb_tip: Vec3) -> HandLandmarks {
        let mut pts = vec![Vec3::ZERO; LANDMARK_COUNT];
        pts[WRIST] = p(0.50, 0.75);
        let mid = pts[WRIST].lerp(thumb_tip, 0.5);
        chain(&mut pts, THUMB_CMC, [p(0.47, 0.71), p(0.46, 0.68), mid, thumb_tip]);
        chain(&mut pts, INDEX_MCP, [p(0.46, 0.62), p(0.455, 0.585), p(0.46, 0.595), p(0.47, 0.61)]);
        chain(&mut pts, MIDDLE_MCP, [p(0.50, 0.62), p(0.50, 0.575), p(0.50, 0.585), p(0.50, 0.60)]);
        chain(&mut pts, RING_MCP, [p(0.54, 0.62), p(0.535, 0.58), p(0.53, 0.59), p(0.53, 0.61)]);
        chain(&mut pts, PINKY_MCP, [p(0.58, 0.63), p(0.565, 0.59), p(0.555, 0.60), p(0.55, 0.62)]);
        hand_from(pts)
    }

    /// A half-curled rest pose that clears no static predicate; motion
    /// gestures are tested and demonstrated by translating or rotating it
    /// between frames.
    pub fn neutral_hand(wrist: Vec2) -> HandLandmarks {
        let w = p(wrist.x, wrist.y);
        let mut pts = vec![Vec3::ZERO; LANDMARK_COUNT];
        pts[WRIST] = w;
        let o = |dx: f32, dy: f32| p(wrist.x + dx, wrist.y + dy);
        chain(&mut pts, THUMB_CMC, [o(-0.05, -0.03), o(-0.08, -0.06), o(-0.10, -0.09), o(-0.12, -0.12)]);
        chain(&mut pts, INDEX_MCP, [o(-0.05, -0.13), o(-0.06, -0.17), o(-0.06, -0.15), o(-0.06, -0.13)]);
        chain(&mut pts, MIDDLE_MCP, [o(0.00, -0.13), o(0.00, -0.18), o(0.00, -0.16), o(0.00, -0.135)]);
        chain(&mut pts, RING_MCP, [o(0.05, -0.13), o(0.06, -0.17), o(0.06, -0.15), o(0.06, -0.13)]);
        chain(&mut pts, PINKY_MCP, [o(0.09, -0.12), o(0.11, -0.16), o(0.11, -0.14), o(0.11, -0.12)]);
        hand_from(pts)
    }

    /// Translates every landmark, preserving the pose.
    pub fn shifted(hand: &HandLandmarks, delta: Vec2) -> HandLandmarks {
        let points = hand
            .points
            .iter()
            .map(|pt| Vec3::new(pt.x + delta.x, pt.y + delta.y, pt.z))
            .collect();
        HandLandmarks::new(points, hand.handedness)
    }

    /// Rotates every landmark about the wrist in the image plane.
    pub fn rotated_about_wrist(hand: &HandLandmarks, angle: f32) -> HandLandmarks {
        let wrist = hand.points[WRIST];
        let (sin, cos) = angle.sin_cos();
        let points = hand
            .points
            .iter()
            .map(|pt| {
                let dx = pt.x - wrist.x;
                let dy = pt.y - wrist.y;
                Vec3::new(
                    wrist.x + dx * cos - dy * sin,
                    wrist.y + dx * sin + dy * cos,
                    pt.z,
                )
            })
            .collect();
        HandLandmarks::new(points, hand.handedness)
    }
}

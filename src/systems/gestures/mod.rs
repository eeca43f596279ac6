use std::collections::{HashMap, VecDeque};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::data::landmarks::{
    HandLandmarks, LandmarkFrame, INDEX_MCP, INDEX_PIP, INDEX_TIP, MIDDLE_MCP, MIDDLE_PIP,
    MIDDLE_TIP, PALM_CENTER, PINKY_MCP, PINKY_PIP, PINKY_TIP, RING_MCP, RING_PIP, RING_TIP,
    THUMB_CMC, THUMB_MCP, THUMB_TIP, WRIST,
};

#[cfg(test)]
mod tests;

// ------ Static Pose Thresholds ------
const FINGER_EXTENDED_DISTANCE: f32 = 0.06;
const FINGER_SPREAD_MINIMUM: f32 = 0.15;
const THUMB_EXTENDED_RATIO: f32 = 1.4;
const OPEN_REACH_MINIMUM: f32 = 0.12;
const FIST_TIP_PALM_MAXIMUM: f32 = 0.08;
const FIST_THUMB_PALM_MAXIMUM: f32 = 0.09;
const FIST_CURL_MAXIMUM: f32 = 0.05;
const RAISED_MARGIN: f32 = 0.02;
const OK_TOUCH_DISTANCE: f32 = 0.03;
const PINCH_TOUCH_DISTANCE: f32 = 0.05;
const POINT_EXTENDED_MINIMUM: f32 = 0.055;
const POINT_FOLDED_MAXIMUM: f32 = 0.06;
const POINT_THUMB_CLEARANCE: f32 = 0.05;
const THUMB_SIGN_CURL_MAXIMUM: f32 = 0.08;
const THUMB_SIGN_RISE_MINIMUM: f32 = 0.08;

// ------ Motion Thresholds ------
const SWIPE_TRIGGER_DISTANCE: f32 = 0.05;
const SWIPE_FULL_CONFIDENCE_DISTANCE: f32 = 0.15;
const ROTATE_TRIGGER_RADIANS: f32 = 0.15;
const ROTATE_FULL_CONFIDENCE_RADIANS: f32 = 0.6;
const WAVE_WINDOW: usize = 12;
const WAVE_DELTA_MINIMUM: f32 = 0.01;
const WAVE_ALTERNATIONS_MINIMUM: usize = 2;
const WAVE_SPAN_MINIMUM: f32 = 0.08;

// ------ Two-Hand Thresholds ------
const SPREAD_TRIGGER_DISTANCE: f32 = 0.6;
const SPREAD_FULL_CONFIDENCE_DISTANCE: f32 = 1.2;
const CLAP_TRIGGER_DISTANCE: f32 = 0.12;

/// Everything the classifier can report. Landmarks arrive in image space,
/// so y grows downward; `PointUp`, swipe directions and rotation handedness
/// are all named for what the viewer sees on screen.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, enum_map::Enum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    #[default]
    None,
    OpenPalm,
    Fist,
    PeaceSign,
    OkSign,
    Pinch,
    PointUp,
    PointDown,
    PointLeft,
    PointRight,
    ThumbsUp,
    ThumbsDown,
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    RotateCw,
    RotateCcw,
    Wave,
    TwoHandSpread,
    TwoHandClap,
}

impl GestureKind {
    pub fn name(&self) -> &'static str {
        match self {
            GestureKind::None => "none",
            GestureKind::OpenPalm => "open_palm",
            GestureKind::Fist => "fist",
            GestureKind::PeaceSign => "peace_sign",
            GestureKind::OkSign => "ok_sign",
            GestureKind::Pinch => "pinch",
            GestureKind::PointUp => "point_up",
            GestureKind::PointDown => "point_down",
            GestureKind::PointLeft => "point_left",
            GestureKind::PointRight => "point_right",
            GestureKind::ThumbsUp => "thumbs_up",
            GestureKind::ThumbsDown => "thumbs_down",
            GestureKind::SwipeLeft => "swipe_left",
            GestureKind::SwipeRight => "swipe_right",
            GestureKind::SwipeUp => "swipe_up",
            GestureKind::SwipeDown => "swipe_down",
            GestureKind::RotateCw => "rotate_cw",
            GestureKind::RotateCcw => "rotate_ccw",
            GestureKind::Wave => "wave",
            GestureKind::TwoHandSpread => "two_hand_spread",
            GestureKind::TwoHandClap => "two_hand_clap",
        }
    }
}

impl std::fmt::Display for GestureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One classified gesture. Motion and pinch gestures attach their raw
/// measurement so the mapper can derive command parameters from it.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub confidence: f32,
    /// Position of the hand in the incoming frame; `None` for two-hand
    /// gestures and for the idle sentinel.
    pub hand_index: Option<usize>,
    pub distance: Option<f32>,
    pub angle: Option<f32>,
    pub velocity: Option<Vec2>,
}

impl GestureEvent {
    /// The sentinel reported when a frame contains no recognizable gesture.
    pub fn idle() -> Self {
        Self {
            kind: GestureKind::None,
            confidence: 1.0,
            hand_index: None,
            distance: None,
            angle: None,
            velocity: None,
        }
    }

    fn for_hand(kind: GestureKind, confidence: f32, hand: usize) -> Self {
        Self {
            kind,
            confidence,
            hand_index: Some(hand),
            distance: None,
            angle: None,
            velocity: None,
        }
    }
}

/// A tracked landmark frame handed to the classifier, one per camera tick.
#[derive(Event, Debug, Clone)]
pub struct LandmarkFrameEvent(pub LandmarkFrame);

#[derive(Event, Debug, Clone)]
pub struct GestureDetected(pub GestureEvent);

/// Stateful frame-to-frame classifier. Hands are matched between frames by
/// their position in the frame's hand list; history for positions absent
/// from the current frame is discarded.
#[derive(Resource, Default)]
pub struct GestureClassifier {
    previous_hands: HashMap<usize, Vec<Vec3>>,
    wrist_trails: HashMap<usize, VecDeque<f32>>,
}

impl GestureClassifier {
    /// Classifies one frame. Every well-formed hand contributes at most one
    /// event (its highest-confidence candidate); two-hand gestures are
    /// appended after the per-hand events. A frame with nothing to report
    /// yields exactly the idle sentinel.
    pub fn classify(&mut self, frame: &LandmarkFrame) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        let mut seen: SmallVec<[usize; 4]> = SmallVec::new();

        for (index, hand) in frame.hands.iter().enumerate() {
            if !hand.is_well_formed() {
                continue;
            }
            seen.push(index);
            let points = hand.points.as_slice();
            let mut candidates: SmallVec<[GestureEvent; 8]> = SmallVec::new();

            if let Some(confidence) = detect_open_palm(points) {
                candidates.push(GestureEvent::for_hand(GestureKind::OpenPalm, confidence, index));
            }
            if let Some(confidence) = detect_fist(points) {
                candidates.push(GestureEvent::for_hand(GestureKind::Fist, confidence, index));
            }
            if let Some(confidence) = detect_peace(points) {
                candidates.push(GestureEvent::for_hand(GestureKind::PeaceSign, confidence, index));
            }
            if let Some(confidence) = detect_ok(points) {
                candidates.push(GestureEvent::for_hand(GestureKind::OkSign, confidence, index));
            }
            if let Some((confidence, gap)) = detect_pinch(points) {
                let mut event = GestureEvent::for_hand(GestureKind::Pinch, confidence, index);
                event.distance = Some(gap);
                candidates.push(event);
            }
            if let Some((kind, confidence)) = detect_point(points) {
                candidates.push(GestureEvent::for_hand(kind, confidence, index));
            }
            if let Some((kind, confidence)) = detect_thumb_sign(points) {
                candidates.push(GestureEvent::for_hand(kind, confidence, index));
            }

            if let Some(previous) = self.previous_hands.get(&index) {
                if let Some((kind, confidence, displacement)) = detect_swipe(points, previous) {
                    let mut event = GestureEvent::for_hand(kind, confidence, index);
                    event.velocity = Some(displacement);
                    candidates.push(event);
                }
                if let Some((kind, confidence, delta)) = detect_rotation(points, previous) {
                    let mut event = GestureEvent::for_hand(kind, confidence, index);
                    event.angle = Some(delta);
                    candidates.push(event);
                }
            }

            let trail = self.wrist_trails.entry(index).or_default();
            trail.push_back(points[WRIST].x);
            if trail.len() > WAVE_WINDOW {
                trail.pop_front();
            }
            if let Some(confidence) = detect_wave(trail) {
                candidates.push(GestureEvent::for_hand(GestureKind::Wave, confidence, index));
            }

            self.previous_hands.insert(index, hand.points.clone());

            let best = candidates.into_iter().reduce(|best, candidate| {
                if candidate.confidence > best.confidence {
                    candidate
                } else {
                    best
                }
            });
            if let Some(event) = best {
                events.push(event);
            }
        }

        self.previous_hands.retain(|index, _| seen.contains(index));
        self.wrist_trails.retain(|index, _| seen.contains(index));

        if let Some(event) = detect_two_hand(frame) {
            events.push(event);
        }

        if events.is_empty() {
            events.push(GestureEvent::idle());
        }
        events
    }

    /// Drops all frame-to-frame state, as when tracking is lost or restarted.
    pub fn reset(&mut self) {
        self.previous_hands.clear();
        self.wrist_trails.clear();
    }
}

fn detect_open_palm(p: &[Vec3]) -> Option<f32> {
    let finger_chains = [
        (INDEX_PIP, INDEX_TIP),
        (MIDDLE_PIP, MIDDLE_TIP),
        (RING_PIP, RING_TIP),
        (PINKY_PIP, PINKY_TIP),
    ];
    let fingers_extended = finger_chains
        .iter()
        .all(|&(pip, tip)| p[tip].distance(p[pip]) > FINGER_EXTENDED_DISTANCE);
    if !fingers_extended {
        return None;
    }

    let tips = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
    let spread = tips
        .windows(2)
        .map(|pair| p[pair[1]].distance(p[pair[0]]))
        .sum::<f32>()
        / 3.0;
    if spread <= FINGER_SPREAD_MINIMUM {
        return None;
    }

    let wrist = p[WRIST];
    let thumb_extended =
        p[THUMB_TIP].distance(wrist) > p[THUMB_CMC].distance(wrist) * THUMB_EXTENDED_RATIO;
    if !thumb_extended {
        return None;
    }

    let knuckles = [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];
    let reach = tips
        .iter()
        .zip(knuckles)
        .map(|(&tip, mcp)| p[tip].distance(p[mcp]))
        .sum::<f32>()
        / 4.0;
    if reach <= OPEN_REACH_MINIMUM {
        return None;
    }

    Some((0.5 + spread * 2.0 + reach * 2.0).min(0.9))
}

fn detect_fist(p: &[Vec3]) -> Option<f32> {
    let palm = p[PALM_CENTER];
    let tips = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
    let curls = tips.map(|tip| p[tip].distance(palm));

    let fingers_in = curls.iter().all(|&curl| curl < FIST_TIP_PALM_MAXIMUM);
    let thumb_in = p[THUMB_TIP].distance(palm) < FIST_THUMB_PALM_MAXIMUM;
    let knuckles_folded = [
        (INDEX_PIP, INDEX_TIP),
        (MIDDLE_PIP, MIDDLE_TIP),
        (RING_PIP, RING_TIP),
        (PINKY_PIP, PINKY_TIP),
    ]
    .iter()
    .all(|&(pip, tip)| p[tip].distance(p[pip]) < FIST_CURL_MAXIMUM);

    if !(fingers_in && thumb_in && knuckles_folded) {
        return None;
    }
    let average_curl = curls.iter().sum::<f32>() / 4.0;
    Some((1.0 - average_curl * 10.0).max(0.6).min(0.95))
}

fn detect_peace(p: &[Vec3]) -> Option<f32> {
    let index_up = p[INDEX_TIP].y < p[INDEX_MCP].y - RAISED_MARGIN;
    let middle_up = p[MIDDLE_TIP].y < p[MIDDLE_MCP].y - RAISED_MARGIN;
    let ring_down = p[RING_TIP].y > p[RING_MCP].y;
    let pinky_down = p[PINKY_TIP].y > p[PINKY_MCP].y;
    (index_up && middle_up && ring_down && pinky_down).then_some(0.8)
}

fn detect_ok(p: &[Vec3]) -> Option<f32> {
    let ring_closed = p[THUMB_TIP].distance(p[INDEX_TIP]) < OK_TOUCH_DISTANCE;
    let others_up = [
        (MIDDLE_TIP, MIDDLE_MCP),
        (RING_TIP, RING_MCP),
        (PINKY_TIP, PINKY_MCP),
    ]
    .iter()
    .all(|&(tip, mcp)| p[tip].y < p[mcp].y - RAISED_MARGIN);
    (ring_closed && others_up).then_some(0.8)
}

fn detect_pinch(p: &[Vec3]) -> Option<(f32, f32)> {
    let gap = p[THUMB_TIP].distance(p[INDEX_TIP]);
    if gap >= PINCH_TOUCH_DISTANCE {
        return None;
    }
    // With the rest of the hand raised the same contact reads as an OK sign.
    let rest_extended = [
        (MIDDLE_PIP, MIDDLE_TIP),
        (RING_PIP, RING_TIP),
        (PINKY_PIP, PINKY_TIP),
    ]
    .iter()
    .all(|&(pip, tip)| p[tip].distance(p[pip]) > FINGER_EXTENDED_DISTANCE);
    if rest_extended {
        return None;
    }
    Some(((1.0 - gap / PINCH_TOUCH_DISTANCE).max(0.0), gap))
}

fn detect_point(p: &[Vec3]) -> Option<(GestureKind, f32)> {
    let index_extended = p[INDEX_TIP].distance(p[INDEX_PIP]) > POINT_EXTENDED_MINIMUM;
    let others_folded = [
        (MIDDLE_TIP, MIDDLE_MCP),
        (RING_TIP, RING_MCP),
        (PINKY_TIP, PINKY_MCP),
    ]
    .iter()
    .all(|&(tip, mcp)| p[tip].distance(p[mcp]) < POINT_FOLDED_MAXIMUM);
    let thumb_clear = p[THUMB_TIP].distance(p[INDEX_PIP]) >= POINT_THUMB_CLEARANCE;
    if !(index_extended && others_folded && thumb_clear) {
        return None;
    }

    let direction = p[INDEX_TIP] - p[WRIST];
    let kind = if direction.x.abs() > direction.y.abs() {
        if direction.x > 0.0 {
            GestureKind::PointRight
        } else {
            GestureKind::PointLeft
        }
    } else if direction.y > 0.0 {
        GestureKind::PointDown
    } else {
        GestureKind::PointUp
    };
    Some((kind, 0.8))
}

fn detect_thumb_sign(p: &[Vec3]) -> Option<(GestureKind, f32)> {
    let palm = p[PALM_CENTER];
    let fingers_in = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP]
        .iter()
        .all(|&tip| p[tip].distance(palm) < THUMB_SIGN_CURL_MAXIMUM);
    if !fingers_in {
        return None;
    }

    let rise = p[THUMB_TIP].y - p[THUMB_MCP].y;
    if rise.abs() <= THUMB_SIGN_RISE_MINIMUM {
        return None;
    }
    let kind = if rise < 0.0 {
        GestureKind::ThumbsUp
    } else {
        GestureKind::ThumbsDown
    };
    Some((kind, (0.6 + rise.abs() * 2.0).min(0.9)))
}

fn detect_swipe(p: &[Vec3], previous: &[Vec3]) -> Option<(GestureKind, f32, Vec2)> {
    let displacement = (p[WRIST] - previous[WRIST]).truncate();
    let travel = displacement.length();
    if travel <= SWIPE_TRIGGER_DISTANCE {
        return None;
    }

    let kind = if displacement.x.abs() > displacement.y.abs() {
        if displacement.x > 0.0 {
            GestureKind::SwipeRight
        } else {
            GestureKind::SwipeLeft
        }
    } else if displacement.y > 0.0 {
        GestureKind::SwipeDown
    } else {
        GestureKind::SwipeUp
    };
    Some((kind, (travel / SWIPE_FULL_CONFIDENCE_DISTANCE).min(1.0), displacement))
}

fn detect_rotation(p: &[Vec3], previous: &[Vec3]) -> Option<(GestureKind, f32, f32)> {
    let heading = |points: &[Vec3]| {
        let spine = points[MIDDLE_MCP] - points[WRIST];
        spine.y.atan2(spine.x)
    };
    let delta = wrap_angle(heading(p) - heading(previous));
    if delta.abs() <= ROTATE_TRIGGER_RADIANS {
        return None;
    }

    // Positive image-space rotation sweeps clockwise on screen.
    let kind = if delta > 0.0 {
        GestureKind::RotateCw
    } else {
        GestureKind::RotateCcw
    };
    Some((kind, (delta.abs() / ROTATE_FULL_CONFIDENCE_RADIANS).min(1.0), delta))
}

fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    (angle + PI).rem_euclid(TAU) - PI
}

fn detect_wave(trail: &VecDeque<f32>) -> Option<f32> {
    let samples: Vec<f32> = trail.iter().copied().collect();
    if samples.len() < 3 {
        return None;
    }

    let mut alternations = 0;
    let mut last_sign = 0.0_f32;
    for pair in samples.windows(2) {
        let delta = pair[1] - pair[0];
        if delta.abs() < WAVE_DELTA_MINIMUM {
            continue;
        }
        let sign = delta.signum();
        if last_sign != 0.0 && sign != last_sign {
            alternations += 1;
        }
        last_sign = sign;
    }

    let span = samples.iter().fold(f32::MIN, |a, &b| a.max(b))
        - samples.iter().fold(f32::MAX, |a, &b| a.min(b));
    (alternations >= WAVE_ALTERNATIONS_MINIMUM && span > WAVE_SPAN_MINIMUM)
        .then_some((0.5 + alternations as f32 * 0.15).min(0.9))
}

fn detect_two_hand(frame: &LandmarkFrame) -> Option<GestureEvent> {
    let wrists: SmallVec<[Vec2; 2]> = frame
        .hands
        .iter()
        .filter(|hand| hand.is_well_formed())
        .map(|hand| hand.points[WRIST].truncate())
        .collect();
    if wrists.len() != 2 {
        return None;
    }

    let separation = wrists[0].distance(wrists[1]);
    let (kind, confidence) = if separation > SPREAD_TRIGGER_DISTANCE {
        (
            GestureKind::TwoHandSpread,
            (separation / SPREAD_FULL_CONFIDENCE_DISTANCE).min(0.95),
        )
    } else if separation < CLAP_TRIGGER_DISTANCE {
        (
            GestureKind::TwoHandClap,
            (1.0 - separation / CLAP_TRIGGER_DISTANCE + 0.6).min(0.95),
        )
    } else {
        return None;
    };

    let mut event = GestureEvent::idle();
    event.kind = kind;
    event.confidence = confidence;
    event.distance = Some(separation);
    Some(event)
}

/// Drains tracked frames and publishes one `GestureDetected` per classified
/// event in frame order.
pub fn classify_frames(
    mut classifier: ResMut<GestureClassifier>,
    mut frames: EventReader<LandmarkFrameEvent>,
    mut detected: EventWriter<GestureDetected>,
) {
    for LandmarkFrameEvent(frame) in frames.read() {
        for event in classifier.classify(frame) {
            detected.write(GestureDetected(event));
        }
    }
}

pub struct GesturePlugin;

impl Plugin for GesturePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GestureClassifier>()
            .add_event::<LandmarkFrameEvent>()
            .add_event::<GestureDetected>()
            .add_systems(Update, classify_frames);
    }
}

use bevy::prelude::*;
use once_cell::sync::Lazy;

use crate::{
    data::landmarks::{poses, HandLandmarks, LandmarkFrame},
    startup::config::SemaphoreConfig,
    systems::{
        gestures::{classify_frames, GestureDetected, GestureEvent, LandmarkFrameEvent},
        particles::ParticleSimulation,
    },
};

// ----- Reel Pacing Constants -----

const FRAME_INTERVAL_SECONDS: f32 = 1.0 / 30.0;
const POSE_HOLD_FRAMES: usize = 6;
const REST_FRAMES: usize = 60;
const FINALE_REST_FRAMES: usize = 90;

// ----- Hud Constants -----

const HUD_POSITION: Vec3 = Vec3::new(0.0, -330.0, 10.0);
const HUD_FONT_SIZE: f32 = 16.0;
const HUD_COLOR: Color = Color::srgb(0.50, 0.65, 0.70);
const CAPTION_POSITION: Vec3 = Vec3::new(0.0, 310.0, 10.0);
const CAPTION_FONT_SIZE: f32 = 34.0;
const CAPTION_COLOR: Color = Color::srgb(1.0, 0.45, 0.55);

/// Scripted stand-in for a live landmark provider: a looping reel of
/// synthetic hands covering every showcase gesture, with empty rest frames
/// between segments so motion history never bleeds across them.
static POSE_REEL: Lazy<Vec<LandmarkFrame>> = Lazy::new(build_reel);

fn build_reel() -> Vec<LandmarkFrame> {
    let mut reel = Vec::new();

    // One static pose per command family.
    hold(&mut reel, &poses::open_palm_hand(), POSE_HOLD_FRAMES);
    rest(&mut reel, REST_FRAMES);
    hold(&mut reel, &poses::fist_hand(), POSE_HOLD_FRAMES);
    rest(&mut reel, REST_FRAMES);
    hold(&mut reel, &poses::peace_hand(), POSE_HOLD_FRAMES);
    rest(&mut reel, REST_FRAMES);
    hold(&mut reel, &poses::ok_hand(), POSE_HOLD_FRAMES);
    rest(&mut reel, REST_FRAMES);
    hold(&mut reel, &poses::thumbs_up_hand(), POSE_HOLD_FRAMES);
    rest(&mut reel, REST_FRAMES);
    hold(&mut reel, &poses::thumbs_down_hand(), POSE_HOLD_FRAMES);
    rest(&mut reel, REST_FRAMES / 2);

    // A tightening pinch shrinks the cloud, a two-hand spread restores it.
    for gap in [0.04, 0.03, 0.02, 0.01] {
        hold(&mut reel, &poses::pinch_hand(gap), 3);
    }
    rest(&mut reel, REST_FRAMES / 2);
    for separation in [0.65, 0.73, 0.81] {
        pair(&mut reel, separation);
    }
    rest(&mut reel, REST_FRAMES);

    // Motion gestures: a wave, then a slow clockwise twist.
    for step in 0..12 {
        let sway = 0.048 * (std::f32::consts::TAU * step as f32 / 8.0).sin();
        hold(&mut reel, &poses::neutral_hand(Vec2::new(0.5 + sway, 0.75)), 1);
    }
    rest(&mut reel, REST_FRAMES);
    let spinner = poses::neutral_hand(Vec2::new(0.5, 0.75));
    for step in 0..5 {
        let twisted = poses::rotated_about_wrist(&spinner, 0.25 * step as f32);
        hold(&mut reel, &twisted, 1);
    }
    rest(&mut reel, REST_FRAMES / 2);

    // Clap gathers everything back into a sphere.
    for separation in [0.10, 0.09, 0.08] {
        pair(&mut reel, separation);
    }
    rest(&mut reel, REST_FRAMES);

    // Three right swipes walk the object cycle up to the text message.
    for _ in 0..3 {
        hold(&mut reel, &poses::neutral_hand(Vec2::new(0.30, 0.75)), 1);
        hold(&mut reel, &poses::neutral_hand(Vec2::new(0.36, 0.75)), 1);
        rest(&mut reel, REST_FRAMES);
    }
    rest(&mut reel, FINALE_REST_FRAMES);

    reel
}

fn hold(reel: &mut Vec<LandmarkFrame>, hand: &HandLandmarks, frames: usize) {
    for _ in 0..frames {
        reel.push(LandmarkFrame::single(hand.clone()));
    }
}

fn rest(reel: &mut Vec<LandmarkFrame>, frames: usize) {
    for _ in 0..frames {
        reel.push(LandmarkFrame::default());
    }
}

fn pair(reel: &mut Vec<LandmarkFrame>, separation: f32) {
    let left = poses::neutral_hand(Vec2::new(0.5 - separation / 2.0, 0.75));
    let right = poses::neutral_hand(Vec2::new(0.5 + separation / 2.0, 0.75));
    reel.push(LandmarkFrame::new(vec![left, right]));
}

#[derive(Resource)]
pub struct PoseReel {
    timer: Timer,
    cursor: usize,
}

impl Default for PoseReel {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(FRAME_INTERVAL_SECONDS, TimerMode::Repeating),
            cursor: 0,
        }
    }
}

#[derive(Component)]
pub struct HudReadout;

#[derive(Component)]
pub struct MessageCaption;

pub struct DemoPlugin;
impl Plugin for DemoPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PoseReel>()
            .add_systems(Startup, spawn_hud)
            .add_systems(Update, (play_reel.before(classify_frames), update_hud));
    }
}

fn spawn_hud(mut commands: Commands, config: Res<SemaphoreConfig>) {
    commands.spawn((
        HudReadout,
        Text2d::new("warming up"),
        TextFont {
            font_size: HUD_FONT_SIZE,
            ..default()
        },
        TextColor(HUD_COLOR),
        Transform::from_translation(HUD_POSITION),
    ));

    commands.spawn((
        MessageCaption,
        Text2d::new(config.message.clone()),
        TextFont {
            font_size: CAPTION_FONT_SIZE,
            ..default()
        },
        TextColor(CAPTION_COLOR),
        Transform::from_translation(CAPTION_POSITION),
    ));
}

fn play_reel(
    time: Res<Time>,
    mut reel: ResMut<PoseReel>,
    mut frames: EventWriter<LandmarkFrameEvent>,
) {
    if reel.timer.tick(time.delta()).just_finished() {
        let frame = POSE_REEL[reel.cursor % POSE_REEL.len()].clone();
        reel.cursor += 1;
        frames.write(LandmarkFrameEvent(frame));
    }
}

fn update_hud(
    mut gestures: EventReader<GestureDetected>,
    mut latest: Local<Option<GestureEvent>>,
    simulation: Option<Res<ParticleSimulation>>,
    mut hud_query: Query<&mut Text2d, With<HudReadout>>,
) {
    for GestureDetected(event) in gestures.read() {
        *latest = Some(event.clone());
    }

    let Some(simulation) = simulation else {
        return;
    };
    let gesture_line = match latest.as_ref() {
        Some(event) => format!("{} ({:.2})", event.kind, event.confidence),
        None => String::from("waiting"),
    };
    for mut text in hud_query.iter_mut() {
        text.0 = format!(
            "gesture: {gesture_line}\nmode: {:?}  object: {}  scale: {:.2}  queue: {}",
            simulation.mode(),
            simulation.formation(),
            simulation.scale(),
            simulation.queue_len(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::gestures::{GestureClassifier, GestureKind};
    use std::collections::HashSet;

    #[test]
    fn the_reel_walks_through_every_showcase_gesture() {
        let mut classifier = GestureClassifier::default();
        let mut seen: HashSet<GestureKind> = HashSet::new();
        for frame in POSE_REEL.iter() {
            for event in classifier.classify(frame) {
                seen.insert(event.kind);
            }
        }

        for kind in [
            GestureKind::OpenPalm,
            GestureKind::Fist,
            GestureKind::PeaceSign,
            GestureKind::OkSign,
            GestureKind::ThumbsUp,
            GestureKind::ThumbsDown,
            GestureKind::Pinch,
            GestureKind::TwoHandSpread,
            GestureKind::Wave,
            GestureKind::RotateCw,
            GestureKind::TwoHandClap,
            GestureKind::SwipeRight,
        ] {
            assert!(seen.contains(&kind), "reel never produced {kind}");
        }
    }

    #[test]
    fn rest_frames_dominate_so_morphs_can_finish() {
        let resting = POSE_REEL
            .iter()
            .filter(|frame| frame.hands.is_empty())
            .count();
        assert!(resting * 2 > POSE_REEL.len());
    }
}

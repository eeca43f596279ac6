use std::f32::consts::TAU;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MORPH_SECONDS: f32 = 2.0;
pub const DEFAULT_EXPLODE_INTENSITY: f32 = 5.0;
pub const EXPLODE_SECONDS: f32 = 1.0;

/// Progress reparameterizations on [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    #[default]
    CubicInOut,
    ElasticOut,
    BounceOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::ElasticOut => {
                const C4: f32 = TAU / 3.0;
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else {
                    2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * C4).sin() + 1.0
                }
            }
            Easing::BounceOut => {
                const N1: f32 = 7.5625;
                const D1: f32 = 2.75;
                let mut t = t;
                if t < 1.0 / D1 {
                    N1 * t * t
                } else if t < 2.0 / D1 {
                    t -= 1.5 / D1;
                    N1 * t * t + 0.75
                } else if t < 2.5 / D1 {
                    t -= 2.25 / D1;
                    N1 * t * t + 0.9375
                } else {
                    t -= 2.625 / D1;
                    N1 * t * t + 0.984375
                }
            }
        }
    }
}

struct MorphState {
    starts: Vec<Vec3>,
    targets: Vec<Vec3>,
    duration: f32,
    easing: Easing,
    elapsed: f32,
    eased_progress: f32,
}

/// Timed interpolation of a whole point buffer from a captured start set
/// toward a target set. Restarting while active captures the in-flight
/// interpolated positions as the new start set, so a fresh command can
/// redirect an animation without a visual jump.
#[derive(Default)]
pub struct MorphEngine {
    state: Option<MorphState>,
    animating: bool,
}

impl MorphEngine {
    pub fn start_morph(
        &mut self,
        current: &[Vec3],
        targets: Vec<Vec3>,
        duration_secs: f32,
        easing: Easing,
    ) {
        let duration = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            DEFAULT_MORPH_SECONDS
        };
        self.state = Some(MorphState {
            starts: current.to_vec(),
            targets,
            duration,
            easing,
            elapsed: 0.0,
            eased_progress: 0.0,
        });
        self.animating = true;
    }

    /// Advances the transition and writes the interpolated buffer.
    /// Returns false once raw progress has reached 1.
    pub fn update(&mut self, positions: &mut [Vec3], dt_secs: f32) -> bool {
        if !self.animating {
            return false;
        }
        let Some(state) = self.state.as_mut() else {
            return false;
        };

        let dt = if dt_secs.is_finite() { dt_secs.max(0.0) } else { 0.0 };
        state.elapsed += dt;

        let raw_progress = if state.duration <= 0.0 {
            1.0
        } else {
            (state.elapsed / state.duration).min(1.0)
        };
        let eased = state.easing.apply(raw_progress);
        state.eased_progress = eased;

        for (index, position) in positions.iter_mut().enumerate() {
            let Some(start) = state.starts.get(index).copied() else {
                continue;
            };
            // A short target list reuses the start position for the tail.
            let target = state.targets.get(index).copied().unwrap_or(start);
            *position = start.lerp(target, eased);
        }

        if raw_progress >= 1.0 {
            self.animating = false;
            return false;
        }
        true
    }

    /// Pushes every point outward along its own direction from the origin
    /// and rides an elastic overshoot toward the result.
    pub fn explode(&mut self, positions: &[Vec3], intensity: f32, duration_secs: f32) {
        let intensity = if intensity.is_finite() {
            intensity
        } else {
            DEFAULT_EXPLODE_INTENSITY
        };
        let targets = positions
            .iter()
            .map(|position| *position + position.normalize_or_zero() * intensity)
            .collect();
        self.start_morph(positions, targets, duration_secs, Easing::ElasticOut);
    }

    pub fn is_active(&self) -> bool {
        self.animating
    }

    pub fn progress(&self) -> f32 {
        self.state
            .as_ref()
            .map(|state| state.eased_progress)
            .unwrap_or(0.0)
    }

    pub fn stop(&mut self) {
        self.animating = false;
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn easings_hit_both_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::CubicInOut,
            Easing::ElasticOut,
            Easing::BounceOut,
        ] {
            assert!(easing.apply(0.0).abs() < EPSILON, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < EPSILON, "{easing:?} at 1");
        }
    }

    #[test]
    fn cubic_in_out_midpoint() {
        assert!((Easing::CubicInOut.apply(0.5) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn bounce_out_first_branch() {
        let t = 0.2;
        assert!((Easing::BounceOut.apply(t) - 7.5625 * t * t).abs() < EPSILON);
    }

    #[test]
    fn progress_is_clamped_and_monotonic() {
        let mut engine = MorphEngine::default();
        let mut positions = vec![Vec3::ZERO];
        engine.start_morph(&positions, vec![Vec3::X * 2.0], 2.0, Easing::Linear);

        assert!(engine.update(&mut positions, 0.0));
        assert!(engine.progress().abs() < EPSILON);

        assert!(engine.update(&mut positions, 1.0));
        assert!(engine.progress() > 0.0 && engine.progress() < 1.0);

        assert!(!engine.update(&mut positions, 1.0));
        assert!((engine.progress() - 1.0).abs() < EPSILON);
        assert!((positions[0].x - 2.0).abs() < EPSILON);

        // Past the end the engine stays inactive and leaves the buffer alone.
        assert!(!engine.update(&mut positions, 2.0));
        assert!((engine.progress() - 1.0).abs() < EPSILON);
        assert!((positions[0].x - 2.0).abs() < EPSILON);
    }

    #[test]
    fn linear_morph_interpolates_halfway() {
        let mut engine = MorphEngine::default();
        let mut positions = vec![Vec3::ZERO];
        engine.start_morph(&positions, vec![Vec3::new(2.0, -4.0, 6.0)], 2.0, Easing::Linear);
        engine.update(&mut positions, 1.0);
        assert!((positions[0] - Vec3::new(1.0, -2.0, 3.0)).length() < EPSILON);
    }

    #[test]
    fn restart_captures_inflight_positions() {
        let mut engine = MorphEngine::default();
        let mut positions = vec![Vec3::ZERO];
        engine.start_morph(&positions, vec![Vec3::X * 4.0], 2.0, Easing::Linear);
        engine.update(&mut positions, 1.0);
        let midpoint = positions[0];

        engine.start_morph(&positions, vec![Vec3::Y * 8.0], 2.0, Easing::Linear);
        engine.update(&mut positions, 0.0);
        assert!((positions[0] - midpoint).length() < EPSILON);
    }

    #[test]
    fn short_target_list_reuses_start_positions() {
        let mut engine = MorphEngine::default();
        let mut positions = vec![Vec3::X, Vec3::Y, Vec3::Z];
        engine.start_morph(&positions, vec![Vec3::X * 3.0, Vec3::Y * 3.0], 0.5, Easing::Linear);
        while engine.update(&mut positions, 0.25) {}
        assert!((positions[0] - Vec3::X * 3.0).length() < EPSILON);
        assert!((positions[1] - Vec3::Y * 3.0).length() < EPSILON);
        assert!((positions[2] - Vec3::Z).length() < EPSILON);
    }

    #[test]
    fn explode_targets_push_points_outward() {
        let mut engine = MorphEngine::default();
        let mut positions = vec![Vec3::X, Vec3::ZERO];
        engine.explode(&positions, 5.0, 1.0);
        while engine.update(&mut positions, 0.5) {}
        assert!((positions[0] - Vec3::X * 6.0).length() < EPSILON);
        assert!(positions[1].length() < EPSILON);
    }

    #[test]
    fn hostile_time_inputs_are_clamped() {
        let mut engine = MorphEngine::default();
        let mut positions = vec![Vec3::ZERO];
        engine.start_morph(&positions, vec![Vec3::X], 1.0, Easing::Linear);
        assert!(engine.update(&mut positions, -5.0));
        assert!(engine.progress().abs() < EPSILON);
        assert!(engine.update(&mut positions, f32::NAN));
        assert!(engine.progress().abs() < EPSILON);

        let mut instant = MorphEngine::default();
        instant.start_morph(&positions, vec![Vec3::Y], -3.0, Easing::Linear);
        assert!(!instant.update(&mut positions, 0.0));
        assert!((positions[0] - Vec3::Y).length() < EPSILON);
    }
}

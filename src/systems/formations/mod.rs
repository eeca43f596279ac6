use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod letterforms;

#[cfg(test)]
mod tests;

pub const SPHERE_RADIUS: f32 = 2.0;
pub const CUBE_SIZE: f32 = 3.0;
pub const TORUS_MAJOR_RADIUS: f32 = 2.0;
pub const TORUS_MINOR_RADIUS: f32 = 0.8;
pub const HELIX_RADIUS: f32 = 2.0;
pub const HELIX_HEIGHT: f32 = 4.0;
pub const HELIX_TURNS: f32 = 3.0;
pub const RANDOM_SPREAD: f32 = 5.0;
pub const SYMBOL_SIZE: f32 = 2.0;

/// Named target shapes for the cloud. Unknown names degrade to `Random`
/// instead of failing, so a stale preset can never break the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formation {
    Sphere,
    Cube,
    Torus,
    Helix,
    Random,
    Heart,
    ApologySpiral,
    LoveHearts,
    Text(String),
}

impl Formation {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "sphere" => Formation::Sphere,
            "cube" => Formation::Cube,
            "torus" => Formation::Torus,
            "helix" => Formation::Helix,
            "heart" => Formation::Heart,
            "apology_spiral" => Formation::ApologySpiral,
            "love_hearts" => Formation::LoveHearts,
            _ => Formation::Random,
        }
    }
}

impl std::fmt::Display for Formation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formation::Sphere => write!(f, "sphere"),
            Formation::Cube => write!(f, "cube"),
            Formation::Torus => write!(f, "torus"),
            Formation::Helix => write!(f, "helix"),
            Formation::Random => write!(f, "random"),
            Formation::Heart => write!(f, "heart"),
            Formation::ApologySpiral => write!(f, "apology_spiral"),
            Formation::LoveHearts => write!(f, "love_hearts"),
            Formation::Text(text) => write!(f, "text:{text}"),
        }
    }
}

/// Exactly `count` points for the requested shape, for any count >= 0.
pub fn generate(formation: &Formation, count: usize, rng: &mut impl Rng) -> Vec<Vec3> {
    match formation {
        Formation::Sphere => generate_sphere(count, SPHERE_RADIUS),
        Formation::Cube => generate_cube(count, CUBE_SIZE),
        Formation::Torus => generate_torus(count, TORUS_MAJOR_RADIUS, TORUS_MINOR_RADIUS),
        Formation::Helix => generate_helix(count, HELIX_RADIUS, HELIX_HEIGHT, HELIX_TURNS),
        Formation::Random => generate_random(count, RANDOM_SPREAD, rng),
        Formation::Heart => generate_heart(count, SYMBOL_SIZE, rng),
        Formation::ApologySpiral => generate_apology_spiral(count, SYMBOL_SIZE, rng),
        Formation::LoveHearts => generate_love_hearts(count, SYMBOL_SIZE, rng),
        Formation::Text(text) => generate_text(count, text, SYMBOL_SIZE, rng),
    }
}

/// Golden-angle lattice over the sphere surface, near-uniform at any count.
pub fn generate_sphere(count: usize, radius: f32) -> Vec<Vec3> {
    let golden_ratio = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let angle_increment = std::f64::consts::TAU * golden_ratio;

    (0..count)
        .map(|i| {
            let t = i as f64 / count as f64;
            let inclination = (1.0 - 2.0 * t).acos();
            let azimuth = angle_increment * i as f64;
            Vec3::new(
                (radius as f64 * inclination.sin() * azimuth.cos()) as f32,
                (radius as f64 * inclination.sin() * azimuth.sin()) as f32,
                (radius as f64 * inclination.cos()) as f32,
            )
        })
        .collect()
}

/// Regular grid with `ceil(cbrt(count))` points per edge, truncated at count.
pub fn generate_cube(count: usize, size: f32) -> Vec<Vec3> {
    let points_per_edge = (count as f64).cbrt().ceil() as usize;
    let step = if points_per_edge > 1 {
        size / (points_per_edge - 1) as f32
    } else {
        0.0
    };
    let offset = size / 2.0;

    let mut positions = Vec::with_capacity(count);
    'grid: for x in 0..points_per_edge {
        for y in 0..points_per_edge {
            for z in 0..points_per_edge {
                if positions.len() >= count {
                    break 'grid;
                }
                positions.push(Vec3::new(
                    x as f32 * step - offset,
                    y as f32 * step - offset,
                    z as f32 * step - offset,
                ));
            }
        }
    }
    positions
}

/// Golden-angle distributed (major, minor) angle pairs over the torus.
pub fn generate_torus(count: usize, major_radius: f32, minor_radius: f32) -> Vec<Vec3> {
    let golden_ratio = (1.0 + 5.0_f64.sqrt()) / 2.0;

    (0..count)
        .map(|i| {
            let u = (i as f64 / count as f64) * std::f64::consts::TAU;
            let v = ((i as f64 * golden_ratio) % 1.0) * std::f64::consts::TAU;
            let ring = major_radius as f64 + minor_radius as f64 * v.cos();
            Vec3::new(
                (ring * u.cos()) as f32,
                (ring * u.sin()) as f32,
                (minor_radius as f64 * v.sin()) as f32,
            )
        })
        .collect()
}

pub fn generate_helix(count: usize, radius: f32, height: f32, turns: f32) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            let angle = t * TAU * turns;
            Vec3::new(
                radius * angle.cos(),
                t * height - height / 2.0,
                radius * angle.sin(),
            )
        })
        .collect()
}

/// Uniform fill of a cube with edge `spread`, intentionally non-deterministic.
pub fn generate_random(count: usize, spread: f32, rng: &mut impl Rng) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            Vec3::new(
                (rng.random::<f32>() - 0.5) * spread,
                (rng.random::<f32>() - 0.5) * spread,
                (rng.random::<f32>() - 0.5) * spread,
            )
        })
        .collect()
}

// ═══════════════════════ Symbolic shapes ═══════════════════════

/// Filled 3D heart: random depth layers of the classic 16 sin^3 curve with a
/// center-biased interior fill.
pub fn generate_heart(count: usize, size: f32, rng: &mut impl Rng) -> Vec<Vec3> {
    const LAYERS: usize = 20;

    (0..count)
        .map(|_| {
            let layer_index = rng.random_range(0..LAYERS);
            let z_depth = (layer_index as f32 / LAYERS as f32 - 0.5) * size * 0.8;
            let layer_scale =
                1.0 - (layer_index as f32 - LAYERS as f32 / 2.0).abs() / (LAYERS as f32 / 2.0) * 0.3;

            let t = rng.random::<f32>() * TAU;
            let mut heart_x = size * layer_scale * t.sin().powi(3);
            let mut heart_y = size
                * layer_scale
                * (13.0 * t.cos()
                    - 5.0 * (2.0 * t).cos()
                    - 2.0 * (3.0 * t).cos()
                    - (4.0 * t).cos())
                / 16.0;

            // Two uniform draws multiplied bias the fill toward the center.
            let radius_scale = rng.random::<f32>() * rng.random::<f32>();
            heart_x *= radius_scale;
            heart_y *= radius_scale;

            heart_x += (rng.random::<f32>() - 0.5) * size * 0.1;
            heart_y += (rng.random::<f32>() - 0.5) * size * 0.1;

            Vec3::new(heart_x, heart_y, z_depth)
        })
        .collect()
}

/// Filled double-helix: two strands offset by pi plus connecting base pairs.
pub fn generate_apology_spiral(count: usize, size: f32, rng: &mut impl Rng) -> Vec<Vec3> {
    let height = size * 4.0;
    let radius = size * 0.8;
    let turns = 3.0;

    (0..count)
        .map(|_| {
            let pick = rng.random::<f32>();
            if pick < 0.8 {
                let strand_phase = if pick < 0.4 { 0.0 } else { std::f32::consts::PI };
                let t = rng.random::<f32>() * turns * TAU;
                let y = (rng.random::<f32>() - 0.5) * height;
                let helix_radius = radius + (rng.random::<f32>() - 0.5) * size * 0.2;
                let phase = t + y / height * turns * TAU + strand_phase;
                Vec3::new(helix_radius * phase.cos(), y, helix_radius * phase.sin())
            } else {
                let y = (rng.random::<f32>() - 0.5) * height;
                let angle = y / height * turns * TAU;

                let strand_a = Vec2::new(radius * angle.cos(), radius * angle.sin());
                let strand_b = -strand_a;
                let along = rng.random::<f32>();
                let x = strand_a.x + (strand_b.x - strand_a.x) * along;
                let z = strand_a.y + (strand_b.y - strand_a.y) * along;

                let thickness = (rng.random::<f32>() - 0.5) * size * 0.3;
                Vec3::new(
                    x - angle.sin() * thickness,
                    y,
                    z + angle.cos() * thickness,
                )
            }
        })
        .collect()
}

/// Three hearts of growing size ringed in 3D, remainder on a jittered orbit.
pub fn generate_love_hearts(count: usize, size: f32, rng: &mut impl Rng) -> Vec<Vec3> {
    const HEARTS: usize = 3;
    let points_per_heart = count / HEARTS;
    let mut positions = Vec::with_capacity(count);

    for heart_index in 0..HEARTS {
        if positions.len() >= count {
            break;
        }
        let around = heart_index as f32 * TAU / HEARTS as f32;
        let offset = Vec3::new(
            (heart_index as f32 - 1.0) * size * 0.8,
            around.sin() * size * 0.5,
            around.cos() * size * 0.5,
        );
        let heart_size = size * (0.6 + heart_index as f32 * 0.2);

        for i in 0..points_per_heart {
            if positions.len() >= count {
                break;
            }
            let t = (i as f32 / points_per_heart as f32) * TAU;
            let base = Vec3::new(
                heart_size * t.sin().powi(3),
                heart_size
                    * (13.0 * t.cos()
                        - 5.0 * (2.0 * t).cos()
                        - 2.0 * (3.0 * t).cos()
                        - (4.0 * t).cos())
                    / 16.0,
                (t * 2.0).sin() * heart_size * 0.3,
            );
            positions.push(base + offset);
        }
    }

    while positions.len() < count {
        let angle = (positions.len() as f32 / count as f32) * 2.0 * TAU;
        let radius = size * 1.5;
        positions.push(Vec3::new(
            angle.cos() * radius + (rng.random::<f32>() - 0.5) * size * 0.3,
            (angle * 2.0).sin() * radius * 0.5,
            angle.sin() * radius + (rng.random::<f32>() - 0.5) * size * 0.3,
        ));
    }

    positions
}

/// Dot-matrix letterforms: template cells first, shortfall padded by
/// re-sampling jittered template points. A message with no renderable glyph
/// degrades to the random cloud.
pub fn generate_text(count: usize, text: &str, size: f32, rng: &mut impl Rng) -> Vec<Vec3> {
    let template = letterforms::template_points(text, size);
    if template.is_empty() {
        return generate_random(count, RANDOM_SPREAD, rng);
    }

    let mut positions = Vec::with_capacity(count);
    for i in 0..count {
        let base = if i < template.len() {
            template[i]
        } else {
            template[rng.random_range(0..template.len())]
        };
        positions.push(Vec3::new(
            base.x + (rng.random::<f32>() - 0.5) * size * 0.04,
            base.y + (rng.random::<f32>() - 0.5) * size * 0.04,
            base.z + (rng.random::<f32>() - 0.5) * size * 0.1,
        ));
    }
    positions
}

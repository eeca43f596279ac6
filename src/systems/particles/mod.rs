use std::collections::VecDeque;

use bevy::prelude::*;
use noise::{NoiseFn, Simplex};
use rand::Rng;
use rand_distr::{Distribution, UnitSphere};
use serde::Deserialize;

use crate::data::rng::GlobalRng;
use crate::startup::config::SemaphoreConfig;
use crate::systems::formations::{self, Formation};
use crate::systems::mapping::{
    relay_gestures, CommandIssued, GestureMapper, ParticleAction, ParticleCommand,
};
use crate::systems::morph::{
    Easing, MorphEngine, DEFAULT_EXPLODE_INTENSITY, DEFAULT_MORPH_SECONDS, EXPLODE_SECONDS,
};


// ----- Cloud Constants -----
const COMMAND_QUEUE_CAPACITY: usize = 32;
const EXPLODE_REVERT_SECONDS: f32 = 2.0;
const SWITCH_MORPH_SECONDS: f32 = 1.5;
const VELOCITY_DAMPING: f32 = 0.98;
const BREATHING_AMPLITUDE: f32 = 0.01;
const INITIAL_SPREAD: f32 = 10.0;
const INITIAL_VELOCITY_SPAN: f32 = 0.02;
const NOISE_TIME_RATE: f64 = 0.1;
const NOISE_Y_OFFSET: f64 = 100.0;
const NOISE_Z_OFFSET: f64 = 200.0;
const SCALE_MINIMUM: f32 = 0.1;
const SCALE_MAXIMUM: f32 = 3.0;

/// World units per simulation unit when projecting the cloud into the scene.
pub const WORLD_SCALE: f32 = 120.0;
const PARTICLE_GLYPH_SIZE: f32 = 12.0;
const PARTICLE_COLOR: Color = Color::srgb(0.62, 0.86, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleMode {
    #[default]
    Drift,
    Formation,
    Exploding,
}

/// Tunables for the cloud, loadable from the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParticleTuning {
    pub particle_count: usize,
    pub drift_speed: f32,
    pub noise_scale: f32,
    pub morph_seconds: f32,
    pub easing: Easing,
}

impl Default for ParticleTuning {
    fn default() -> Self {
        Self {
            particle_count: 20_000,
            drift_speed: 0.1,
            noise_scale: 0.5,
            morph_seconds: DEFAULT_MORPH_SECONDS,
            easing: Easing::default(),
        }
    }
}

/// The particle cloud itself: positions, velocities, the morph engine and a
/// bounded command queue, advanced by `tick` once per frame.
#[derive(Resource)]
pub struct ParticleSimulation {
    tuning: ParticleTuning,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    morph: MorphEngine,
    mode: ParticleMode,
    formation: Formation,
    time: f32,
    rotation_speed: f32,
    rotation_angle: f32,
    scale: f32,
    explode_deadline: Option<f32>,
    queue: VecDeque<ParticleCommand>,
    noise: Simplex,
}

impl ParticleSimulation {
    pub fn new(tuning: ParticleTuning, rng: &mut impl Rng) -> Self {
        let positions = formations::generate_random(tuning.particle_count, INITIAL_SPREAD, rng);
        let velocities = (0..tuning.particle_count)
            .map(|_| {
                let direction: [f32; 3] = UnitSphere.sample(&mut *rng);
                Vec3::from_array(direction) * rng.random::<f32>() * INITIAL_VELOCITY_SPAN
            })
            .collect();

        Self {
            tuning,
            positions,
            velocities,
            morph: MorphEngine::default(),
            mode: ParticleMode::default(),
            formation: Formation::Random,
            time: 0.0,
            rotation_speed: 0.0,
            rotation_angle: 0.0,
            scale: 1.0,
            explode_deadline: None,
            queue: VecDeque::new(),
            noise: Simplex::new(rng.random::<u32>()),
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn mode(&self) -> ParticleMode {
        self.mode
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn rotation_angle(&self) -> f32 {
        self.rotation_angle
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_morphing(&self) -> bool {
        self.morph.is_active()
    }

    pub fn morph_progress(&self) -> f32 {
        self.morph.progress()
    }

    /// Queues a command for execution, one per tick in arrival order. The
    /// queue is bounded; a command beyond capacity is dropped.
    pub fn enqueue(&mut self, command: ParticleCommand) {
        if self.queue.len() >= COMMAND_QUEUE_CAPACITY {
            warn!("command queue full; dropping {:?}", command.action);
            return;
        }
        self.queue.push_back(command);
    }

    /// One simulation step. `current_object` is the mapper's cycle entry,
    /// resolved here so a queued switch lands on whatever is selected when
    /// it finally runs.
    pub fn tick(&mut self, dt: f32, current_object: &Formation, rng: &mut impl Rng) {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        if let Some(command) = self.queue.pop_front() {
            self.execute(command, current_object, rng);
        }

        self.time += dt;
        if self.mode == ParticleMode::Exploding {
            if let Some(deadline) = self.explode_deadline {
                if self.time >= deadline {
                    self.mode = ParticleMode::Drift;
                    self.explode_deadline = None;
                }
            }
        }

        match self.mode {
            ParticleMode::Drift => self.drift(dt),
            ParticleMode::Formation => self.breathe(dt),
            ParticleMode::Exploding => {}
        }

        if self.morph.is_active() {
            self.morph.update(&mut self.positions, dt);
        }

        self.rotation_angle += self.rotation_speed * dt;
    }

    fn execute(&mut self, command: ParticleCommand, current_object: &Formation, rng: &mut impl Rng) {
        let params = command.params;
        let speed = if params.speed.is_finite() && params.speed > 0.0 {
            params.speed
        } else {
            1.0
        };
        let gather_seconds = self.tuning.morph_seconds / speed;

        match command.action {
            ParticleAction::GatherSphere => {
                self.morph_to_formation(Formation::Sphere, gather_seconds, rng);
            }
            ParticleAction::GatherCube => {
                self.morph_to_formation(Formation::Cube, gather_seconds, rng);
            }
            ParticleAction::GatherTorus => {
                self.morph_to_formation(Formation::Torus, gather_seconds, rng);
            }
            ParticleAction::FormHeart => {
                self.morph_to_formation(Formation::Heart, gather_seconds, rng);
            }
            ParticleAction::FormApologySpiral => {
                self.morph_to_formation(Formation::ApologySpiral, gather_seconds, rng);
            }
            ParticleAction::FormLoveHearts => {
                self.morph_to_formation(Formation::LoveHearts, gather_seconds, rng);
            }
            ParticleAction::Explode => self.explode(params.intensity * DEFAULT_EXPLODE_INTENSITY),
            ParticleAction::Drift => self.set_drift_mode(),
            ParticleAction::RotateObject => self.rotate(params.angle * 2.0),
            ParticleAction::ScaleUp => self.set_scale(params.scale),
            ParticleAction::SwitchObject => {
                self.morph_to_formation(current_object.clone(), SWITCH_MORPH_SECONDS, rng);
            }
        }
    }

    /// Starts a morph toward `formation`. Entering a deliberate shape also
    /// cancels any pending explode revert.
    pub fn morph_to_formation(&mut self, formation: Formation, duration: f32, rng: &mut impl Rng) {
        let targets = formations::generate(&formation, self.positions.len(), rng);
        self.morph
            .start_morph(&self.positions, targets, duration, self.tuning.easing);
        self.formation = formation;
        self.mode = ParticleMode::Formation;
        self.explode_deadline = None;
    }

    /// Blasts every particle outward along its radius, then reverts to
    /// drifting once the deadline passes in simulation time.
    pub fn explode(&mut self, intensity: f32) {
        self.morph.explode(&self.positions, intensity, EXPLODE_SECONDS);
        self.mode = ParticleMode::Exploding;
        self.explode_deadline = Some(self.time + EXPLODE_REVERT_SECONDS);
    }

    /// Returns to free drift. A running morph keeps going; the noise field
    /// takes over when it finishes.
    pub fn set_drift_mode(&mut self) {
        self.mode = ParticleMode::Drift;
        self.explode_deadline = None;
    }

    pub fn rotate(&mut self, speed: f32) {
        self.rotation_speed = speed;
    }

    pub fn set_scale(&mut self, scale: f32) {
        if !scale.is_finite() {
            warn!("ignoring non-finite scale {scale}");
            return;
        }
        let normalized = scale.clamp(SCALE_MINIMUM, SCALE_MAXIMUM);
        if normalized != scale {
            warn!("scale {scale} is out of range; clamped to {normalized}");
        }
        self.scale = normalized;
    }

    fn drift(&mut self, dt: f32) {
        let frequency = self.tuning.noise_scale as f64;
        let t = self.time as f64 * NOISE_TIME_RATE;
        for (position, velocity) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            let push = Vec3::new(
                self.noise.get([
                    position.x as f64 * frequency,
                    position.y as f64 * frequency,
                    t,
                ]) as f32,
                self.noise.get([
                    position.y as f64 * frequency,
                    position.z as f64 * frequency,
                    t + NOISE_Y_OFFSET,
                ]) as f32,
                self.noise.get([
                    position.z as f64 * frequency,
                    position.x as f64 * frequency,
                    t + NOISE_Z_OFFSET,
                ]) as f32,
            );
            *velocity += push * self.tuning.drift_speed * dt;
            *velocity *= VELOCITY_DAMPING;
            *position += *velocity;
        }
    }

    fn breathe(&mut self, dt: f32) {
        for (index, position) in self.positions.iter_mut().enumerate() {
            position.y += (self.time + index as f32 * 0.1).sin() * BREATHING_AMPLITUDE * dt;
        }
    }
}

#[derive(Component)]
pub struct CloudRoot;

/// Index into the simulation's position buffer.
#[derive(Component)]
pub struct ParticleIndex(pub usize);

#[derive(Default, States, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CloudSystemsActive {
    #[default]
    False,
    True,
}

fn activate_systems(
    mut cloud_state: ResMut<NextState<CloudSystemsActive>>,
    cloud_query: Query<&CloudRoot>,
) {
    cloud_state.set(if cloud_query.is_empty() {
        CloudSystemsActive::False
    } else {
        CloudSystemsActive::True
    });
}

fn spawn_cloud(mut commands: Commands, config: Res<SemaphoreConfig>, mut rng: ResMut<GlobalRng>) {
    let simulation = ParticleSimulation::new(config.particles.clone(), &mut *rng);
    info!("spawning a cloud of {} particles", simulation.positions().len());

    commands
        .spawn((CloudRoot, Transform::default(), Visibility::default()))
        .with_children(|parent| {
            for (index, position) in simulation.positions().iter().enumerate() {
                parent.spawn((
                    ParticleIndex(index),
                    Text2d::new("·"),
                    TextFont {
                        font_size: PARTICLE_GLYPH_SIZE,
                        ..default()
                    },
                    TextColor(PARTICLE_COLOR),
                    Transform::from_translation(*position * WORLD_SCALE),
                ));
            }
        });

    commands.insert_resource(simulation);
}

/// Feeds newly issued commands into the queue and steps the simulation by
/// the frame delta.
pub fn advance_simulation(
    time: Res<Time>,
    mut simulation: ResMut<ParticleSimulation>,
    mapper: Res<GestureMapper>,
    mut rng: ResMut<GlobalRng>,
    mut issued: EventReader<CommandIssued>,
) {
    for CommandIssued(command) in issued.read() {
        simulation.enqueue(*command);
    }
    let current_object = mapper.current_object_type().clone();
    simulation.tick(time.delta_secs(), &current_object, &mut *rng);
}

/// Projects simulation state into the scene: cloud rotation and scale on the
/// root, particle positions on the glyph children.
pub fn sync_transforms(
    simulation: Res<ParticleSimulation>,
    mut root_query: Query<&mut Transform, With<CloudRoot>>,
    mut glyph_query: Query<(&ParticleIndex, &mut Transform), Without<CloudRoot>>,
) {
    for mut transform in &mut root_query {
        transform.rotation = Quat::from_rotation_y(simulation.rotation_angle());
        transform.scale = Vec3::splat(simulation.scale());
    }

    let positions = simulation.positions();
    for (index, mut transform) in &mut glyph_query {
        if let Some(position) = positions.get(index.0) {
            transform.translation = *position * WORLD_SCALE;
        }
    }
}

pub struct CloudPlugin;

impl Plugin for CloudPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<CloudSystemsActive>()
            .add_systems(Startup, spawn_cloud)
            .add_systems(Update, activate_systems)
            .add_systems(
                Update,
                (advance_simulation, sync_transforms)
                    .chain()
                    .after(relay_gestures)
                    .run_if(in_state(CloudSystemsActive::True)),
            );
    }
}

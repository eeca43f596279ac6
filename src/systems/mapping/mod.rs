use std::collections::HashMap;

use bevy::prelude::*;
use enum_map::{enum_map, EnumMap};
use serde::{Deserialize, Serialize};

use crate::systems::formations::Formation;
use crate::systems::gestures::{classify_frames, GestureDetected, GestureEvent, GestureKind};

/// Commands the particle cloud understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleAction {
    Explode,
    GatherSphere,
    GatherCube,
    GatherTorus,
    FormHeart,
    FormApologySpiral,
    FormLoveHearts,
    Drift,
    RotateObject,
    ScaleUp,
    SwitchObject,
}

/// Per-command tuning. Absent measurements fall back to these values, so a
/// command built from a bare gesture is always well-defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandParams {
    pub intensity: f32,
    pub speed: f32,
    pub angle: f32,
    pub scale: f32,
}

impl Default for CommandParams {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            speed: 1.0,
            angle: 0.0,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleCommand {
    pub action: ParticleAction,
    pub params: CommandParams,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct CommandIssued(pub ParticleCommand);

/// Mapper section of the config file: rebinds gestures and replaces the
/// object cycle. Anything absent keeps its default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub overrides: HashMap<GestureKind, ParticleAction>,
    pub object_types: Vec<Formation>,
}

/// Turns classified gestures into particle commands and tracks the cycled
/// object selection.
#[derive(Resource)]
pub struct GestureMapper {
    mappings: EnumMap<GestureKind, Option<ParticleAction>>,
    object_types: Vec<Formation>,
    object_index: usize,
}

impl Default for GestureMapper {
    fn default() -> Self {
        Self {
            mappings: default_table(),
            object_types: vec![Formation::Sphere, Formation::Cube, Formation::Torus],
            object_index: 0,
        }
    }
}

fn default_table() -> EnumMap<GestureKind, Option<ParticleAction>> {
    enum_map! {
        GestureKind::OpenPalm => Some(ParticleAction::Explode),
        GestureKind::Fist => Some(ParticleAction::GatherSphere),
        GestureKind::OkSign => Some(ParticleAction::FormHeart),
        GestureKind::PeaceSign => Some(ParticleAction::FormApologySpiral),
        GestureKind::Pinch => Some(ParticleAction::ScaleUp),
        GestureKind::Wave => Some(ParticleAction::FormLoveHearts),
        GestureKind::SwipeLeft | GestureKind::SwipeRight => Some(ParticleAction::SwitchObject),
        GestureKind::RotateCw | GestureKind::RotateCcw => Some(ParticleAction::RotateObject),
        GestureKind::TwoHandSpread => Some(ParticleAction::ScaleUp),
        GestureKind::TwoHandClap => Some(ParticleAction::GatherSphere),
        GestureKind::ThumbsDown => Some(ParticleAction::Drift),
        _ => None,
    }
}

impl GestureMapper {
    pub fn from_config(config: &MapperConfig) -> Self {
        let mut mapper = Self::default();
        for (&kind, &action) in &config.overrides {
            mapper.mappings[kind] = Some(action);
        }
        if !config.object_types.is_empty() {
            mapper.set_object_types(config.object_types.clone());
        }
        mapper
    }

    /// Maps one gesture to a command, or `None` for the idle sentinel and
    /// unbound gestures. Switch gestures advance the object cycle here, at
    /// map time; the formation itself is resolved when the command runs.
    pub fn map_gesture(&mut self, event: &GestureEvent) -> Option<ParticleCommand> {
        if event.kind == GestureKind::None {
            return None;
        }
        let action = self.mappings[event.kind]?;

        let mut params = CommandParams {
            intensity: event.confidence,
            ..CommandParams::default()
        };
        match action {
            ParticleAction::RotateObject => params.angle = event.angle.unwrap_or(0.0),
            ParticleAction::ScaleUp => {
                params.scale = event.distance.map(|d| d * 2.5).unwrap_or(1.0);
            }
            ParticleAction::SwitchObject => self.advance_cycle(event.kind),
            _ => {}
        }
        Some(ParticleCommand { action, params })
    }

    fn advance_cycle(&mut self, kind: GestureKind) {
        let length = self.object_types.len();
        self.object_index = if kind == GestureKind::SwipeLeft {
            (self.object_index + length - 1) % length
        } else {
            (self.object_index + 1) % length
        };
    }

    pub fn current_object_type(&self) -> &Formation {
        &self.object_types[self.object_index]
    }

    /// Replaces the object cycle and rewinds it. An empty list would leave
    /// switch gestures nowhere to land, so it is refused.
    pub fn set_object_types(&mut self, object_types: Vec<Formation>) {
        if object_types.is_empty() {
            warn!("refusing an empty object cycle; keeping the current one");
            return;
        }
        self.object_types = object_types;
        self.object_index = 0;
    }

    pub fn update_mapping(&mut self, kind: GestureKind, action: ParticleAction) {
        self.mappings[kind] = Some(action);
    }

    pub fn mappings(&self) -> EnumMap<GestureKind, Option<ParticleAction>> {
        self.mappings
    }
}

/// Maps freshly classified gestures and publishes the resulting commands.
pub fn relay_gestures(
    mut mapper: ResMut<GestureMapper>,
    mut detected: EventReader<GestureDetected>,
    mut issued: EventWriter<CommandIssued>,
) {
    for GestureDetected(event) in detected.read() {
        if let Some(command) = mapper.map_gesture(event) {
            debug!("{} -> {:?}", event.kind, command.action);
            issued.write(CommandIssued(command));
        }
    }
}

pub struct MapperPlugin;

impl Plugin for MapperPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GestureMapper>()
            .add_event::<CommandIssued>()
            .add_systems(Update, relay_gestures.after(classify_frames));
    }
}

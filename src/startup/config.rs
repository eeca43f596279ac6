use bevy::prelude::*;
use serde::Deserialize;

use crate::systems::{mapping::MapperConfig, particles::ParticleTuning};

#[derive(Clone, Copy)]
pub enum SemaphoreConfigFile {
    Default,
}

impl SemaphoreConfigFile {
    pub fn content(&self) -> &str {
        match self {
            SemaphoreConfigFile::Default => include_str!("./content/semaphore.json"),
        }
    }
}

/// Top-level tunables, parsed from an embedded JSON file so builds stay
/// self-contained. Any missing field falls back to its default.
#[derive(Debug, Clone, Resource, Deserialize)]
#[serde(default)]
pub struct SemaphoreConfig {
    pub particles: ParticleTuning,
    pub mapping: MapperConfig,
    pub message: String,
}

impl Default for SemaphoreConfig {
    fn default() -> Self {
        Self {
            particles: ParticleTuning::default(),
            mapping: MapperConfig::default(),
            message: String::from("SORRY!"),
        }
    }
}

impl SemaphoreConfig {
    pub fn load(file: SemaphoreConfigFile) -> Self {
        match Self::from_file(file) {
            Ok(config) => config,
            Err(error) => {
                warn!("failed to load semaphore config: {error}; using safe defaults");
                Self::fallback()
            }
        }
    }

    fn from_file(file: SemaphoreConfigFile) -> Result<Self, serde_json::Error> {
        serde_json::from_str(file.content())
    }

    fn fallback() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::formations::Formation;
    use crate::systems::gestures::GestureKind;
    use crate::systems::mapping::ParticleAction;

    #[test]
    fn the_embedded_file_parses_and_carries_the_demo_tuning() {
        let config = SemaphoreConfig::load(SemaphoreConfigFile::Default);
        assert_eq!(config.particles.particle_count, 2000);
        assert_eq!(
            config.mapping.overrides.get(&GestureKind::ThumbsUp),
            Some(&ParticleAction::GatherCube)
        );
        assert_eq!(config.mapping.object_types.len(), 4);
        assert_eq!(
            config.mapping.object_types[3],
            Formation::Text(String::from("SORRY!"))
        );
        assert_eq!(config.message, "SORRY!");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: SemaphoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.particles.particle_count, 20_000);
        assert!(config.mapping.overrides.is_empty());
        assert!(config.mapping.object_types.is_empty());
        assert_eq!(config.message, "SORRY!");
    }

    #[test]
    fn malformed_json_is_an_error_not_a_panic() {
        assert!(serde_json::from_str::<SemaphoreConfig>("{ nope").is_err());
    }
}

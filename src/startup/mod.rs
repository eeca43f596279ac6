use bevy::prelude::*;

use crate::{
    data::rng::RngPlugin,
    systems::{
        gestures::GesturePlugin,
        mapping::{GestureMapper, MapperPlugin},
        particles::CloudPlugin,
    },
};

pub mod config;
pub mod render;
pub mod shortcuts;

use config::{SemaphoreConfig, SemaphoreConfigFile};

pub struct StartupPlugin;
impl Plugin for StartupPlugin {
    fn build(&self, app: &mut App) {
        let config = SemaphoreConfig::load(SemaphoreConfigFile::Default);
        let mapper = GestureMapper::from_config(&config.mapping);

        app.insert_resource(mapper)
            .insert_resource(config)
            .add_plugins((RngPlugin, GesturePlugin, MapperPlugin, CloudPlugin))
            .add_systems(Startup, render::setup_camera)
            .add_systems(Update, shortcuts::close_on_esc);
    }
}

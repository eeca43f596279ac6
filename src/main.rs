use bevy::prelude::*;

mod data;
mod scenes;
mod startup;
mod systems;

use scenes::demo::DemoPlugin;
use startup::StartupPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(StartupPlugin)
        .add_plugins(DemoPlugin)
        .run();
}

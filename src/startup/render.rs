use bevy::{
    color::palettes::css::BLACK,
    core_pipeline::{bloom::Bloom, tonemapping::Tonemapping},
    prelude::*,
};

#[derive(Component)]
pub struct MainCamera;

pub fn setup_camera(mut commands: Commands, mut clear_color: ResMut<ClearColor>) {
    clear_color.0 = BLACK.into();

    commands.spawn((
        Camera2d,
        MainCamera,
        Camera {
            hdr: true,
            ..default()
        },
        Tonemapping::TonyMcMapface,
        Bloom::default(),
    ));
}

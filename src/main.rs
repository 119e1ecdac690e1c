use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;
use ratsuit::config::{self, GameConfig};
use ratsuit::{graphics, level, simulation};

/// Apply the configured gravity to every Rapier context.
fn setup_physics_config(mut rapier: Query<&mut RapierConfiguration>, config: Res<GameConfig>) {
    for mut cfg in rapier.iter_mut() {
        cfg.gravity = Vec2::new(0.0, config.gravity_y);
    }
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "RatSuit".into(),
                resolution: WindowResolution::new(1200, 680),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.08, 0.08, 0.1)))
        // Compiled defaults; load_game_config overwrites them from
        // assets/game.toml (if present) before anything else starts.
        .insert_resource(GameConfig::default())
        // World units are metres; the camera projection handles pixel scale.
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
        .add_plugins(simulation::CorePlugin)
        .add_systems(
            Startup,
            (
                config::load_game_config,
                graphics::setup_camera.after(config::load_game_config),
                level::spawn_level.after(config::load_game_config),
                setup_physics_config.after(config::load_game_config),
            ),
        )
        .run();
}

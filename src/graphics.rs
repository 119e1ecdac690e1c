use crate::config::GameConfig;
use crate::control::Facing;
use crate::possession::CameraFollow;
use bevy::prelude::*;

/// Setup camera for 2D rendering, scaled so one world unit spans
/// `pixels_per_unit` screen pixels.
pub fn setup_camera(mut commands: Commands, config: Res<GameConfig>) {
    commands.spawn((
        Camera2d,
        Projection::from(OrthographicProjection {
            scale: 1.0 / config.pixels_per_unit.max(1.0),
            ..OrthographicProjection::default_2d()
        }),
    ));
    info!("[setup] camera spawned");
}

/// Keep the camera centred on whatever [`CameraFollow`] points at.
pub fn camera_follow_system(
    follow: Res<CameraFollow>,
    targets: Query<&Transform, Without<Camera>>,
    mut q_camera: Query<&mut Transform, With<Camera>>,
) {
    let Some(target) = follow.target.and_then(|e| targets.get(e).ok()) else {
        return;
    };
    let Ok(mut cam) = q_camera.single_mut() else {
        return;
    };

    cam.translation.x = target.translation.x;
    cam.translation.y = target.translation.y;
}

/// Mirror sprites to match their [`Facing`].
pub fn facing_flip_system(mut q: Query<(&Facing, &mut Sprite), Changed<Facing>>) {
    for (facing, mut sprite) in q.iter_mut() {
        sprite.flip_x = facing.sign() < 0.0;
    }
}

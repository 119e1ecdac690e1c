//! Core gameplay plugin: resources, messages and system ordering.
//!
//! `Update` runs decisions in a fixed order (input → targets → movement →
//! possession → panels → weapon → AI → contact / stomp → presentation).
//! Projectile hits run in `PostUpdate` after Rapier has written this frame's
//! `CollisionEvent`s.  The plugin does not add Rapier itself, so it also runs
//! headless under `MinimalPlugins`.

use crate::ai::{
    gunner_brain_system, gunner_fire_system, gunner_wall_bump_system,
    refresh_target_cache_system, spitter_brain_system, spitter_spit_system, TargetCache,
};
use crate::config::GameConfig;
use crate::contact::{contact_damage_system, gather_touch_contacts_system};
use crate::control::{
    actor_motion_system, gamepad_connection_system, gamepad_to_intent_system,
    ground_probe_system, intent_clear_system, keyboard_to_intent_system, vehicle_drive_system,
    wall_probe_system, ActorIntent, InteractPressed, PreferredGamepad,
};
use crate::damage::{enemy_bullet_receiver_system, log_damage_system, DamageDealt};
use crate::effects::{despawn_after_system, log_cues_system, PresentationCue};
use crate::graphics::{camera_follow_system, facing_flip_system};
use crate::health::hit_flash_system;
use crate::interact::{door_motion_system, panel_interact_system, panel_zone_system};
use crate::physics_query::{prune_collision_ignores_system, CollisionIgnores};
use crate::possession::{
    camera_retarget_system, possession_interact_system, possession_prompt_system,
    suit_zone_system, wrecked_suit_eject_system, CameraFollow,
};
use crate::projectile::{
    arced_projectile_hit_system, fast_projectile_hit_system, slow_bullet_hit_system,
    SlowBulletImpact,
};
use crate::stomp::stomp_system;
use crate::weapon::{overheat_cool_system, suit_weapon_system};
use bevy::input::gamepad::GamepadConnectionEvent;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>()
            .init_resource::<ActorIntent>()
            .init_resource::<PreferredGamepad>()
            .init_resource::<CameraFollow>()
            .init_resource::<TargetCache>()
            .init_resource::<CollisionIgnores>()
            .add_message::<PresentationCue>()
            .add_message::<DamageDealt>()
            .add_message::<SlowBulletImpact>()
            .add_message::<InteractPressed>()
            .add_message::<CollisionEvent>()
            .add_message::<GamepadConnectionEvent>()
            .add_systems(
                Update,
                (
                    (
                        intent_clear_system,
                        keyboard_to_intent_system,
                        gamepad_connection_system,
                        gamepad_to_intent_system,
                    )
                        .chain(),
                    refresh_target_cache_system,
                    (
                        ground_probe_system,
                        wall_probe_system,
                        actor_motion_system,
                        vehicle_drive_system,
                    )
                        .chain(),
                    (
                        suit_zone_system,
                        possession_interact_system,
                        wrecked_suit_eject_system,
                        possession_prompt_system,
                    )
                        .chain(),
                    (panel_zone_system, panel_interact_system, door_motion_system).chain(),
                    (overheat_cool_system, suit_weapon_system).chain(),
                    (
                        gunner_wall_bump_system,
                        gunner_brain_system,
                        gunner_fire_system,
                        spitter_brain_system,
                        spitter_spit_system,
                    )
                        .chain(),
                    (gather_touch_contacts_system, contact_damage_system, stomp_system).chain(),
                    (
                        hit_flash_system,
                        despawn_after_system,
                        camera_retarget_system,
                        camera_follow_system,
                        facing_flip_system,
                    )
                        .chain(),
                )
                    .chain(),
            )
            // Hit resolution runs after Rapier has emitted this frame's collisions.
            .add_systems(
                PostUpdate,
                (
                    fast_projectile_hit_system,
                    arced_projectile_hit_system,
                    // Receivers only react to impacts the bullet pass decided.
                    slow_bullet_hit_system,
                    enemy_bullet_receiver_system,
                    prune_collision_ignores_system,
                    log_damage_system,
                    log_cues_system,
                )
                    .chain()
                    .after(PhysicsSet::Writeback),
            );
    }
}

//! Demo room: a floor, two walls, the rat, the suit, one gunner, one spitter
//! and a control panel that opens a sliding door.
//!
//! Every spawn helper takes the loaded [`GameConfig`] so per-entity tuning is
//! derived once, at spawn time.

use crate::ai::{GunnerBrain, GunnerTuning, SpitterBrain, SpitterTuning};
use crate::config::GameConfig;
use crate::constants::{
    ACTOR_COLLIDER_HALF, GROUND_PROBE_RADIUS, SUIT_COLLIDER_HALF, SUIT_INTERACT_RADIUS,
};
use crate::contact::{ContactDamage, TouchContacts};
use crate::control::{Facing, GroundProbe, Grounded, JumpAssist, MoveStats, WallJump, WallProbe};
use crate::damage::EnemyBulletReceiver;
use crate::health::{EnemyHealth, FlashStyle, Health, HealthTuning};
use crate::interact::{ControlPanel, SlidingDoor};
use crate::physics_query::layers;
use crate::possession::{
    CameraFollow, FreeActor, PhysicalProfile, Possession, PossessionState, SuitZone, Vehicle,
    VehicleDrive,
};
use crate::stomp::StompFinisher;
use crate::weapon::{Overheat, SuitWeapon};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

const FLOOR_Y: f32 = -3.0;
const ROOM_HALF_WIDTH: f32 = 14.0;

fn block(commands: &mut Commands, center: Vec2, half: Vec2, group: Group, color: Color) -> Entity {
    commands
        .spawn((
            RigidBody::Fixed,
            Collider::cuboid(half.x, half.y),
            CollisionGroups::new(group, Group::ALL),
            Sprite::from_color(color, half * 2.0),
            Transform::from_translation(center.extend(0.0)),
        ))
        .id()
}

fn spawn_room(commands: &mut Commands) {
    let stone = Color::srgb(0.3, 0.3, 0.35);
    block(
        commands,
        Vec2::new(0.0, FLOOR_Y - 0.5),
        Vec2::new(ROOM_HALF_WIDTH, 0.5),
        layers::GROUND,
        stone,
    );
    // Ledge the spitter patrols.
    block(
        commands,
        Vec2::new(8.0, FLOOR_Y + 2.0),
        Vec2::new(2.5, 0.25),
        layers::GROUND,
        stone,
    );
    for x in [-ROOM_HALF_WIDTH, ROOM_HALF_WIDTH] {
        block(
            commands,
            Vec2::new(x, FLOOR_Y + 4.0),
            Vec2::new(0.5, 4.5),
            layers::WALL,
            stone,
        );
    }
}

pub fn spawn_rat(commands: &mut Commands, at: Vec2, config: &GameConfig) -> Entity {
    let half = Vec2::from(ACTOR_COLLIDER_HALF);
    commands
        .spawn((
            (
                FreeActor,
                Health::new(HealthTuning::actor(config)),
                EnemyBulletReceiver {
                    damage: config.slow_bullet_damage,
                },
                StompFinisher::from_config(config),
                Facing(1.0),
                GroundProbe {
                    offset: Vec2::new(0.0, -half.y),
                    radius: GROUND_PROBE_RADIUS,
                },
                Grounded::default(),
                JumpAssist::default(),
                MoveStats {
                    speed: config.actor_move_speed,
                    jump_speed: config.actor_jump_speed,
                    jump_cut: config.actor_jump_cut,
                },
                WallProbe::beside(half),
                WallJump::from_config(config),
            ),
            (
                RigidBody::Dynamic,
                Collider::cuboid(half.x, half.y),
                CollisionGroups::new(
                    layers::ACTOR,
                    layers::SOLID | layers::ENEMY | layers::ENEMY_SHOT | layers::INTERACT,
                ),
                ActiveEvents::COLLISION_EVENTS,
                LockedAxes::ROTATION_LOCKED,
                Velocity::zero(),
                Sprite::from_color(Color::srgb(0.75, 0.7, 0.65), half * 2.0),
                Transform::from_translation(at.extend(2.0)),
            ),
        ))
        .id()
}

pub fn spawn_suit(commands: &mut Commands, at: Vec2, config: &GameConfig) -> Entity {
    let half = Vec2::from(SUIT_COLLIDER_HALF);
    let profile = PhysicalProfile::from_config(config);
    commands
        .spawn((
            (
                Vehicle,
                Possession::new(config.reenter_block_time),
                Health::new(HealthTuning::suit(config)),
                EnemyBulletReceiver {
                    damage: config.slow_bullet_damage,
                },
                profile,
                VehicleDrive::default(),
                SuitWeapon::from_config(config),
                Overheat::from_config(config),
                Facing(1.0),
                GroundProbe {
                    offset: Vec2::new(0.0, -half.y),
                    radius: GROUND_PROBE_RADIUS,
                },
                Grounded::default(),
                JumpAssist::default(),
                MoveStats {
                    speed: config.suit_move_speed,
                    jump_speed: config.suit_jump_speed,
                    jump_cut: config.suit_jump_cut,
                },
            ),
            (
                RigidBody::Dynamic,
                Collider::cuboid(half.x, half.y),
                profile.friction(PossessionState::Empty),
                CollisionGroups::new(layers::ACTOR, layers::SOLID | layers::ENEMY | layers::ENEMY_SHOT),
                ActiveEvents::COLLISION_EVENTS,
                LockedAxes::ROTATION_LOCKED,
                Velocity::zero(),
                Sprite::from_color(Color::srgb(0.4, 0.55, 0.7), half * 2.0),
                Transform::from_translation(at.extend(1.0)),
            ),
        ))
        .with_children(|suit| {
            suit.spawn((
                SuitZone,
                Collider::ball(SUIT_INTERACT_RADIUS),
                Sensor,
                CollisionGroups::new(layers::INTERACT, layers::ACTOR),
                ActiveEvents::COLLISION_EVENTS,
                Transform::default(),
            ));
        })
        .id()
}

fn enemy_body(half: Vec2, color: Color, at: Vec2) -> impl Bundle {
    (
        RigidBody::Dynamic,
        Collider::cuboid(half.x, half.y),
        CollisionGroups::new(layers::ENEMY, layers::SOLID | layers::ACTOR | layers::PLAYER_SHOT),
        ActiveEvents::COLLISION_EVENTS,
        LockedAxes::ROTATION_LOCKED,
        Velocity::zero(),
        Sprite::from_color(color, half * 2.0),
        Transform::from_translation(at.extend(1.0)),
    )
}

pub fn spawn_gunner(commands: &mut Commands, at: Vec2, facing: f32, config: &GameConfig) -> Entity {
    let mut rng = rand::thread_rng();
    commands
        .spawn((
            GunnerBrain::new(GunnerTuning::from_config(config), facing, 0.0, &mut rng),
            EnemyHealth::new(config.gunner_max_hp, FlashStyle::from_config(config)),
            Facing(facing),
            enemy_body(Vec2::new(0.3, 0.5), Color::srgb(0.85, 0.85, 0.9), at),
        ))
        .id()
}

pub fn spawn_spitter(commands: &mut Commands, at: Vec2, facing: f32, config: &GameConfig) -> Entity {
    commands
        .spawn((
            SpitterBrain::new(SpitterTuning::from_config(config), facing, 0.0),
            Health::new(HealthTuning::spitter(config)),
            ContactDamage::new(config.touch_damage, config.touch_cooldown),
            TouchContacts::default(),
            Facing(facing),
            enemy_body(Vec2::new(0.3, 0.3), Color::srgb(0.35, 0.75, 0.3), at),
        ))
        .id()
}

pub fn spawn_door_and_panel(
    commands: &mut Commands,
    door_at: Vec2,
    panel_at: Vec2,
    config: &GameConfig,
) -> (Entity, Entity) {
    let half = Vec2::new(0.3, 1.25);
    let door = commands
        .spawn((
            SlidingDoor::new(door_at, config),
            RigidBody::KinematicPositionBased,
            Collider::cuboid(half.x, half.y),
            CollisionGroups::new(layers::WALL, Group::ALL),
            Sprite::from_color(Color::srgb(0.55, 0.45, 0.3), half * 2.0),
            Transform::from_translation(door_at.extend(0.5)),
        ))
        .id();
    let panel = commands
        .spawn((
            ControlPanel::new(Some(door), true),
            Collider::ball(0.6),
            Sensor,
            CollisionGroups::new(layers::INTERACT, layers::ACTOR),
            ActiveEvents::COLLISION_EVENTS,
            Sprite::from_color(Color::srgb(0.9, 0.8, 0.2), Vec2::splat(0.4)),
            Transform::from_translation(panel_at.extend(0.5)),
        ))
        .id();
    (door, panel)
}

/// Startup system: build the demo room and point the camera at the rat.
pub fn spawn_level(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut follow: ResMut<CameraFollow>,
) {
    let floor = FLOOR_Y;
    spawn_room(&mut commands);

    let rat = spawn_rat(&mut commands, Vec2::new(-10.0, floor + 0.5), &config);
    spawn_suit(&mut commands, Vec2::new(-6.0, floor + 0.8), &config);
    spawn_gunner(&mut commands, Vec2::new(2.0, floor + 0.6), -1.0, &config);
    spawn_spitter(&mut commands, Vec2::new(8.0, floor + 2.6), -1.0, &config);
    spawn_door_and_panel(
        &mut commands,
        Vec2::new(11.5, floor + 1.25),
        Vec2::new(10.0, floor + 0.6),
        &config,
    );

    follow.target = Some(rat);
    info!("[level] demo room spawned");
}

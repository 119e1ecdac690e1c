//! Projectiles: the suit's fast bullet, the spitter's acid arc and the
//! gunner's slow bullet.
//!
//! All three are Rapier sensors with a [`DespawnAfter`] lifetime.  Hits are
//! resolved in `PostUpdate` from `CollisionEvent::Started`, and every
//! projectile latches `consumed` before resolving so a second event for the
//! same projectile (same frame or later) is a no-op.
//!
//! | Projectile | Damage path | Empty suit |
//! |------------|-------------|------------|
//! | [`FastProjectile`] | inline, `Health` and `EnemyHealth` | absorbs the shot, no damage |
//! | [`ArcedProjectile`] | inline, `Health` only | absorbs the shot, no damage |
//! | [`SlowBullet`] | receiver side ([`crate::damage::EnemyBulletReceiver`]) | passes through (pair ignored) |
//!
//! A slow bullet reports the collider that consumed it as a
//! [`SlowBulletImpact`]; receivers only ever react to those, so a bullet
//! that already stopped on a wall cannot also hurt the rat.

use crate::constants::{ACID_RADIUS, BULLET_RADIUS, MIN_FLIGHT_TIME};
use crate::damage::{DamageResolver, DamageSource, StrikeReach};
use crate::effects::{DespawnAfter, EffectId, PresentationCue};
use crate::physics_query::{layers, memberships, self_and_ancestors, CollisionIgnores};
use crate::possession::{Possession, Vehicle};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::collections::HashSet;

// ── Components ────────────────────────────────────────────────────────────────

/// Straight, fast bullet (the suit's gun).
#[derive(Component, Debug, Clone)]
pub struct FastProjectile {
    pub damage: u32,
    /// Collision groups this bullet may hit.
    pub hit_mask: Group,
    pub destroy_on_hit: bool,
    consumed: bool,
}

impl FastProjectile {
    pub fn new(damage: u32, hit_mask: Group) -> Self {
        Self {
            damage: damage.max(1),
            hit_mask,
            destroy_on_hit: true,
            consumed: false,
        }
    }

    #[inline]
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

/// Gravity-driven acid blob (the spitter's attack).
#[derive(Component, Debug, Clone)]
pub struct ArcedProjectile {
    pub damage: u32,
    pub hit_mask: Group,
    consumed: bool,
}

impl ArcedProjectile {
    pub fn new(damage: u32, hit_mask: Group) -> Self {
        Self {
            damage: damage.max(1),
            hit_mask,
            consumed: false,
        }
    }

    #[inline]
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

/// Slow horizontal bullet (the gunner's attack); damage is applied by the receiver.
#[derive(Component, Debug, Clone)]
pub struct SlowBullet {
    pub hit_mask: Group,
    pub destroy_on_hit: bool,
    consumed: bool,
}

impl Default for SlowBullet {
    fn default() -> Self {
        Self {
            hit_mask: layers::SOLID | layers::ACTOR,
            destroy_on_hit: true,
            consumed: false,
        }
    }
}

impl SlowBullet {
    #[inline]
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

/// A slow bullet stopped on `target` this frame.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct SlowBulletImpact {
    pub bullet: Entity,
    pub target: Entity,
    pub position: Vec2,
}

/// Initial velocity that carries a body from `start` to `target` in
/// `time_to_target` seconds under vertical acceleration `gravity_y`.
///
/// `t` is clamped to at least `MIN_FLIGHT_TIME` so a zero flight time cannot
/// produce an infinite velocity.
pub fn launch_velocity(start: Vec2, target: Vec2, time_to_target: f32, gravity_y: f32) -> Vec2 {
    let t = time_to_target.max(MIN_FLIGHT_TIME);
    let delta = target - start;
    Vec2::new(delta.x / t, (delta.y - 0.5 * gravity_y * t * t) / t)
}

// ── Spawning ──────────────────────────────────────────────────────────────────

fn projectile_body(radius: f32, membership: Group, filter: Group) -> impl Bundle {
    (
        RigidBody::Dynamic,
        Collider::ball(radius),
        Sensor,
        CollisionGroups::new(membership, filter),
        ActiveEvents::COLLISION_EVENTS,
        LockedAxes::ROTATION_LOCKED,
        Ccd::enabled(),
    )
}

/// Spawn a suit bullet travelling at `velocity`.
pub fn spawn_fast_projectile(
    commands: &mut Commands,
    origin: Vec2,
    velocity: Vec2,
    projectile: FastProjectile,
    expires_at: f32,
) -> Entity {
    let filter = projectile.hit_mask;
    commands
        .spawn((
            projectile,
            DespawnAfter { at: expires_at },
            projectile_body(BULLET_RADIUS, layers::PLAYER_SHOT, filter),
            GravityScale(0.0),
            Velocity::linear(velocity),
            Sprite::from_color(Color::srgb(1.0, 0.9, 0.4), Vec2::splat(BULLET_RADIUS * 2.0)),
            Transform::from_translation(origin.extend(1.0)),
        ))
        .id()
}

/// Spawn a slow bullet moving along `dir_sign` (±1) on the X axis.
pub fn spawn_slow_bullet(
    commands: &mut Commands,
    origin: Vec2,
    dir_sign: f32,
    speed: f32,
    expires_at: f32,
) -> Entity {
    let bullet = SlowBullet::default();
    let filter = bullet.hit_mask;
    commands
        .spawn((
            bullet,
            DespawnAfter { at: expires_at },
            projectile_body(BULLET_RADIUS, layers::ENEMY_SHOT, filter),
            GravityScale(0.0),
            Velocity::linear(Vec2::new(dir_sign.signum() * speed, 0.0)),
            Sprite::from_color(Color::srgb(1.0, 0.35, 0.2), Vec2::splat(BULLET_RADIUS * 2.0)),
            Transform::from_translation(origin.extend(1.0)),
        ))
        .id()
}

/// Spawn an acid blob launched with `velocity` under world gravity.
pub fn spawn_arced_projectile(
    commands: &mut Commands,
    origin: Vec2,
    velocity: Vec2,
    projectile: ArcedProjectile,
    expires_at: f32,
) -> Entity {
    let filter = projectile.hit_mask;
    commands
        .spawn((
            projectile,
            DespawnAfter { at: expires_at },
            projectile_body(ACID_RADIUS, layers::ENEMY_SHOT, filter),
            GravityScale(1.0),
            Velocity::linear(velocity),
            Sprite::from_color(Color::srgb(0.5, 1.0, 0.2), Vec2::splat(ACID_RADIUS * 2.0)),
            Transform::from_translation(origin.extend(1.0)),
        ))
        .id()
}

// ── Hit resolution ────────────────────────────────────────────────────────────

/// Pick the side of a `Started` event that satisfies `is_projectile`.
fn split_event(
    event: &CollisionEvent,
    is_projectile: impl Fn(Entity) -> bool,
) -> Option<(Entity, Entity)> {
    let CollisionEvent::Started(e1, e2, _) = event else {
        return None;
    };
    if is_projectile(*e1) {
        Some((*e1, *e2))
    } else if is_projectile(*e2) {
        Some((*e2, *e1))
    } else {
        None
    }
}

pub fn fast_projectile_hit_system(
    mut collision_events: MessageReader<CollisionEvent>,
    mut projectiles: Query<(&mut FastProjectile, &Transform)>,
    groups: Query<&CollisionGroups>,
    ignores: Res<CollisionIgnores>,
    mut resolver: DamageResolver,
) {
    for event in collision_events.read() {
        let Some((shot, other)) = split_event(event, |e| projectiles.contains(e)) else {
            continue;
        };
        if ignores.is_ignored(shot, other) {
            continue;
        }
        let Ok((mut projectile, transform)) = projectiles.get_mut(shot) else {
            continue;
        };
        if projectile.consumed {
            continue;
        }
        if !memberships(groups.get(other).ok()).intersects(projectile.hit_mask) {
            continue;
        }
        if resolver.is_decorative(other) {
            continue;
        }

        projectile.consumed = true;
        let impact = transform.translation.truncate();
        let damage = projectile.damage;
        let destroy = projectile.destroy_on_hit;

        resolver.strike(other, damage, DamageSource::Projectile, StrikeReach::Any);
        resolver.cue(PresentationCue::Impact {
            position: impact,
            effect: EffectId::BulletSpark,
        });
        if destroy {
            resolver.commands.entity(shot).try_despawn();
        }
    }
}

pub fn arced_projectile_hit_system(
    mut collision_events: MessageReader<CollisionEvent>,
    mut projectiles: Query<(&mut ArcedProjectile, &Transform)>,
    groups: Query<&CollisionGroups>,
    mut resolver: DamageResolver,
) {
    for event in collision_events.read() {
        let Some((acid, other)) = split_event(event, |e| projectiles.contains(e)) else {
            continue;
        };
        let Ok((mut projectile, transform)) = projectiles.get_mut(acid) else {
            continue;
        };
        if projectile.consumed {
            continue;
        }
        if !memberships(groups.get(other).ok()).intersects(projectile.hit_mask) {
            continue;
        }

        projectile.consumed = true;
        let impact = transform.translation.truncate();
        let damage = projectile.damage;

        resolver.strike(other, damage, DamageSource::Projectile, StrikeReach::HealthOnly);
        resolver.cue(PresentationCue::Impact {
            position: impact,
            effect: EffectId::AcidSplash,
        });
        resolver.commands.entity(acid).try_despawn();
    }
}

/// Impact handling for slow bullets; an Empty suit is passed through.
///
/// Events are taken in order and the first qualifying one consumes the
/// bullet; later events for the same bullet in the same frame are dropped.
#[allow(clippy::too_many_arguments)]
pub fn slow_bullet_hit_system(
    mut commands: Commands,
    mut collision_events: MessageReader<CollisionEvent>,
    mut bullets: Query<(&mut SlowBullet, &Transform)>,
    groups: Query<&CollisionGroups>,
    vehicles: Query<&Possession, With<Vehicle>>,
    parents: Query<&ChildOf>,
    sensors: Query<(), With<Sensor>>,
    mut ignores: ResMut<CollisionIgnores>,
    mut cues: MessageWriter<PresentationCue>,
    mut impacts: MessageWriter<SlowBulletImpact>,
) {
    let mut passed: HashSet<(Entity, Entity)> = HashSet::new();

    for event in collision_events.read() {
        let Some((shot, other)) = split_event(event, |e| bullets.contains(e)) else {
            continue;
        };
        if ignores.is_ignored(shot, other) || passed.contains(&(shot, other)) {
            continue;
        }
        let Ok((mut bullet, transform)) = bullets.get_mut(shot) else {
            continue;
        };
        if bullet.consumed {
            continue;
        }
        if !memberships(groups.get(other).ok()).intersects(bullet.hit_mask) {
            continue;
        }

        let chain = self_and_ancestors(other, &parents);
        let empty_suit = chain
            .iter()
            .find_map(|e| vehicles.get(*e).ok())
            .is_some_and(|possession| !possession.is_occupied());
        if empty_suit {
            ignores.ignore_pair(shot, other, true);
            passed.insert((shot, other));
            debug!("[projectile] {:?} passes through empty suit {:?}", shot, other);
            continue;
        }
        if sensors.contains(other) {
            continue;
        }

        bullet.consumed = true;
        let position = transform.translation.truncate();
        impacts.write(SlowBulletImpact {
            bullet: shot,
            target: other,
            position,
        });
        cues.write(PresentationCue::Impact {
            position,
            effect: EffectId::BulletSpark,
        });
        if bullet.destroy_on_hit {
            commands.entity(shot).try_despawn();
        }
    }
}

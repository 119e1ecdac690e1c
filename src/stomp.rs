//! Stomp finisher: the rat landing on an enemy from above.
//!
//! While falling fast enough and not locked out, the rat probes a small
//! circle at its feet against the enemy layer.  A stomp needs the rat's
//! centre to be no lower than the top of the touched collider (less a small
//! margin), so a side contact never counts, and the `Health` holder must
//! accept hits; it then deals stomp damage, bounces the rat and locks further
//! stomps briefly.

use crate::config::GameConfig;
use crate::constants::{ACTOR_COLLIDER_HALF, STOMP_FROM_ABOVE_MARGIN};
use crate::damage::{DamageResolver, DamageSource, StrikeReach};
use crate::physics_query::{layers, PhysicsQuery, RapierQuery};
use crate::possession::{FreeActor, Inactive};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

#[derive(Component, Debug, Clone)]
pub struct StompFinisher {
    /// Probe centre relative to the body origin.
    pub offset: Vec2,
    pub radius: f32,
    pub min_fall_speed: f32,
    pub bounce_y: f32,
    pub damage: u32,
    pub lock_time: f32,
    pub from_above_margin: f32,
    locked_until: f32,
}

impl StompFinisher {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            offset: Vec2::new(0.0, -ACTOR_COLLIDER_HALF.1),
            radius: config.stomp_radius,
            min_fall_speed: config.stomp_min_fall_speed,
            bounce_y: config.stomp_bounce_y,
            damage: config.stomp_damage,
            lock_time: config.stomp_lock_time,
            from_above_margin: STOMP_FROM_ABOVE_MARGIN,
            locked_until: f32::NEG_INFINITY,
        }
    }

    /// Falling and not locked out.
    pub fn armed(&self, now: f32, velocity_y: f32) -> bool {
        velocity_y <= self.min_fall_speed && now >= self.locked_until
    }

    /// `enemy_top` is the upper edge of the touched collider.
    pub fn from_above(&self, actor_y: f32, enemy_top: f32) -> bool {
        actor_y >= enemy_top - self.from_above_margin
    }

    /// Bounce and lock.  Returns the new vertical velocity.
    pub fn land(&mut self, now: f32) -> f32 {
        self.locked_until = now + self.lock_time;
        self.bounce_y
    }

    #[inline]
    pub fn locked_until(&self) -> f32 {
        self.locked_until
    }
}

/// Outcome of one stomp probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StompCheck {
    NotArmed,
    NothingBelow,
    NotFromAbove,
    Refused,
    Landed(Entity),
}

/// Half height of a collider's local bounds; unknown shapes count as flat.
pub fn collider_half_height(collider: &Collider) -> f32 {
    if let Some(cuboid) = collider.as_cuboid() {
        cuboid.half_extents().y
    } else if let Some(ball) = collider.as_ball() {
        ball.radius()
    } else if let Some(capsule) = collider.as_capsule() {
        capsule.half_height() + capsule.radius()
    } else {
        0.0
    }
}

/// Everything except the damage itself, over a [`PhysicsQuery`].
///
/// `holder_of` maps the touched collider to its `Health` holder and the
/// collider's top edge.
pub fn probe_stomp<P: PhysicsQuery + ?Sized>(
    finisher: &StompFinisher,
    physics: &P,
    now: f32,
    actor: Vec2,
    velocity_y: f32,
    holder_of: impl Fn(Entity) -> Option<(Entity, f32)>,
    can_be_hit: impl Fn(Entity) -> bool,
) -> StompCheck {
    if !finisher.armed(now, velocity_y) {
        return StompCheck::NotArmed;
    }
    let Some(hit) = physics.overlap_circle(actor + finisher.offset, finisher.radius, layers::ENEMY)
    else {
        return StompCheck::NothingBelow;
    };
    let Some((holder, enemy_top)) = holder_of(hit) else {
        return StompCheck::NothingBelow;
    };
    if !finisher.from_above(actor.y, enemy_top) {
        return StompCheck::NotFromAbove;
    }
    if !can_be_hit(holder) {
        return StompCheck::Refused;
    }
    StompCheck::Landed(holder)
}

pub fn stomp_system(
    mut actors: Query<
        (&Transform, &mut Velocity, &mut StompFinisher),
        (With<FreeActor>, Without<Inactive>),
    >,
    colliders: Query<(&GlobalTransform, Option<&Collider>)>,
    rapier_context: ReadRapierContext,
    mut resolver: DamageResolver,
) {
    let Ok(rapier) = rapier_context.single() else {
        return;
    };
    let physics = RapierQuery::new(&rapier);
    let now = resolver.now();

    for (transform, mut velocity, mut finisher) in actors.iter_mut() {
        let check = probe_stomp(
            &finisher,
            &physics,
            now,
            transform.translation.truncate(),
            velocity.linvel.y,
            |hit| {
                let holder = resolver.health_holder(hit)?;
                let (at, collider) = colliders.get(hit).ok()?;
                let top = at.translation().y + collider.map_or(0.0, collider_half_height);
                Some((holder, top))
            },
            |holder| resolver.health_can_be_hit(holder),
        );

        if let StompCheck::Landed(holder) = check {
            let damage = finisher.damage;
            resolver.strike(holder, damage, DamageSource::Stomp, StrikeReach::HealthOnly);
            velocity.linvel.y = finisher.land(now);
            debug!("[stomp] landed on {:?}", holder);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::senses::scripted::ScriptedScene;

    fn finisher() -> StompFinisher {
        StompFinisher::from_config(&GameConfig::default())
    }

    fn enemy() -> Entity {
        World::new().spawn_empty().id()
    }

    #[test]
    fn requires_falling_and_no_lock() {
        let mut f = finisher();
        assert!(!f.armed(0.0, 0.0));
        assert!(f.armed(0.0, -3.0));
        let bounce = f.land(1.0);
        assert_eq!(bounce, f.bounce_y);
        assert!(!f.armed(1.0 + f.lock_time * 0.5, -3.0));
        assert!(f.armed(1.0 + f.lock_time, -3.0));
    }

    #[test]
    fn lands_only_from_above_on_hittable_health() {
        let f = finisher();
        let spitter = enemy();
        let scene = ScriptedScene {
            overlap: Some(spitter),
            ..Default::default()
        };
        // Spitter centred at 0.0 with a 0.3 half height.
        let holder = |_: Entity| Some((spitter, 0.3));

        let above = probe_stomp(&f, &scene, 0.0, Vec2::new(0.0, 0.6), -4.0, holder, |_| true);
        assert_eq!(above, StompCheck::Landed(spitter));

        let beside = probe_stomp(&f, &scene, 0.0, Vec2::new(0.0, 0.0), -4.0, holder, |_| true);
        assert_eq!(beside, StompCheck::NotFromAbove);

        let invulnerable = probe_stomp(&f, &scene, 0.0, Vec2::new(0.0, 0.6), -4.0, holder, |_| false);
        assert_eq!(invulnerable, StompCheck::Refused);
    }

    #[test]
    fn enemy_without_health_is_not_stomped() {
        let f = finisher();
        let scene = ScriptedScene {
            overlap: Some(enemy()),
            ..Default::default()
        };
        let check = probe_stomp(&f, &scene, 0.0, Vec2::Y, -4.0, |_| None, |_| true);
        assert_eq!(check, StompCheck::NothingBelow);

        let rising = probe_stomp(&f, &scene, 0.0, Vec2::Y, 2.0, |_| None, |_| true);
        assert_eq!(rising, StompCheck::NotArmed);
    }

    #[test]
    fn side_contact_near_enemy_top_is_not_a_stomp() {
        let f = finisher();
        let spitter = enemy();
        let scene = ScriptedScene {
            overlap: Some(spitter),
            ..Default::default()
        };
        let half = collider_half_height(&Collider::cuboid(0.3, 0.3));
        let holder = |_: Entity| Some((spitter, half));

        // Level with the upper half of the body.
        let level = probe_stomp(&f, &scene, 0.0, Vec2::new(0.4, 0.15), -4.0, holder, |_| true);
        assert_eq!(level, StompCheck::NotFromAbove);
        let just_short = half - f.from_above_margin - 0.01;
        let short = probe_stomp(&f, &scene, 0.0, Vec2::new(0.0, just_short), -4.0, holder, |_| true);
        assert_eq!(short, StompCheck::NotFromAbove);
        let on_top = probe_stomp(&f, &scene, 0.0, Vec2::new(0.0, half), -4.0, holder, |_| true);
        assert_eq!(on_top, StompCheck::Landed(spitter));
    }

    #[test]
    fn half_height_follows_collider_shape() {
        assert_eq!(collider_half_height(&Collider::cuboid(0.3, 0.5)), 0.5);
        assert_eq!(collider_half_height(&Collider::ball(0.4)), 0.4);
        assert_eq!(collider_half_height(&Collider::capsule_y(0.25, 0.25)), 0.5);
    }
}

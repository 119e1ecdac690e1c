//! Damage resolution shared by every damage source.
//!
//! [`DamageResolver`] is the single place where a hit turns into hit-point
//! changes.  Given the collider a source touched, it walks the collider's
//! ancestor chain and:
//!
//! 1. applies the **occupancy gate**: if the chain contains a suit whose
//!    [`Possession`] is Empty, the hit is refused (an empty suit is scenery);
//! 2. finds the first [`Health`] and the first [`EnemyHealth`] on the chain,
//!    independently, and applies the hit to each one present;
//! 3. produces the side effects of each landed hit (flash, hit/death cues,
//!    delayed removal) and records a [`DamageDealt`] message.
//!
//! Projectiles, contact emitters, the stomp finisher and the enemy-bullet
//! bridge all go through it, so the occupancy rule exists exactly once.

use crate::config::GameConfig;
use crate::effects::{DespawnAfter, PresentationCue, SoundCue};
use crate::health::{Damageable, DeathStyle, EnemyHealth, FlashStyle, Health, HitFlash, HitOutcome};
use crate::physics_query::self_and_ancestors;
use crate::possession::{Possession, Vehicle};
use crate::projectile::SlowBulletImpact;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::collections::HashSet;

/// What kind of source produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Projectile,
    Contact,
    Stomp,
}

/// A hit that landed on a damageable component this frame.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct DamageDealt {
    pub target: Entity,
    pub amount: u32,
    pub source: DamageSource,
    pub outcome: HitOutcome,
}

/// Which damageable kinds a strike may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeReach {
    /// `Health` and `EnemyHealth`, each applied independently.
    Any,
    /// `Health` only.
    HealthOnly,
}

/// Everything a damage source needs to land a hit.
#[derive(SystemParam)]
pub struct DamageResolver<'w, 's> {
    pub commands: Commands<'w, 's>,
    cues: MessageWriter<'w, PresentationCue>,
    dealt: MessageWriter<'w, DamageDealt>,
    parents: Query<'w, 's, &'static ChildOf>,
    health: Query<'w, 's, (&'static mut Health, Option<&'static Transform>)>,
    enemy_health: Query<'w, 's, (&'static mut EnemyHealth, Option<&'static Transform>)>,
    vehicles: Query<'w, 's, &'static Possession, With<Vehicle>>,
    sensors: Query<'w, 's, (), With<Sensor>>,
    time: Res<'w, Time>,
    config: Res<'w, GameConfig>,
}

impl DamageResolver<'_, '_> {
    #[inline]
    pub fn now(&self) -> f32 {
        self.time.elapsed_secs()
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn cue(&mut self, cue: PresentationCue) {
        self.cues.write(cue);
    }

    pub fn chain(&self, entity: Entity) -> Vec<Entity> {
        self_and_ancestors(entity, &self.parents)
    }

    /// First suit on the chain and its possession state.
    pub fn vehicle_in_chain(&self, entity: Entity) -> Option<(Entity, &Possession)> {
        self.chain(entity)
            .into_iter()
            .find_map(|e| self.vehicles.get(e).ok().map(|p| (e, p)))
    }

    /// Occupancy gate: false when the chain contains an Empty suit.
    pub fn occupancy_allows(&self, entity: Entity) -> bool {
        self.vehicle_in_chain(entity)
            .is_none_or(|(_, possession)| possession.is_occupied())
    }

    pub fn has_damageable(&self, entity: Entity) -> bool {
        self.chain(entity)
            .into_iter()
            .any(|e| self.health.contains(e) || self.enemy_health.contains(e))
    }

    /// A sensor with nothing damageable on its chain (scenery trigger).
    pub fn is_decorative(&self, entity: Entity) -> bool {
        self.sensors.contains(entity) && !self.has_damageable(entity)
    }

    /// First `Health` holder on the chain.
    pub fn health_holder(&self, entity: Entity) -> Option<Entity> {
        self.chain(entity)
            .into_iter()
            .find(|e| self.health.contains(*e))
    }

    pub fn health_can_be_hit(&self, entity: Entity) -> bool {
        let now = self.now();
        self.health_holder(entity)
            .and_then(|holder| self.health.get(holder).ok())
            .is_some_and(|(health, _)| health.can_be_hit(now))
    }

    /// Gate, then apply `amount` to the damageables reachable from `entity`.
    /// Returns true if any hit landed.
    pub fn strike(
        &mut self,
        entity: Entity,
        amount: u32,
        source: DamageSource,
        reach: StrikeReach,
    ) -> bool {
        if !self.occupancy_allows(entity) {
            debug!("[damage] {:?} refused: empty suit", entity);
            return false;
        }

        let chain = self.chain(entity);
        let mut landed = false;

        if let Some(holder) = chain.iter().copied().find(|e| self.health.contains(*e)) {
            landed |= self.apply_health(holder, amount, source);
        }
        if reach == StrikeReach::Any {
            if let Some(holder) = chain.iter().copied().find(|e| self.enemy_health.contains(*e)) {
                landed |= self.apply_enemy_health(holder, amount, source);
            }
        }
        landed
    }

    fn apply_health(&mut self, holder: Entity, amount: u32, source: DamageSource) -> bool {
        let now = self.now();
        let Ok((mut health, transform)) = self.health.get_mut(holder) else {
            return false;
        };
        let outcome = health.apply_hit(amount, now);
        let flash = health.flash_style();
        let death = health.death_style();
        let position = transform.map(|t| t.translation.truncate()).unwrap_or_default();
        self.after_hit(holder, position, amount, source, outcome, flash, death)
    }

    fn apply_enemy_health(&mut self, holder: Entity, amount: u32, source: DamageSource) -> bool {
        let now = self.now();
        let Ok((mut health, transform)) = self.enemy_health.get_mut(holder) else {
            return false;
        };
        let outcome = health.apply_hit(amount, now);
        let flash = health.flash_style();
        let death = health.death_style();
        let position = transform.map(|t| t.translation.truncate()).unwrap_or_default();
        self.after_hit(holder, position, amount, source, outcome, flash, death)
    }

    #[allow(clippy::too_many_arguments)]
    fn after_hit(
        &mut self,
        target: Entity,
        position: Vec2,
        amount: u32,
        source: DamageSource,
        outcome: HitOutcome,
        flash: FlashStyle,
        death: DeathStyle,
    ) -> bool {
        if !outcome.landed() {
            return false;
        }

        let now = self.now();
        let mut rng = rand::thread_rng();
        self.dealt.write(DamageDealt {
            target,
            amount: amount.max(1),
            source,
            outcome,
        });
        self.cues
            .write(PresentationCue::sound(SoundCue::Hit, &self.config, &mut rng));

        match outcome {
            HitOutcome::Damaged { remaining } => {
                debug!("[damage] {:?} hit by {:?}, {} hp left", target, source, remaining);
                self.commands
                    .entity(target)
                    .try_insert(HitFlash::new(now, flash));
                self.cues.write(PresentationCue::FlashStart {
                    entity: target,
                    color: flash.color,
                    count: flash.count,
                    interval: flash.interval,
                });
            }
            HitOutcome::Killed => {
                info!("[damage] {:?} killed by {:?}", target, source);
                self.cues.write(PresentationCue::DeathEffect {
                    position,
                    effect: death.effect,
                });
                self.cues
                    .write(PresentationCue::sound(SoundCue::Death, &self.config, &mut rng));
                // A suit always lingers for one despawn pass so its occupant
                // can be ejected first.
                if death.grace > 0.0 || self.vehicles.contains(target) {
                    self.commands.entity(target).try_insert(DespawnAfter {
                        at: now + death.grace,
                    });
                } else {
                    self.commands.entity(target).try_despawn();
                }
            }
            HitOutcome::Ignored => {}
        }
        true
    }
}

// ── Enemy-bullet bridge ───────────────────────────────────────────────────────

/// Receiver side of slow enemy bullets: a [`SlowBulletImpact`] on the
/// holder's chain costs the holder `damage`, subject to the occupancy gate.
#[derive(Component, Debug, Clone, Copy)]
pub struct EnemyBulletReceiver {
    pub damage: u32,
}

/// Runs after `slow_bullet_hit_system`, which decides what stopped each bullet.
pub fn enemy_bullet_receiver_system(
    mut impacts: MessageReader<SlowBulletImpact>,
    receivers: Query<&EnemyBulletReceiver>,
    mut resolver: DamageResolver,
) {
    let mut processed: HashSet<(Entity, Entity)> = HashSet::new();

    for impact in impacts.read() {
        let Some((holder, receiver)) = resolver
            .chain(impact.target)
            .into_iter()
            .find_map(|e| receivers.get(e).ok().map(|r| (e, *r)))
        else {
            continue;
        };

        if !processed.insert((impact.bullet, holder)) {
            continue;
        }

        resolver.strike(
            holder,
            receiver.damage,
            DamageSource::Projectile,
            StrikeReach::HealthOnly,
        );
    }
}

/// Trace landed hits.
pub fn log_damage_system(mut dealt: MessageReader<DamageDealt>) {
    for hit in dealt.read() {
        debug!(
            "[damage] {:?} -{} ({:?}) → {:?}",
            hit.target, hit.amount, hit.source, hit.outcome
        );
    }
}

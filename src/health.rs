//! Hit points, invulnerability windows and hit flashes.
//!
//! Two damageable kinds exist side by side:
//!
//! | Component | Used by | Invulnerability | Removal on death |
//! |-----------|---------|-----------------|------------------|
//! | [`Health`] | rat, suit, spitter | `flash_count × flash_interval × 2 + extra` after each hit | after `death_grace` |
//! | [`EnemyHealth`] | gunner | none | immediate |
//!
//! Both implement [`Damageable`], which is the only surface damage sources
//! talk to.  The side effects of a hit (flash, cues, removal) are applied by
//! [`crate::damage::DamageResolver`] so every source produces them identically.
//!
//! ## Hit flash
//!
//! [`HitFlash`] is a state object polled every frame by [`hit_flash_system`]:
//! it overrides the entity's `Sprite` colour on even half-cycles and restores
//! the baseline colour on odd ones.  Inserting a new `HitFlash` replaces the
//! running one (the newer hit wins); the baseline colour captured by the first
//! flash is kept in [`FlashBaseline`] until the sequence ends, so replacement
//! never bakes the flash colour into the sprite.

use crate::config::GameConfig;
use crate::effects::EffectId;
use bevy::prelude::*;

/// Visual parameters of a hit flash.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlashStyle {
    pub color: Color,
    pub count: u32,
    pub interval: f32,
}

impl FlashStyle {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            color: Color::srgba(1.0, 1.0, 1.0, config.flash_alpha),
            count: config.flash_count,
            interval: config.flash_interval,
        }
    }

    /// Total length of the on/off sequence.
    #[inline]
    pub fn total_duration(&self) -> f32 {
        self.count as f32 * self.interval * 2.0
    }
}

/// What happens when a damageable entity dies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathStyle {
    pub effect: EffectId,
    /// Seconds between death and despawn; `0.0` removes the entity immediately.
    pub grace: f32,
}

/// Spawn-time parameters of a [`Health`] component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthTuning {
    pub max_hp: u32,
    pub flash: FlashStyle,
    pub extra_invuln: f32,
    pub death: DeathStyle,
}

impl HealthTuning {
    pub fn actor(config: &GameConfig) -> Self {
        Self {
            max_hp: config.actor_max_hp,
            flash: FlashStyle::from_config(config),
            extra_invuln: config.actor_extra_invuln,
            death: DeathStyle {
                effect: EffectId::ActorDeath,
                grace: config.actor_death_grace,
            },
        }
    }

    pub fn suit(config: &GameConfig) -> Self {
        Self {
            max_hp: config.suit_max_hp,
            flash: FlashStyle::from_config(config),
            extra_invuln: config.suit_extra_invuln,
            death: DeathStyle {
                effect: EffectId::ActorDeath,
                grace: config.actor_death_grace,
            },
        }
    }

    pub fn spitter(config: &GameConfig) -> Self {
        Self {
            max_hp: config.spitter_max_hp,
            flash: FlashStyle::from_config(config),
            extra_invuln: crate::constants::SPITTER_EXTRA_INVULN,
            death: DeathStyle {
                effect: EffectId::SpitterDeath,
                grace: crate::constants::SPITTER_DEATH_GRACE,
            },
        }
    }

    /// Invulnerability after a hit; never shorter than the flash so a
    /// flashing actor cannot be hit.
    #[inline]
    pub fn invulnerability_duration(&self) -> f32 {
        self.flash.total_duration() + self.extra_invuln.max(0.0)
    }
}

/// Result of a single damage application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Dead or invulnerable; nothing changed.
    Ignored,
    Damaged { remaining: u32 },
    /// This hit transitioned the holder to dead.
    Killed,
}

impl HitOutcome {
    #[inline]
    pub fn landed(self) -> bool {
        !matches!(self, HitOutcome::Ignored)
    }
}

/// Capability shared by every component that can receive damage.
pub trait Damageable {
    /// Apply `amount` (clamped to at least 1) at simulation time `now`.
    fn apply_hit(&mut self, amount: u32, now: f32) -> HitOutcome;

    fn can_be_hit(&self, now: f32) -> bool;

    fn is_dead(&self) -> bool;

    fn flash_style(&self) -> FlashStyle;

    fn death_style(&self) -> DeathStyle;
}

// ── Health ────────────────────────────────────────────────────────────────────

/// Hit points with a flash-synchronised invulnerability window.
#[derive(Component, Debug, Clone)]
pub struct Health {
    hp: u32,
    max_hp: u32,
    invulnerable_until: f32,
    dead: bool,
    tuning: HealthTuning,
}

impl Health {
    pub fn new(tuning: HealthTuning) -> Self {
        let max_hp = tuning.max_hp.max(1);
        Self {
            hp: max_hp,
            max_hp,
            invulnerable_until: f32::NEG_INFINITY,
            dead: false,
            tuning,
        }
    }

    #[inline]
    pub fn hp(&self) -> u32 {
        self.hp
    }

    #[inline]
    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    #[inline]
    pub fn invulnerable_until(&self) -> f32 {
        self.invulnerable_until
    }

    #[inline]
    pub fn tuning(&self) -> &HealthTuning {
        &self.tuning
    }

    /// Apply damage unless dead or inside the invulnerability window.
    pub fn take_damage(&mut self, amount: u32, now: f32) -> HitOutcome {
        if self.dead || now < self.invulnerable_until {
            return HitOutcome::Ignored;
        }

        self.hp = self.hp.saturating_sub(amount.max(1));
        self.invulnerable_until = now + self.tuning.invulnerability_duration();

        if self.hp == 0 {
            self.dead = true;
            HitOutcome::Killed
        } else {
            HitOutcome::Damaged { remaining: self.hp }
        }
    }
}

impl Damageable for Health {
    fn apply_hit(&mut self, amount: u32, now: f32) -> HitOutcome {
        self.take_damage(amount, now)
    }

    fn can_be_hit(&self, now: f32) -> bool {
        !self.dead && now >= self.invulnerable_until
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn flash_style(&self) -> FlashStyle {
        self.tuning.flash
    }

    fn death_style(&self) -> DeathStyle {
        self.tuning.death
    }
}

// ── EnemyHealth ───────────────────────────────────────────────────────────────

/// General enemy hit points: every hit lands, death removes the entity at once.
#[derive(Component, Debug, Clone)]
pub struct EnemyHealth {
    hp: u32,
    max_hp: u32,
    dead: bool,
    flash: FlashStyle,
}

impl EnemyHealth {
    pub fn new(max_hp: u32, flash: FlashStyle) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            hp: max_hp,
            max_hp,
            dead: false,
            flash,
        }
    }

    #[inline]
    pub fn hp(&self) -> u32 {
        self.hp
    }

    #[inline]
    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn take_hit(&mut self, amount: u32) -> HitOutcome {
        if self.dead {
            return HitOutcome::Ignored;
        }
        self.hp = self.hp.saturating_sub(amount.max(1));
        if self.hp == 0 {
            self.dead = true;
            HitOutcome::Killed
        } else {
            HitOutcome::Damaged { remaining: self.hp }
        }
    }
}

impl Damageable for EnemyHealth {
    fn apply_hit(&mut self, amount: u32, _now: f32) -> HitOutcome {
        self.take_hit(amount)
    }

    fn can_be_hit(&self, _now: f32) -> bool {
        !self.dead
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn flash_style(&self) -> FlashStyle {
        self.flash
    }

    fn death_style(&self) -> DeathStyle {
        DeathStyle {
            effect: EffectId::EnemyDeath,
            grace: 0.0,
        }
    }
}

// ── Hit flash ─────────────────────────────────────────────────────────────────

/// Phase of a running flash at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashPhase {
    On,
    Off,
    Done,
}

/// Running flash sequence; replace the component to restart it.
#[derive(Component, Debug, Clone, Copy)]
pub struct HitFlash {
    pub started_at: f32,
    pub style: FlashStyle,
}

impl HitFlash {
    pub fn new(now: f32, style: FlashStyle) -> Self {
        Self {
            started_at: now,
            style,
        }
    }

    pub fn phase(&self, now: f32) -> FlashPhase {
        let elapsed = now - self.started_at;
        if self.style.count == 0 || self.style.interval <= 0.0 {
            return FlashPhase::Done;
        }
        if elapsed >= self.style.total_duration() {
            return FlashPhase::Done;
        }
        let half_cycle = (elapsed.max(0.0) / self.style.interval).floor() as u32;
        if half_cycle % 2 == 0 {
            FlashPhase::On
        } else {
            FlashPhase::Off
        }
    }
}

/// Sprite colour before the current flash sequence began.
#[derive(Component, Debug, Clone, Copy)]
pub struct FlashBaseline(pub Color);

/// Advance every running [`HitFlash`], restoring the baseline colour when the
/// sequence ends or its holder dies.
#[allow(clippy::type_complexity)]
pub fn hit_flash_system(
    mut commands: Commands,
    mut q: Query<(
        Entity,
        &HitFlash,
        Option<&mut Sprite>,
        Option<&FlashBaseline>,
        Option<&Health>,
    )>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();
    for (entity, flash, sprite, baseline, health) in q.iter_mut() {
        let dead = health.is_some_and(|h| h.is_dead());
        let phase = if dead {
            FlashPhase::Done
        } else {
            flash.phase(now)
        };

        let Some(mut sprite) = sprite else {
            if phase == FlashPhase::Done {
                commands.entity(entity).try_remove::<HitFlash>();
            }
            continue;
        };

        let base = match baseline {
            Some(b) => b.0,
            None => {
                let color = sprite.color;
                commands.entity(entity).try_insert(FlashBaseline(color));
                color
            }
        };

        match phase {
            FlashPhase::On => sprite.color = flash.style.color,
            FlashPhase::Off => sprite.color = base,
            FlashPhase::Done => {
                sprite.color = base;
                commands
                    .entity(entity)
                    .try_remove::<(HitFlash, FlashBaseline)>();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning(max_hp: u32, extra: f32) -> HealthTuning {
        HealthTuning {
            max_hp,
            flash: FlashStyle {
                color: Color::WHITE,
                count: 3,
                interval: 0.06,
            },
            extra_invuln: extra,
            death: DeathStyle {
                effect: EffectId::ActorDeath,
                grace: 0.1,
            },
        }
    }

    #[test]
    fn invulnerability_covers_the_whole_flash() {
        let t = tuning(3, 0.0);
        assert!((t.invulnerability_duration() - 0.36).abs() < 1e-6);
        let t = tuning(3, 0.24);
        assert!((t.invulnerability_duration() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn negative_extra_grace_never_shortens_the_window() {
        let t = tuning(3, -5.0);
        assert!((t.invulnerability_duration() - 0.36).abs() < 1e-6);
    }

    #[test]
    fn hits_inside_window_are_ignored_and_at_window_end_land() {
        let mut h = Health::new(tuning(3, 0.0));
        assert_eq!(h.take_damage(1, 1.0), HitOutcome::Damaged { remaining: 2 });
        let until = h.invulnerable_until();

        assert_eq!(h.take_damage(1, 1.2), HitOutcome::Ignored);
        assert_eq!(h.hp(), 2);

        assert_eq!(h.take_damage(1, until), HitOutcome::Damaged { remaining: 1 });
    }

    #[test]
    fn can_be_hit_tracks_window_and_death() {
        let mut h = Health::new(tuning(1, 0.0));
        assert!(h.can_be_hit(0.0));
        assert_eq!(h.take_damage(1, 2.0), HitOutcome::Killed);
        assert!(!h.can_be_hit(2.1));
        assert!(!h.can_be_hit(100.0));

        let mut h = Health::new(tuning(5, 0.0));
        h.take_damage(1, 2.0);
        assert!(!h.can_be_hit(2.0));
        assert!(!h.can_be_hit(h.invulnerable_until() - 0.001));
        assert!(h.can_be_hit(h.invulnerable_until()));
    }

    #[test]
    fn zero_damage_is_clamped_to_one() {
        let mut h = Health::new(tuning(3, 0.0));
        assert_eq!(h.take_damage(0, 0.0), HitOutcome::Damaged { remaining: 2 });
    }

    #[test]
    fn death_is_reported_exactly_once() {
        let mut h = Health::new(tuning(2, 0.0));
        assert_eq!(h.take_damage(5, 0.0), HitOutcome::Killed);
        assert_eq!(h.hp(), 0);
        for i in 1..10 {
            assert_eq!(h.take_damage(1, i as f32), HitOutcome::Ignored);
        }
        assert!(h.is_dead());
    }

    #[test]
    fn hp_is_non_increasing_and_bounded_over_any_sequence() {
        let mut h = Health::new(tuning(7, 0.05));
        let mut last = h.hp();
        let mut now = 0.0;
        for step in 0..200u32 {
            now += 0.013 * ((step % 5) as f32 + 1.0);
            h.take_damage(step % 3, now);
            assert!(h.hp() <= last);
            assert!(h.hp() <= h.max_hp());
            last = h.hp();
        }
    }

    #[test]
    fn invulnerable_until_never_decreases() {
        let mut h = Health::new(tuning(50, 0.0));
        let mut prev = h.invulnerable_until();
        for i in 0..40 {
            h.take_damage(1, i as f32 * 0.1);
            assert!(h.invulnerable_until() >= prev);
            prev = h.invulnerable_until();
        }
    }

    #[test]
    fn zero_max_hp_is_promoted_to_one() {
        let h = Health::new(tuning(0, 0.0));
        assert_eq!(h.max_hp(), 1);
        assert_eq!(h.hp(), 1);
    }

    #[test]
    fn enemy_health_has_no_invulnerability() {
        let mut e = EnemyHealth::new(3, tuning(3, 0.0).flash);
        assert!(e.take_hit(1).landed());
        assert!(e.take_hit(1).landed());
        assert_eq!(e.take_hit(1), HitOutcome::Killed);
        assert_eq!(e.take_hit(1), HitOutcome::Ignored);
        assert!(!e.can_be_hit(0.0));
    }

    #[test]
    fn flash_alternates_then_finishes() {
        let flash = HitFlash::new(1.0, tuning(1, 0.0).flash);
        assert_eq!(flash.phase(1.0), FlashPhase::On);
        assert_eq!(flash.phase(1.07), FlashPhase::Off);
        assert_eq!(flash.phase(1.13), FlashPhase::On);
        assert_eq!(flash.phase(1.35), FlashPhase::Off);
        assert_eq!(flash.phase(1.37), FlashPhase::Done);
    }

    #[test]
    fn flash_system_restores_baseline_when_done() {
        use bevy::time::TimeUpdateStrategy;
        use std::time::Duration;

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(50)));
        app.add_systems(Update, hit_flash_system);

        let base = Color::srgb(0.2, 0.6, 0.2);
        let style = tuning(1, 0.0).flash;
        let entity = app
            .world_mut()
            .spawn((Sprite::from_color(base, Vec2::ONE), HitFlash::new(0.0, style)))
            .id();

        app.update(); // t = 0.0 → On
        assert_eq!(app.world().get::<Sprite>(entity).unwrap().color, style.color);

        for _ in 0..10 {
            app.update();
        }
        assert_eq!(app.world().get::<Sprite>(entity).unwrap().color, base);
        assert!(app.world().get::<HitFlash>(entity).is_none());
        assert!(app.world().get::<FlashBaseline>(entity).is_none());
    }
}

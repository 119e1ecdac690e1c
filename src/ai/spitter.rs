//! Spitter: a hopping enemy that lobs acid at its target.
//!
//! The state is re-evaluated every frame (`Alert` while an active target is
//! within `detect_range`, with sight when required; `Patrol` otherwise), but
//! the spitter only *acts* on a fixed cadence:
//!
//! - **Patrol action** (every `patrol_interval`): when grounded, turn around at
//!   a ledge or hop forward.
//! - **Alert action** (every `alert_interval`): when grounded, face the
//!   target; at a ledge with the target inside `spit_only_range` it only
//!   spits, otherwise it may spit (`spit_chance`), turns at ledges, or hops.
//!
//! A spit snapshots the target position, plays its cue right away and leaves
//! a [`PendingSpit`]; [`spitter_spit_system`] launches the acid on the
//! closed-form arc once the windup elapses.

use crate::config::GameConfig;
use crate::constants::{
    SPITTER_ALERT_JUMP, SPITTER_GROUND_CHECK_OFFSET, SPITTER_GROUND_RADIUS, SPITTER_LEDGE_DOWN,
    SPITTER_LEDGE_FORWARD, SPITTER_LEDGE_OFFSET, SPITTER_PATROL_JUMP, SPITTER_SPIT_OFFSET,
};
use crate::control::Facing;
use crate::effects::{PresentationCue, SoundCue};
use crate::health::{Damageable, Health};
use crate::physics_query::{layers, RapierQuery};
use crate::projectile::{launch_velocity, spawn_arced_projectile, ArcedProjectile};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;

use super::senses::{ground_ahead, is_grounded, sees_first_hit};
use super::targeting::TargetView;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpitterTuning {
    pub detect_range: f32,
    pub require_los: bool,
    pub patrol_interval: f32,
    pub alert_interval: f32,
    /// (horizontal, vertical) hop velocity; x is mirrored by facing.
    pub patrol_jump: Vec2,
    pub alert_jump: Vec2,
    pub spit_cooldown: f32,
    pub spit_chance: f32,
    pub spit_windup: f32,
    pub flight_time: f32,
    pub spit_only_range: f32,
    /// `None` disables spitting.
    pub spit_offset: Option<Vec2>,
    /// `None` means always grounded.
    pub ground_check_offset: Option<Vec2>,
    pub ground_radius: f32,
    pub ledge_offset: Vec2,
    pub ledge_forward: f32,
    pub ledge_down: f32,
}

impl SpitterTuning {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            detect_range: config.spitter_detect_range,
            require_los: config.spitter_require_los,
            patrol_interval: config.spitter_patrol_interval,
            alert_interval: config.spitter_alert_interval,
            patrol_jump: Vec2::from(SPITTER_PATROL_JUMP),
            alert_jump: Vec2::from(SPITTER_ALERT_JUMP),
            spit_cooldown: config.spitter_spit_cooldown,
            spit_chance: config.spitter_spit_chance,
            spit_windup: config.spitter_spit_windup,
            flight_time: config.spitter_acid_flight_time,
            spit_only_range: config.spitter_spit_only_range,
            spit_offset: Some(Vec2::from(SPITTER_SPIT_OFFSET)),
            ground_check_offset: Some(Vec2::from(SPITTER_GROUND_CHECK_OFFSET)),
            ground_radius: SPITTER_GROUND_RADIUS,
            ledge_offset: Vec2::from(SPITTER_LEDGE_OFFSET),
            ledge_forward: SPITTER_LEDGE_FORWARD,
            ledge_down: SPITTER_LEDGE_DOWN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpitterState {
    Patrol,
    Alert,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpitterTarget {
    pub position: Vec2,
    pub distance: f32,
    pub line_of_sight: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpitterSenses {
    pub target: Option<SpitterTarget>,
    pub grounded: bool,
    pub ground_left: bool,
    pub ground_right: bool,
}

impl SpitterSenses {
    fn ground_toward(&self, dir: f32) -> bool {
        if dir < 0.0 {
            self.ground_left
        } else {
            self.ground_right
        }
    }
}

/// Acid waiting for its windup; the target position is frozen at decision time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSpit {
    pub fire_at: f32,
    pub target: Vec2,
}

/// What an action step decided.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpitterActions {
    /// Full velocity to apply for a hop.
    pub jump: Option<Vec2>,
    pub spat: bool,
}

#[derive(Component, Debug, Clone)]
pub struct SpitterBrain {
    tuning: SpitterTuning,
    state: SpitterState,
    facing: f32,
    next_action_at: f32,
    next_spit_at: f32,
    pending: Option<PendingSpit>,
}

impl SpitterBrain {
    pub fn new(tuning: SpitterTuning, facing: f32, now: f32) -> Self {
        Self {
            tuning,
            state: SpitterState::Patrol,
            facing: if facing < 0.0 { -1.0 } else { 1.0 },
            next_action_at: now + tuning.patrol_interval,
            next_spit_at: f32::NEG_INFINITY,
            pending: None,
        }
    }

    #[inline]
    pub fn state(&self) -> SpitterState {
        self.state
    }

    #[inline]
    pub fn facing(&self) -> f32 {
        self.facing
    }

    #[inline]
    pub fn next_action_at(&self) -> f32 {
        self.next_action_at
    }

    #[inline]
    pub fn pending_spit(&self) -> Option<PendingSpit> {
        self.pending
    }

    #[inline]
    pub fn tuning(&self) -> &SpitterTuning {
        &self.tuning
    }

    pub fn tick(
        &mut self,
        now: f32,
        own: Vec2,
        senses: &SpitterSenses,
        rng: &mut impl Rng,
    ) -> SpitterActions {
        let t = &self.tuning;
        let alert = senses
            .target
            .is_some_and(|target| target.distance <= t.detect_range && (!t.require_los || target.line_of_sight));
        let state = if alert {
            SpitterState::Alert
        } else {
            SpitterState::Patrol
        };
        if state != self.state {
            debug!("[ai] spitter {:?} -> {:?}", self.state, state);
            self.state = state;
        }

        let mut actions = SpitterActions::default();
        if now < self.next_action_at {
            return actions;
        }

        let interval = match self.state {
            SpitterState::Patrol => {
                self.patrol_action(senses, &mut actions);
                self.tuning.patrol_interval
            }
            SpitterState::Alert => {
                self.alert_action(now, own, senses, rng, &mut actions);
                self.tuning.alert_interval
            }
        };
        self.next_action_at = now + interval;
        actions
    }

    fn hop(&self, jump: Vec2) -> Vec2 {
        Vec2::new(jump.x * self.facing, jump.y)
    }

    fn patrol_action(&mut self, senses: &SpitterSenses, actions: &mut SpitterActions) {
        if !senses.grounded {
            return;
        }
        if senses.ground_toward(self.facing) {
            actions.jump = Some(self.hop(self.tuning.patrol_jump));
        } else {
            self.facing = -self.facing;
        }
    }

    fn alert_action(
        &mut self,
        now: f32,
        own: Vec2,
        senses: &SpitterSenses,
        rng: &mut impl Rng,
        actions: &mut SpitterActions,
    ) {
        if !senses.grounded {
            return;
        }
        let Some(target) = senses.target else {
            return;
        };

        let dx = target.position.x - own.x;
        if dx > 0.0 {
            self.facing = 1.0;
        } else if dx < 0.0 {
            self.facing = -1.0;
        }

        let ground = senses.ground_toward(self.facing);
        if !ground && target.distance <= self.tuning.spit_only_range {
            actions.spat = self.try_spit(now, target.position, true, rng);
            return;
        }
        if self.try_spit(now, target.position, false, rng) {
            actions.spat = true;
            return;
        }

        if ground {
            actions.jump = Some(self.hop(self.tuning.alert_jump));
        } else {
            self.facing = -self.facing;
        }
    }

    fn try_spit(&mut self, now: f32, target: Vec2, forced: bool, rng: &mut impl Rng) -> bool {
        if self.tuning.spit_offset.is_none() || now < self.next_spit_at {
            return false;
        }
        if !forced && rng.gen::<f32>() >= self.tuning.spit_chance {
            return false;
        }
        self.next_spit_at = now + self.tuning.spit_cooldown;
        self.pending = Some(PendingSpit {
            fire_at: now + self.tuning.spit_windup,
            target,
        });
        true
    }

    pub fn take_due_spit(&mut self, now: f32) -> Option<PendingSpit> {
        match self.pending {
            Some(spit) if now >= spit.fire_at => self.pending.take(),
            _ => None,
        }
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

pub fn spitter_brain_system(
    mut spitters: Query<(&Transform, &mut Velocity, &mut Facing, &mut SpitterBrain, Option<&Health>)>,
    targets: TargetView,
    rapier_context: ReadRapierContext,
    mut cues: MessageWriter<PresentationCue>,
    time: Res<Time>,
    config: Res<GameConfig>,
) {
    let Ok(rapier) = rapier_context.single() else {
        return;
    };
    let physics = RapierQuery::new(&rapier);
    let now = time.elapsed_secs();
    let mut rng = rand::thread_rng();

    let target = targets.target().filter(|t| t.active);

    for (transform, mut velocity, mut facing, mut brain, health) in spitters.iter_mut() {
        if health.is_some_and(|h| h.is_dead()) {
            continue;
        }
        let pos = transform.translation.truncate();
        let tuning = *brain.tuning();

        let target_sense = target.map(|t| SpitterTarget {
            position: t.position,
            distance: pos.distance(t.position),
            line_of_sight: !tuning.require_los
                || sees_first_hit(
                    &physics,
                    pos,
                    t.position,
                    layers::SOLID | layers::ACTOR,
                    |hit| targets.belongs_to(hit, t.entity),
                ),
        });

        let ledge_origin = pos + tuning.ledge_offset;
        let senses = SpitterSenses {
            target: target_sense,
            grounded: is_grounded(
                &physics,
                tuning.ground_check_offset.map(|o| pos + o),
                tuning.ground_radius,
                layers::SOLID,
            ),
            ground_left: ground_ahead(
                &physics,
                ledge_origin,
                -1.0,
                tuning.ledge_forward,
                tuning.ledge_down,
                layers::SOLID,
            ),
            ground_right: ground_ahead(
                &physics,
                ledge_origin,
                1.0,
                tuning.ledge_forward,
                tuning.ledge_down,
                layers::SOLID,
            ),
        };

        let actions = brain.tick(now, pos, &senses, &mut rng);
        facing.0 = brain.facing();

        if let Some(jump) = actions.jump {
            velocity.linvel = jump;
            cues.write(PresentationCue::sound(SoundCue::Jump, &config, &mut rng));
        }
        if actions.spat {
            cues.write(PresentationCue::sound(SoundCue::Spit, &config, &mut rng));
        }
    }
}

/// Launch acid for spits whose windup has elapsed.
pub fn spitter_spit_system(
    mut commands: Commands,
    mut spitters: Query<(&Transform, &Facing, &mut SpitterBrain)>,
    time: Res<Time>,
    config: Res<GameConfig>,
) {
    let now = time.elapsed_secs();
    for (transform, facing, mut brain) in spitters.iter_mut() {
        let Some(spit) = brain.take_due_spit(now) else {
            continue;
        };
        let Some(offset) = brain.tuning().spit_offset else {
            continue;
        };
        let origin = transform.translation.truncate() + Vec2::new(offset.x * facing.sign(), offset.y);
        let velocity = launch_velocity(origin, spit.target, brain.tuning().flight_time, config.gravity_y);
        spawn_arced_projectile(
            &mut commands,
            origin,
            velocity,
            ArcedProjectile::new(config.acid_damage, layers::SOLID | layers::ACTOR),
            now + config.acid_lifetime,
        );
        debug!("[ai] spitter launched acid at {:?}", spit.target);
    }
}

//! Gunner: a walking enemy that patrols and, once it sees its target, strafes
//! and fires slow bullets.
//!
//! ## States
//!
//! | State | Enter when | Movement | Facing |
//! |-------|------------|----------|--------|
//! | `Patrol` | start, or target lost / out of `detect × 1.25` / unseen | walk ↔ stop, flip at walls | follows movement |
//! | `Combat` | target seen and within `combat_range` | random strafe, reversed at walls | locked on the target |
//!
//! "Seen" means within `detect_range` and, when `require_los` is set, a clear
//! line of sight.  Sight skips an Empty suit (see [`super::senses::sees_through`]).
//!
//! A shot needs sight, an elapsed cooldown and the target in front; it is
//! scheduled as a [`PendingShot`] and fired by [`gunner_fire_system`] once the
//! windup deadline passes.

use crate::config::GameConfig;
use crate::constants::{
    GUNNER_LOSE_FACTOR, GUNNER_MUZZLE_OFFSET, GUNNER_STRAFE_TIME, GUNNER_WALL_CHECK_DIST,
    GUNNER_WALL_CHECK_OFFSET,
};
use crate::control::Facing;
use crate::effects::roll;
use crate::physics_query::{layers, memberships, RapierQuery};
use crate::projectile::spawn_slow_bullet;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;

use super::senses::{sees_through, wall_ahead};
use super::targeting::TargetView;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GunnerTuning {
    pub detect_range: f32,
    pub combat_range: f32,
    pub lose_factor: f32,
    pub require_los: bool,
    pub patrol_speed: f32,
    pub combat_speed: f32,
    pub walk_time: (f32, f32),
    pub short_stop: (f32, f32),
    pub long_stop: (f32, f32),
    pub strafe_time: (f32, f32),
    pub shoot_cooldown: f32,
    pub shoot_windup: f32,
    /// `None` disables shooting.
    pub muzzle_offset: Option<Vec2>,
    pub wall_check_offset: Vec2,
    pub wall_check_dist: f32,
}

impl GunnerTuning {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            detect_range: config.gunner_detect_range,
            combat_range: config.gunner_combat_range,
            lose_factor: GUNNER_LOSE_FACTOR,
            require_los: config.gunner_require_los,
            patrol_speed: config.gunner_patrol_speed,
            combat_speed: config.gunner_combat_speed,
            walk_time: config.gunner_walk_time,
            short_stop: config.gunner_short_stop,
            long_stop: config.gunner_long_stop,
            strafe_time: GUNNER_STRAFE_TIME,
            shoot_cooldown: config.gunner_shoot_cooldown,
            shoot_windup: config.gunner_shoot_windup,
            muzzle_offset: Some(Vec2::from(GUNNER_MUZZLE_OFFSET)),
            wall_check_offset: Vec2::from(GUNNER_WALL_CHECK_OFFSET),
            wall_check_dist: GUNNER_WALL_CHECK_DIST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GunnerState {
    Patrol,
    Combat,
}

/// A shot waiting for its windup to finish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingShot {
    pub fire_at: f32,
    /// Horizontal direction (±1) captured when the shot was decided.
    pub dir: f32,
}

/// The resolved target as the gunner perceives it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSense {
    pub x: f32,
    pub distance: f32,
    /// Line of sight result (ignores range).
    pub line_of_sight: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GunnerSenses {
    /// `None` when there is no active target; the gunner then idles.
    pub target: Option<TargetSense>,
    pub wall_left: bool,
    pub wall_right: bool,
}

impl GunnerSenses {
    fn wall_toward(&self, dir: f32) -> bool {
        if dir < 0.0 {
            self.wall_left
        } else {
            self.wall_right
        }
    }
}

/// Motion decided for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GunnerMotion {
    pub velocity_x: f32,
    pub facing: f32,
}

#[derive(Component, Debug, Clone)]
pub struct GunnerBrain {
    tuning: GunnerTuning,
    state: GunnerState,
    facing: f32,
    patrol_dir: f32,
    walking: bool,
    phase_ends_at: f32,
    next_stop_long: bool,
    strafe_dir: f32,
    next_strafe_at: f32,
    next_shot_at: f32,
    pending: Option<PendingShot>,
}

/// `-1.0` for negative `dx`, `1.0` otherwise.
fn sign_of(dx: f32) -> f32 {
    if dx < 0.0 {
        -1.0
    } else {
        1.0
    }
}

impl GunnerBrain {
    pub fn new(tuning: GunnerTuning, facing: f32, now: f32, rng: &mut impl Rng) -> Self {
        let facing = sign_of(facing);
        Self {
            tuning,
            state: GunnerState::Patrol,
            facing,
            patrol_dir: facing,
            walking: true,
            phase_ends_at: now + roll(rng, tuning.walk_time),
            next_stop_long: false,
            strafe_dir: 1.0,
            next_strafe_at: f32::NEG_INFINITY,
            next_shot_at: f32::NEG_INFINITY,
            pending: None,
        }
    }

    #[inline]
    pub fn state(&self) -> GunnerState {
        self.state
    }

    #[inline]
    pub fn facing(&self) -> f32 {
        self.facing
    }

    #[inline]
    pub fn is_walking(&self) -> bool {
        self.walking
    }

    #[inline]
    pub fn patrol_dir(&self) -> f32 {
        self.patrol_dir
    }

    #[inline]
    pub fn pending_shot(&self) -> Option<PendingShot> {
        self.pending
    }

    #[inline]
    pub fn tuning(&self) -> &GunnerTuning {
        &self.tuning
    }

    /// Advance one frame.  Returns `None` when there is no target to react to.
    pub fn tick(
        &mut self,
        now: f32,
        own_x: f32,
        senses: &GunnerSenses,
        rng: &mut impl Rng,
    ) -> Option<GunnerMotion> {
        let target = senses.target?;
        let t = &self.tuning;
        let sees = target.distance <= t.detect_range && (!t.require_los || target.line_of_sight);

        match self.state {
            GunnerState::Patrol if sees && target.distance <= t.combat_range => {
                debug!("[ai] gunner engages at {:.2}", target.distance);
                self.state = GunnerState::Combat;
            }
            GunnerState::Combat if !sees || target.distance > t.detect_range * t.lose_factor => {
                debug!("[ai] gunner lost target");
                self.state = GunnerState::Patrol;
            }
            _ => {}
        }

        let velocity_x = match self.state {
            GunnerState::Patrol => {
                let vx = self.patrol_tick(now, senses, rng);
                if vx != 0.0 {
                    self.facing = sign_of(vx);
                }
                vx
            }
            GunnerState::Combat => {
                let dx = target.x - own_x;
                if dx != 0.0 {
                    self.facing = sign_of(dx);
                }
                self.combat_tick(now, dx, sees, senses, rng)
            }
        };

        Some(GunnerMotion {
            velocity_x,
            facing: self.facing,
        })
    }

    fn patrol_tick(&mut self, now: f32, senses: &GunnerSenses, rng: &mut impl Rng) -> f32 {
        if self.walking && senses.wall_toward(self.patrol_dir) {
            self.patrol_dir = -self.patrol_dir;
            self.walking = false;
            self.phase_ends_at = now + roll(rng, self.tuning.short_stop);
        }

        if now >= self.phase_ends_at {
            if self.walking {
                self.walking = false;
                let range = if self.next_stop_long {
                    self.tuning.long_stop
                } else {
                    self.tuning.short_stop
                };
                self.phase_ends_at = now + roll(rng, range);
                self.next_stop_long = !self.next_stop_long;
            } else {
                self.walking = true;
                self.phase_ends_at = now + roll(rng, self.tuning.walk_time);
            }
        }

        if self.walking {
            self.patrol_dir * self.tuning.patrol_speed
        } else {
            0.0
        }
    }

    fn combat_tick(
        &mut self,
        now: f32,
        dx: f32,
        sees: bool,
        senses: &GunnerSenses,
        rng: &mut impl Rng,
    ) -> f32 {
        if now >= self.next_strafe_at {
            self.next_strafe_at = now + roll(rng, self.tuning.strafe_time);
            self.strafe_dir = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };
        }
        if senses.wall_toward(self.strafe_dir) {
            self.strafe_dir = -self.strafe_dir;
        }

        let in_front = self.facing == sign_of(dx);
        if sees && now >= self.next_shot_at && in_front && self.pending.is_none() {
            self.next_shot_at = now + self.tuning.shoot_cooldown;
            self.pending = Some(PendingShot {
                fire_at: now + self.tuning.shoot_windup,
                dir: sign_of(dx),
            });
        }

        self.strafe_dir * self.tuning.combat_speed
    }

    /// Wall collision while patrolling: turn around and take a short stop.
    pub fn on_wall_collision(&mut self, now: f32, rng: &mut impl Rng) {
        if self.state != GunnerState::Patrol {
            return;
        }
        self.patrol_dir = -self.patrol_dir;
        self.walking = false;
        self.phase_ends_at = now + roll(rng, self.tuning.short_stop);
    }

    /// The pending shot, once its windup has elapsed.
    pub fn take_due_shot(&mut self, now: f32) -> Option<PendingShot> {
        match self.pending {
            Some(shot) if now >= shot.fire_at => self.pending.take(),
            _ => None,
        }
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Sense, decide and move every gunner.
pub fn gunner_brain_system(
    mut gunners: Query<(&Transform, &mut Velocity, &mut Facing, &mut GunnerBrain)>,
    targets: TargetView,
    rapier_context: ReadRapierContext,
    time: Res<Time>,
) {
    let Ok(rapier) = rapier_context.single() else {
        return;
    };
    let physics = RapierQuery::new(&rapier);
    let now = time.elapsed_secs();
    let mut rng = rand::thread_rng();

    let target = targets.target().filter(|t| t.active);
    let empty_vehicle = targets.empty_vehicle();

    for (transform, mut velocity, mut facing, mut brain) in gunners.iter_mut() {
        let pos = transform.translation.truncate();
        let tuning = *brain.tuning();

        let target_sense = target.map(|t| {
            let eye = tuning
                .muzzle_offset
                .map(|m| pos + Vec2::new(m.x * facing.sign(), m.y))
                .unwrap_or(pos);
            let line_of_sight = !tuning.require_los
                || sees_through(
                    &physics,
                    eye,
                    t.position,
                    layers::SOLID | layers::ACTOR,
                    |hit| empty_vehicle.is_some_and(|v| targets.belongs_to(hit, v)),
                    |hit| targets.belongs_to(hit, t.entity),
                );
            TargetSense {
                x: t.position.x,
                distance: pos.distance(t.position),
                line_of_sight,
            }
        });

        let senses = GunnerSenses {
            target: target_sense,
            wall_left: wall_ahead(
                &physics,
                pos,
                tuning.wall_check_offset,
                -1.0,
                tuning.wall_check_dist,
                layers::WALL,
            ),
            wall_right: wall_ahead(
                &physics,
                pos,
                tuning.wall_check_offset,
                1.0,
                tuning.wall_check_dist,
                layers::WALL,
            ),
        };

        if let Some(motion) = brain.tick(now, pos.x, &senses, &mut rng) {
            velocity.linvel.x = motion.velocity_x;
            facing.0 = motion.facing;
        }
    }
}

/// Patrolling gunners turn around when they bump into a wall.
pub fn gunner_wall_bump_system(
    mut collision_events: MessageReader<CollisionEvent>,
    mut gunners: Query<&mut GunnerBrain>,
    groups: Query<&CollisionGroups>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();
    let mut rng = rand::thread_rng();
    for event in collision_events.read() {
        let CollisionEvent::Started(e1, e2, _) = event else {
            continue;
        };
        for (gunner, other) in [(*e1, *e2), (*e2, *e1)] {
            let Ok(mut brain) = gunners.get_mut(gunner) else {
                continue;
            };
            if memberships(groups.get(other).ok()).intersects(layers::WALL) {
                brain.on_wall_collision(now, &mut rng);
            }
        }
    }
}

/// Fire shots whose windup has elapsed.
pub fn gunner_fire_system(
    mut commands: Commands,
    mut gunners: Query<(&Transform, &Facing, &mut GunnerBrain)>,
    time: Res<Time>,
    config: Res<GameConfig>,
) {
    let now = time.elapsed_secs();
    for (transform, facing, mut brain) in gunners.iter_mut() {
        let Some(shot) = brain.take_due_shot(now) else {
            continue;
        };
        let Some(muzzle) = brain.tuning().muzzle_offset else {
            continue;
        };
        let origin = transform.translation.truncate() + Vec2::new(muzzle.x * facing.sign(), muzzle.y);
        spawn_slow_bullet(
            &mut commands,
            origin,
            shot.dir,
            config.slow_bullet_speed,
            now + config.slow_bullet_lifetime,
        );
        debug!("[ai] gunner fired {:+.0}", shot.dir);
    }
}

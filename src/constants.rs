//! Centralised gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::GameConfig::default`] is built from these values, and
//! `assets/game.toml` can override any subset at startup.
//!
//! Units are world units (1 unit ≈ one tile) and seconds.

// ── World ─────────────────────────────────────────────────────────────────────

/// Downward acceleration applied by Rapier and assumed by arced projectiles.
pub const GRAVITY_Y: f32 = -9.81;

/// Rendered pixels per world unit; only the camera projection uses this.
pub const PIXELS_PER_UNIT: f32 = 48.0;

// ── Hit Flash ─────────────────────────────────────────────────────────────────

/// Number of on/off blink cycles played after a hit.
pub const FLASH_COUNT: u32 = 3;

/// Duration of each half of a blink cycle (seconds).
///
/// The invulnerability window of a [`crate::health::Health`] is derived from
/// this cadence: `FLASH_COUNT × FLASH_INTERVAL × 2 + extra grace`.
pub const FLASH_INTERVAL: f32 = 0.06;

/// Alpha of the flash colour override.
pub const FLASH_ALPHA: f32 = 0.25;

// ── Free Actor (rat) ──────────────────────────────────────────────────────────

pub const ACTOR_MAX_HP: u32 = 3;

/// Extra invulnerability on top of the flash cadence.
///
/// 0.36 s of flashing + 0.24 s keeps the classic 0.6 s of i-frames.
pub const ACTOR_EXTRA_INVULN: f32 = 0.24;

/// Delay between the actor's death and its removal (room reset in the full game).
pub const ACTOR_DEATH_GRACE: f32 = 0.15;

pub const ACTOR_MOVE_SPEED: f32 = 4.5;
pub const ACTOR_JUMP_SPEED: f32 = 6.5;
pub const ACTOR_COLLIDER_HALF: (f32, f32) = (0.3, 0.25);

/// Grace window after leaving a ledge during which a jump is still accepted.
pub const COYOTE_TIME: f32 = 0.12;

/// A jump pressed this long before landing still fires on touchdown.
pub const JUMP_BUFFER: f32 = 0.12;

/// Radius of the feet overlap probe used for grounded checks.
pub const GROUND_PROBE_RADIUS: f32 = 0.08;

/// Rising speed is multiplied by this when jump is released early (1.0 = no cut).
pub const ACTOR_JUMP_CUT: f32 = 1.0;

// ── Wall slide / wall jump (rat only) ─────────────────────────────────────────

/// Fastest the rat may fall while pressed against a wall.
pub const WALL_SLIDE_SPEED: f32 = 2.0;

/// Push-off velocity of a wall jump, `x` pointing away from the wall.
pub const WALL_JUMP_FORCE: (f32, f32) = (6.5, 7.5);

/// Horizontal input is ignored this long after a wall jump.
pub const WALL_JUMP_LOCK_TIME: f32 = 0.12;

/// A wall jump is still accepted this long after leaving the wall.
pub const WALL_COYOTE_TIME: f32 = 0.12;

/// The wall just jumped from cannot be grabbed again for this long.
pub const WALL_REGRAB_BLOCK_TIME: f32 = 0.20;

/// Length of the side rays that look for walls, measured from the body edge.
pub const WALL_PROBE_REACH: f32 = 0.08;

// ── Vehicle (suit) ────────────────────────────────────────────────────────────

pub const SUIT_MAX_HP: u32 = 3;
pub const SUIT_EXTRA_INVULN: f32 = 0.24;
pub const SUIT_MOVE_SPEED: f32 = 3.0;
pub const SUIT_JUMP_SPEED: f32 = 7.5;

/// Releasing jump while rising keeps this share of the vertical speed.
pub const SUIT_JUMP_CUT: f32 = 0.5;
pub const SUIT_COLLIDER_HALF: (f32, f32) = (0.5, 0.7);

/// Radius of the interaction zone sensor around the suit.
pub const SUIT_INTERACT_RADIUS: f32 = 1.0;

/// Time after exiting during which re-entering is refused.
pub const REENTER_BLOCK_TIME: f32 = 0.35;

pub const EJECT_SPEED_X: f32 = 4.0;
pub const EJECT_SPEED_Y: f32 = 7.0;

/// Eject point relative to the suit origin (x mirrored by facing).
pub const EJECT_OFFSET: (f32, f32) = (0.0, 0.9);

/// Friction while parked; the suit behaves like terrain.
pub const SUIT_FRICTION_PARKED: f32 = 0.6;

/// Friction while driven; avoids sticking to walls mid-air.
pub const SUIT_FRICTION_DRIVEN: f32 = 0.0;

// ── Suit Weapon ───────────────────────────────────────────────────────────────

pub const SUIT_BULLET_SPEED: f32 = 14.0;
pub const SUIT_FIRE_COOLDOWN: f32 = 0.15;
pub const SUIT_MUZZLE_OFFSET: (f32, f32) = (0.6, 0.2);

pub const OVERHEAT_MAX: f32 = 100.0;
pub const OVERHEAT_PER_SHOT: f32 = 12.0;
pub const OVERHEAT_COOL_PER_SEC: f32 = 25.0;

/// Once overheated, the weapon unlocks only after cooling below this.
pub const OVERHEAT_UNLOCK: f32 = 60.0;

// ── Projectiles ───────────────────────────────────────────────────────────────

pub const FAST_BULLET_LIFETIME: f32 = 2.0;
pub const FAST_BULLET_DAMAGE: u32 = 1;
pub const BULLET_RADIUS: f32 = 0.08;

pub const SLOW_BULLET_SPEED: f32 = 8.0;
pub const SLOW_BULLET_LIFETIME: f32 = 2.0;

/// Damage dealt by the enemy-bullet bridge on the receiving actor.
pub const SLOW_BULLET_DAMAGE: u32 = 1;

pub const ACID_DAMAGE: u32 = 1;
pub const ACID_LIFETIME: f32 = 3.0;
pub const ACID_RADIUS: f32 = 0.12;

/// Shortest flight time accepted by the closed-form launch solver.
pub const MIN_FLIGHT_TIME: f32 = 0.05;

// ── Contact Damage ────────────────────────────────────────────────────────────

pub const TOUCH_DAMAGE: u32 = 1;
pub const TOUCH_COOLDOWN: f32 = 0.6;

// ── Stomp ─────────────────────────────────────────────────────────────────────

pub const STOMP_RADIUS: f32 = 0.12;

/// Vertical speed at or below which the actor counts as falling.
pub const STOMP_MIN_FALL_SPEED: f32 = -0.5;
pub const STOMP_BOUNCE_Y: f32 = 7.0;
pub const STOMP_DAMAGE: u32 = 999;
pub const STOMP_LOCK_TIME: f32 = 0.15;

/// The actor's centre may sit this far below the enemy collider's top edge.
pub const STOMP_FROM_ABOVE_MARGIN: f32 = 0.05;

// ── Gunner (Patrol / Combat) ──────────────────────────────────────────────────

pub const GUNNER_MAX_HP: u32 = 5;
pub const GUNNER_DETECT_RANGE: f32 = 8.0;
pub const GUNNER_COMBAT_RANGE: f32 = 7.0;

/// Combat is dropped beyond `detect_range × GUNNER_LOSE_FACTOR`.
pub const GUNNER_LOSE_FACTOR: f32 = 1.25;
pub const GUNNER_PATROL_SPEED: f32 = 1.2;
pub const GUNNER_COMBAT_SPEED: f32 = 1.4;
pub const GUNNER_WALK_TIME: (f32, f32) = (1.2, 2.2);
pub const GUNNER_SHORT_STOP: (f32, f32) = (0.35, 0.75);
pub const GUNNER_LONG_STOP: (f32, f32) = (1.6, 2.8);
pub const GUNNER_STRAFE_TIME: (f32, f32) = (0.35, 0.75);
pub const GUNNER_WALL_CHECK_DIST: f32 = 0.25;
pub const GUNNER_WALL_CHECK_OFFSET: (f32, f32) = (0.15, 0.0);
pub const GUNNER_SHOOT_COOLDOWN: f32 = 3.0;
pub const GUNNER_SHOOT_WINDUP: f32 = 0.12;
pub const GUNNER_MUZZLE_OFFSET: (f32, f32) = (0.45, 0.25);

// ── Spitter (Patrol / Alert) ──────────────────────────────────────────────────

pub const SPITTER_MAX_HP: u32 = 1;
pub const SPITTER_EXTRA_INVULN: f32 = 0.0;
pub const SPITTER_DEATH_GRACE: f32 = 0.05;
pub const SPITTER_DETECT_RANGE: f32 = 7.0;
pub const SPITTER_PATROL_INTERVAL: f32 = 3.0;
pub const SPITTER_PATROL_JUMP: (f32, f32) = (3.0, 6.0);
pub const SPITTER_ALERT_INTERVAL: f32 = 1.5;
pub const SPITTER_ALERT_JUMP: (f32, f32) = (4.0, 6.5);
pub const SPITTER_SPIT_COOLDOWN: f32 = 2.2;
pub const SPITTER_SPIT_CHANCE: f32 = 0.35;
pub const SPITTER_SPIT_WINDUP: f32 = 0.12;
pub const SPITTER_ACID_FLIGHT_TIME: f32 = 0.55;

/// With no ground ahead, a target inside this range is spat at instead of fled.
pub const SPITTER_SPIT_ONLY_RANGE: f32 = 5.5;
pub const SPITTER_GROUND_RADIUS: f32 = 0.12;
pub const SPITTER_GROUND_CHECK_OFFSET: (f32, f32) = (0.0, -0.35);
pub const SPITTER_LEDGE_FORWARD: f32 = 0.6;
pub const SPITTER_LEDGE_DOWN: f32 = 1.5;
pub const SPITTER_LEDGE_OFFSET: (f32, f32) = (0.0, 0.2);
pub const SPITTER_SPIT_OFFSET: (f32, f32) = (0.3, 0.1);

// ── Door ──────────────────────────────────────────────────────────────────────

pub const DOOR_OPEN_HEIGHT: f32 = 2.5;
pub const DOOR_OPEN_TIME: f32 = 0.35;

// ── Audio cues ────────────────────────────────────────────────────────────────

pub const CUE_PITCH_RANGE: (f32, f32) = (0.95, 1.05);
pub const CUE_VOLUME_RANGE: (f32, f32) = (0.8, 1.0);

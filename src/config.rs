//! Runtime gameplay configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/game.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<GameConfig>` to any system parameter list.  Per-entity
//! tuning structs (`HealthTuning`, `GunnerTuning`, …) are built from the config
//! when an entity is spawned, so a reload only affects new spawns.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use crate::error::{validate_positive, validate_range, CoreError, CoreResult};
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable gameplay configuration.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── World ─────────────────────────────────────────────────────────────────
    pub gravity_y: f32,
    pub pixels_per_unit: f32,

    // ── Hit Flash ─────────────────────────────────────────────────────────────
    pub flash_count: u32,
    pub flash_interval: f32,
    pub flash_alpha: f32,

    // ── Free Actor ────────────────────────────────────────────────────────────
    pub actor_max_hp: u32,
    pub actor_extra_invuln: f32,
    pub actor_death_grace: f32,
    pub actor_move_speed: f32,
    pub actor_jump_speed: f32,
    pub coyote_time: f32,
    pub jump_buffer: f32,
    pub actor_jump_cut: f32,
    pub wall_slide_speed: f32,
    pub wall_jump_force: (f32, f32),
    pub wall_jump_lock_time: f32,
    pub wall_coyote_time: f32,
    pub wall_regrab_block_time: f32,

    // ── Vehicle ───────────────────────────────────────────────────────────────
    pub suit_max_hp: u32,
    pub suit_extra_invuln: f32,
    pub suit_move_speed: f32,
    pub suit_jump_speed: f32,
    pub suit_jump_cut: f32,
    pub reenter_block_time: f32,
    pub eject_speed_x: f32,
    pub eject_speed_y: f32,
    pub eject_offset: (f32, f32),
    pub suit_friction_parked: f32,
    pub suit_friction_driven: f32,

    // ── Suit Weapon ───────────────────────────────────────────────────────────
    pub suit_bullet_speed: f32,
    pub suit_fire_cooldown: f32,
    pub suit_muzzle_offset: (f32, f32),
    pub overheat_max: f32,
    pub overheat_per_shot: f32,
    pub overheat_cool_per_sec: f32,
    pub overheat_unlock: f32,

    // ── Projectiles ───────────────────────────────────────────────────────────
    pub fast_bullet_lifetime: f32,
    pub fast_bullet_damage: u32,
    pub slow_bullet_speed: f32,
    pub slow_bullet_lifetime: f32,
    pub slow_bullet_damage: u32,
    pub acid_damage: u32,
    pub acid_lifetime: f32,

    // ── Contact Damage ────────────────────────────────────────────────────────
    pub touch_damage: u32,
    pub touch_cooldown: f32,

    // ── Stomp ─────────────────────────────────────────────────────────────────
    pub stomp_radius: f32,
    pub stomp_min_fall_speed: f32,
    pub stomp_bounce_y: f32,
    pub stomp_damage: u32,
    pub stomp_lock_time: f32,

    // ── Gunner ────────────────────────────────────────────────────────────────
    pub gunner_max_hp: u32,
    pub gunner_detect_range: f32,
    pub gunner_combat_range: f32,
    pub gunner_require_los: bool,
    pub gunner_patrol_speed: f32,
    pub gunner_combat_speed: f32,
    pub gunner_walk_time: (f32, f32),
    pub gunner_short_stop: (f32, f32),
    pub gunner_long_stop: (f32, f32),
    pub gunner_shoot_cooldown: f32,
    pub gunner_shoot_windup: f32,

    // ── Spitter ───────────────────────────────────────────────────────────────
    pub spitter_max_hp: u32,
    pub spitter_detect_range: f32,
    pub spitter_require_los: bool,
    pub spitter_patrol_interval: f32,
    pub spitter_alert_interval: f32,
    pub spitter_spit_cooldown: f32,
    pub spitter_spit_chance: f32,
    pub spitter_spit_windup: f32,
    pub spitter_acid_flight_time: f32,
    pub spitter_spit_only_range: f32,

    // ── Door ──────────────────────────────────────────────────────────────────
    pub door_open_height: f32,
    pub door_open_time: f32,

    // ── Audio cues ────────────────────────────────────────────────────────────
    pub cue_pitch_range: (f32, f32),
    pub cue_volume_range: (f32, f32),
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // World
            gravity_y: GRAVITY_Y,
            pixels_per_unit: PIXELS_PER_UNIT,
            // Hit Flash
            flash_count: FLASH_COUNT,
            flash_interval: FLASH_INTERVAL,
            flash_alpha: FLASH_ALPHA,
            // Free Actor
            actor_max_hp: ACTOR_MAX_HP,
            actor_extra_invuln: ACTOR_EXTRA_INVULN,
            actor_death_grace: ACTOR_DEATH_GRACE,
            actor_move_speed: ACTOR_MOVE_SPEED,
            actor_jump_speed: ACTOR_JUMP_SPEED,
            coyote_time: COYOTE_TIME,
            jump_buffer: JUMP_BUFFER,
            actor_jump_cut: ACTOR_JUMP_CUT,
            wall_slide_speed: WALL_SLIDE_SPEED,
            wall_jump_force: WALL_JUMP_FORCE,
            wall_jump_lock_time: WALL_JUMP_LOCK_TIME,
            wall_coyote_time: WALL_COYOTE_TIME,
            wall_regrab_block_time: WALL_REGRAB_BLOCK_TIME,
            // Vehicle
            suit_max_hp: SUIT_MAX_HP,
            suit_extra_invuln: SUIT_EXTRA_INVULN,
            suit_move_speed: SUIT_MOVE_SPEED,
            suit_jump_speed: SUIT_JUMP_SPEED,
            suit_jump_cut: SUIT_JUMP_CUT,
            reenter_block_time: REENTER_BLOCK_TIME,
            eject_speed_x: EJECT_SPEED_X,
            eject_speed_y: EJECT_SPEED_Y,
            eject_offset: EJECT_OFFSET,
            suit_friction_parked: SUIT_FRICTION_PARKED,
            suit_friction_driven: SUIT_FRICTION_DRIVEN,
            // Suit Weapon
            suit_bullet_speed: SUIT_BULLET_SPEED,
            suit_fire_cooldown: SUIT_FIRE_COOLDOWN,
            suit_muzzle_offset: SUIT_MUZZLE_OFFSET,
            overheat_max: OVERHEAT_MAX,
            overheat_per_shot: OVERHEAT_PER_SHOT,
            overheat_cool_per_sec: OVERHEAT_COOL_PER_SEC,
            overheat_unlock: OVERHEAT_UNLOCK,
            // Projectiles
            fast_bullet_lifetime: FAST_BULLET_LIFETIME,
            fast_bullet_damage: FAST_BULLET_DAMAGE,
            slow_bullet_speed: SLOW_BULLET_SPEED,
            slow_bullet_lifetime: SLOW_BULLET_LIFETIME,
            slow_bullet_damage: SLOW_BULLET_DAMAGE,
            acid_damage: ACID_DAMAGE,
            acid_lifetime: ACID_LIFETIME,
            // Contact Damage
            touch_damage: TOUCH_DAMAGE,
            touch_cooldown: TOUCH_COOLDOWN,
            // Stomp
            stomp_radius: STOMP_RADIUS,
            stomp_min_fall_speed: STOMP_MIN_FALL_SPEED,
            stomp_bounce_y: STOMP_BOUNCE_Y,
            stomp_damage: STOMP_DAMAGE,
            stomp_lock_time: STOMP_LOCK_TIME,
            // Gunner
            gunner_max_hp: GUNNER_MAX_HP,
            gunner_detect_range: GUNNER_DETECT_RANGE,
            gunner_combat_range: GUNNER_COMBAT_RANGE,
            gunner_require_los: true,
            gunner_patrol_speed: GUNNER_PATROL_SPEED,
            gunner_combat_speed: GUNNER_COMBAT_SPEED,
            gunner_walk_time: GUNNER_WALK_TIME,
            gunner_short_stop: GUNNER_SHORT_STOP,
            gunner_long_stop: GUNNER_LONG_STOP,
            gunner_shoot_cooldown: GUNNER_SHOOT_COOLDOWN,
            gunner_shoot_windup: GUNNER_SHOOT_WINDUP,
            // Spitter
            spitter_max_hp: SPITTER_MAX_HP,
            spitter_detect_range: SPITTER_DETECT_RANGE,
            spitter_require_los: false,
            spitter_patrol_interval: SPITTER_PATROL_INTERVAL,
            spitter_alert_interval: SPITTER_ALERT_INTERVAL,
            spitter_spit_cooldown: SPITTER_SPIT_COOLDOWN,
            spitter_spit_chance: SPITTER_SPIT_CHANCE,
            spitter_spit_windup: SPITTER_SPIT_WINDUP,
            spitter_acid_flight_time: SPITTER_ACID_FLIGHT_TIME,
            spitter_spit_only_range: SPITTER_SPIT_ONLY_RANGE,
            // Door
            door_open_height: DOOR_OPEN_HEIGHT,
            door_open_time: DOOR_OPEN_TIME,
            // Audio cues
            cue_pitch_range: CUE_PITCH_RANGE,
            cue_volume_range: CUE_VOLUME_RANGE,
        }
    }
}

impl GameConfig {
    /// Reject values that would break the state machines (zero max HP, a
    /// negative cadence, inverted random ranges, …).
    pub fn validate(&self) -> CoreResult<()> {
        if self.actor_max_hp == 0 {
            return Err(CoreError::InvalidConfig {
                key: "actor_max_hp",
                reason: "must be at least 1",
            });
        }
        if self.suit_max_hp == 0 || self.gunner_max_hp == 0 || self.spitter_max_hp == 0 {
            return Err(CoreError::InvalidConfig {
                key: "*_max_hp",
                reason: "must be at least 1",
            });
        }
        validate_positive("flash_interval", self.flash_interval)?;
        validate_positive("touch_cooldown", self.touch_cooldown)?;
        validate_positive("door_open_time", self.door_open_time)?;
        validate_positive("spitter_patrol_interval", self.spitter_patrol_interval)?;
        validate_positive("spitter_alert_interval", self.spitter_alert_interval)?;
        validate_positive("wall_slide_speed", self.wall_slide_speed)?;
        for (key, cut) in [
            ("actor_jump_cut", self.actor_jump_cut),
            ("suit_jump_cut", self.suit_jump_cut),
        ] {
            if !(0.0..=1.0).contains(&cut) {
                return Err(CoreError::InvalidConfig {
                    key,
                    reason: "must be within [0, 1]",
                });
            }
        }
        validate_range("gunner_walk_time", self.gunner_walk_time)?;
        validate_range("gunner_short_stop", self.gunner_short_stop)?;
        validate_range("gunner_long_stop", self.gunner_long_stop)?;
        validate_range("cue_pitch_range", self.cue_pitch_range)?;
        validate_range("cue_volume_range", self.cue_volume_range)?;
        if !(0.0..=1.0).contains(&self.spitter_spit_chance) {
            return Err(CoreError::InvalidConfig {
                key: "spitter_spit_chance",
                reason: "must be within [0, 1]",
            });
        }
        if self.gravity_y >= 0.0 {
            return Err(CoreError::InvalidConfig {
                key: "gravity_y",
                reason: "must point downwards (negative)",
            });
        }
        Ok(())
    }
}

/// Override file read by [`load_game_config`], relative to the working directory.
pub const GAME_CONFIG_PATH: &str = "assets/game.toml";

/// Parse a TOML document into a validated [`GameConfig`].
pub fn parse_game_config(contents: &str) -> CoreResult<GameConfig> {
    let loaded = toml::from_str::<GameConfig>(contents).map_err(|e| CoreError::ConfigParse {
        message: e.to_string(),
    })?;
    loaded.validate()?;
    Ok(loaded)
}

/// Startup system: attempt to load `assets/game.toml` and overwrite the
/// `GameConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  Parse or validation errors
/// are printed to stderr but do not abort the game.  A missing file is not an
/// error.
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    let path = GAME_CONFIG_PATH;
    match std::fs::read_to_string(path) {
        Ok(contents) => match parse_game_config(&contents) {
            Ok(loaded) => {
                *config = loaded;
                println!("✓ Loaded game config from {path}");
            }
            Err(e) => {
                eprintln!("⚠ {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            // Defaults are already in place.
            println!("ℹ No {path} found; using compiled defaults");
        }
    }
}

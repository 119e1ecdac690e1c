//! Gameplay-core error types.
//!
//! Nothing in the core is fatal: every failure is either a configuration
//! problem reported at startup or an expected rejection (e.g. trying to enter
//! the suit while the re-entry lockout is active).  Systems log these values
//! and carry on with the rest of the frame.
//!
//! ## Usage
//!
//! ```rust
//! use ratsuit::error::{CoreError, CoreResult};
//!
//! fn check(hp: u32) -> CoreResult<()> {
//!     if hp == 0 {
//!         return Err(CoreError::InvalidConfig { key: "hp", reason: "must be at least 1" });
//!     }
//!     Ok(())
//! }
//! assert!(check(0).is_err());
//! ```

use std::fmt;

/// Top-level error enum for the gameplay core.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// `assets/game.toml` is not valid TOML for [`crate::config::GameConfig`].
    ConfigParse {
        /// Parser message.
        message: String,
    },

    /// A config value is outside the range the state machines can handle.
    InvalidConfig {
        /// Name of the offending key.
        key: &'static str,
        /// Human-readable constraint.
        reason: &'static str,
    },

    /// Interact was pressed on an empty suit with nobody in its interaction zone.
    NoCandidate,

    /// Interact was pressed while the re-entry lockout is still running.
    ReentryLocked {
        /// Simulation time at which entering becomes possible again.
        until: f32,
    },

    /// Enter was requested on a suit that already has an occupant.
    AlreadyOccupied,

    /// Exit was requested on an empty suit.
    NotOccupied,

    /// The occupant stored at entry time no longer exists.
    OccupantMissing,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::ConfigParse { message } => write!(f, "config parse failed: {}", message),
            CoreError::InvalidConfig { key, reason } => {
                write!(f, "config value '{}' rejected: {}", key, reason)
            }
            CoreError::NoCandidate => write!(f, "no occupant in the interaction zone"),
            CoreError::ReentryLocked { until } => {
                write!(f, "re-entry locked until t={:.3}s", until)
            }
            CoreError::AlreadyOccupied => write!(f, "suit is already occupied"),
            CoreError::NotOccupied => write!(f, "suit is empty"),
            CoreError::OccupantMissing => write!(f, "stored occupant entity no longer exists"),
        }
    }
}

impl std::error::Error for CoreError {}

/// Convenience alias: a `Result` using `CoreError` as the error type.
pub type CoreResult<T> = Result<T, CoreError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error if `value` is not strictly positive.
pub fn validate_positive(key: &'static str, value: f32) -> CoreResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidConfig {
            key,
            reason: "must be > 0",
        })
    }
}

/// Returns an error if a `(min, max)` random range is inverted or negative.
pub fn validate_range(key: &'static str, (min, max): (f32, f32)) -> CoreResult<()> {
    if min < 0.0 || max < min {
        Err(CoreError::InvalidConfig {
            key,
            reason: "expected 0 <= min <= max",
        })
    } else {
        Ok(())
    }
}

//! Enemy AI: target resolution, scene probes and the two enemy brains.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`targeting`] | `TargetCache` (lazy rat / suit lookup) and the `TargetView` system param |
//! | [`senses`] | Line of sight, grounded, ledge and wall probes over `PhysicsQuery` |
//! | [`gunner`] | Patrol / Combat brain, wall bumps, windup-delayed slow bullets |
//! | [`spitter`] | Patrol / Alert brain on an action cadence, windup-delayed acid arcs |
//!
//! Brains are plain components with a `tick` that takes pre-computed senses,
//! so the decision logic is tested without Rapier.

pub mod gunner;
pub mod senses;
pub mod spitter;
pub mod targeting;

pub use gunner::{
    gunner_brain_system, gunner_fire_system, gunner_wall_bump_system, GunnerBrain, GunnerState,
    GunnerTuning,
};
pub use spitter::{
    spitter_brain_system, spitter_spit_system, SpitterBrain, SpitterState, SpitterTuning,
};
pub use targeting::{refresh_target_cache_system, resolve_target, TargetCache, TargetView};

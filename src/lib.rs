//! RatSuit gameplay core
//!
//! A small-creature platformer built on Bevy and Rapier2D: a rat that can
//! climb into a combat suit, enemies that patrol, shoot and spit, and one
//! shared damage protocol with hit flashes and invulnerability windows.

pub mod ai;
pub mod config;
pub mod constants;
pub mod contact;
pub mod control;
pub mod damage;
pub mod effects;
pub mod error;
pub mod graphics;
pub mod health;
pub mod interact;
pub mod level;
pub mod physics_query;
pub mod possession;
pub mod projectile;
pub mod simulation;
pub mod stomp;
pub mod weapon;

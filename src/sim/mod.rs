//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per tick, time advances by the current tick interval
//! - Seeded RNG only (passed in by the caller)
//! - No scheduling, feedback or platform dependencies

pub mod autopilot;
pub mod food;
pub mod state;
pub mod tick;

pub use autopilot::{choose_direction, steer};
pub use food::{food_target, place_food};
pub use state::{Direction, GamePhase, GameState, Position, Snake, SpeedState};
pub use tick::{DeathCause, GameEvent, TickReport, tick};

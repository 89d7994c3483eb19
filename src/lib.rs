//! Snake Arcade - a grid Snake game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (snake movement, food, scoring, speed ramp)
//! - `engine`: Command surface and tick scheduling around the simulation
//! - `runtime`: Real-time game loop that serializes commands and ticks
//! - `feedback`: Sound/haptic cue routing
//! - `persistence`: JSON document storage
//! - `tuning`: Data-driven game balance

pub mod engine;
pub mod feedback;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod runtime;
pub mod scheduler;
pub mod settings;
pub mod sim;
pub mod snapshot;
pub mod tuning;

pub use engine::{Command, Engine};
pub use highscores::HighScores;
pub use settings::Settings;
pub use snapshot::Snapshot;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    use crate::sim::{Direction, Position};

    /// Playfield dimensions (cells)
    pub const GRID_WIDTH: i32 = 20;
    pub const GRID_HEIGHT: i32 = 35;

    /// Canonical starting body, head first
    pub const START_BODY: [Position; 3] = [
        Position::new(10, 10),
        Position::new(9, 10),
        Position::new(8, 10),
    ];
    pub const START_DIRECTION: Direction = Direction::Right;

    /// Random draws allowed per food item before placement gives up
    pub const FOOD_PLACEMENT_ATTEMPTS: u32 = 100;

    /// Floor for any scheduled tick interval
    pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(10);
}

//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives here.

use std::collections::VecDeque;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::food::place_food;
use crate::consts::*;
use crate::tuning::Tuning;

/// A cell on the playfield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring cell one step in `direction` (may be off the grid)
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Whether this cell lies on the playfield
    pub fn in_bounds(self) -> bool {
        (0..GRID_WIDTH).contains(&self.x) && (0..GRID_HEIGHT).contains(&self.y)
    }

    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Heading of the snake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset (dx, dy); y grows downward
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ticks advance the snake
    Playing,
    /// Tick delivery suspended until resume
    Paused,
    /// Run ended; only a reset starts a new one
    GameOver,
}

/// The snake body, head first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snake {
    body: VecDeque<Position>,
}

impl Snake {
    /// Build a snake from head-first segments
    pub fn new(segments: impl IntoIterator<Item = Position>) -> Self {
        let body: VecDeque<Position> = segments.into_iter().collect();
        debug_assert!(!body.is_empty(), "snake must have a head");
        Self { body }
    }

    /// The canonical three-segment starting snake
    pub fn starting() -> Self {
        Self::new(START_BODY)
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Whether any segment (tail included) occupies `pos`
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    pub fn segments(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    pub(crate) fn push_head(&mut self, pos: Position) {
        self.body.push_front(pos);
    }

    pub(crate) fn drop_tail(&mut self) {
        self.body.pop_back();
    }
}

/// Position on the speed schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedState {
    /// Index of the next step to apply
    pub step: usize,
    /// Current tick interval
    pub interval: Duration,
    /// Elapsed play time at which the next step applies
    pub next_threshold: Duration,
}

impl SpeedState {
    pub fn initial(tuning: &Tuning) -> Self {
        Self {
            step: 0,
            interval: tuning.initial_interval().max(MIN_TICK_INTERVAL),
            next_threshold: tuning.first_speed_up(),
        }
    }
}

/// Complete simulation state of one engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub snake: Snake,
    /// Active food items (mutually disjoint, never on the snake)
    pub foods: Vec<Position>,
    pub direction: Direction,
    pub phase: GamePhase,
    pub score: u64,
    /// Best score seen by this process, seeded from storage
    pub high_score: u64,
    /// Play time accumulated one tick interval at a time
    pub elapsed: Duration,
    pub speed: SpeedState,
    /// Simulation tick counter (ticks that ran while Playing)
    pub time_ticks: u64,
}

impl GameState {
    /// Fresh run with food already placed
    pub fn new<R: Rng>(tuning: &Tuning, high_score: u64, rng: &mut R) -> Self {
        let mut state = Self {
            snake: Snake::starting(),
            foods: Vec::new(),
            direction: START_DIRECTION,
            phase: GamePhase::Playing,
            score: 0,
            high_score,
            elapsed: Duration::ZERO,
            speed: SpeedState::initial(tuning),
            time_ticks: 0,
        };
        state.replenish_food(tuning, rng);
        state
    }

    /// Reinitialize everything except the high score
    pub fn reset<R: Rng>(&mut self, tuning: &Tuning, rng: &mut R) {
        *self = Self::new(tuning, self.high_score, rng);
    }

    /// Change heading unless it would reverse the snake onto itself.
    /// Returns whether the heading was accepted.
    pub fn steer(&mut self, direction: Direction) -> bool {
        if self.direction.is_opposite(direction) {
            return false;
        }
        self.direction = direction;
        true
    }

    /// Replace the food set with a fresh batch sized for the elapsed time
    pub fn replenish_food<R: Rng>(&mut self, tuning: &Tuning, rng: &mut R) {
        self.foods = place_food(&self.snake, tuning.food_target(self.elapsed), rng);
    }

    pub fn is_food(&self, pos: Position) -> bool {
        self.foods.contains(&pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_position_step_and_bounds() {
        let pos = Position::new(0, 0);
        assert_eq!(pos.step(Direction::Right), Position::new(1, 0));
        assert_eq!(pos.step(Direction::Down), Position::new(0, 1));
        assert!(!pos.step(Direction::Left).in_bounds());
        assert!(!pos.step(Direction::Up).in_bounds());
        assert!(Position::new(GRID_WIDTH - 1, GRID_HEIGHT - 1).in_bounds());
        assert!(!Position::new(GRID_WIDTH, 0).in_bounds());
        assert!(!Position::new(0, GRID_HEIGHT).in_bounds());
    }

    #[test]
    fn test_direction_opposites() {
        for dir in Direction::ALL {
            assert!(dir.is_opposite(dir.opposite()));
            assert!(!dir.is_opposite(dir));
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn test_starting_snake() {
        let snake = Snake::starting();
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(10, 10));
        assert_eq!(snake.tail(), Position::new(8, 10));
        // Body extends opposite the initial heading
        let (dx, _) = START_DIRECTION.offset();
        assert_eq!(snake.segments().nth(1), Some(Position::new(10 - dx, 10)));
    }

    #[test]
    fn test_new_state_has_food_off_snake() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let state = GameState::new(&tuning, 40, &mut rng);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.foods.len(), 1);
        assert!(!state.snake.occupies(state.foods[0]));
        assert_eq!(state.high_score, 40);
        assert_eq!(state.speed.interval, tuning.initial_interval());
    }

    #[test]
    fn test_steer_rejects_reversal() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = GameState::new(&tuning, 0, &mut rng);
        assert!(!state.steer(Direction::Left));
        assert_eq!(state.direction, Direction::Right);
        assert!(state.steer(Direction::Right));
        assert!(state.steer(Direction::Up));
        assert_eq!(state.direction, Direction::Up);
        assert!(!state.steer(Direction::Down));
        assert_eq!(state.direction, Direction::Up);
    }

    #[test]
    fn test_reset_keeps_high_score() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut state = GameState::new(&tuning, 0, &mut rng);
        state.score = 120;
        state.high_score = 120;
        state.phase = GamePhase::GameOver;
        state.elapsed = Duration::from_secs(30);
        state.reset(&tuning, &mut rng);
        assert_eq!(state.score, 0);
        assert_eq!(state.high_score, 120);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.elapsed, Duration::ZERO);
        assert_eq!(state.snake, Snake::starting());
    }
}

//! Read-only view of the engine for presentation
//!
//! Snapshots are taken between ticks, so they never show a half-applied
//! step.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{self, Direction, GamePhase, GameState, Position};

/// Consistent copy of everything the presentation layer draws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snake body, head first
    pub snake: Vec<Position>,
    pub foods: Vec<Position>,
    pub direction: Direction,
    pub phase: GamePhase,
    pub score: u64,
    pub high_score: u64,
    /// Elapsed play time (ms)
    pub elapsed_ms: u64,
    /// Current tick interval (ms)
    pub tick_interval_ms: u64,
    /// Speed steps applied so far
    pub speed_step: usize,
}

impl Snapshot {
    pub fn of(state: &GameState) -> Self {
        Self {
            snake: state.snake.segments().collect(),
            foods: state.foods.clone(),
            direction: state.direction,
            phase: state.phase,
            score: state.score,
            high_score: state.high_score,
            elapsed_ms: state.elapsed.as_millis() as u64,
            tick_interval_ms: state.speed.interval.as_millis() as u64,
            speed_step: state.speed.step,
        }
    }

    pub fn head(&self) -> Option<Position> {
        self.snake.first().copied()
    }

    /// Character for one cell: food wins over snake, head over body
    pub fn cell(&self, pos: Position) -> char {
        if self.foods.contains(&pos) {
            '*'
        } else if self.head() == Some(pos) {
            '@'
        } else if self.snake.contains(&pos) {
            'o'
        } else {
            '.'
        }
    }

    /// Autopilot heading for this board, None once the snake is gone
    pub fn autopilot(&self) -> Option<Direction> {
        let head = self.head()?;
        Some(sim::steer(head, &self.foods, self.direction, |pos| {
            self.snake.contains(&pos)
        }))
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "SCORE {:<6} HIGH {:<6} {:?}",
            self.score, self.high_score, self.phase
        )?;
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                write!(f, "{}", self.cell(Position::new(x, y)))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut rng = Pcg32::seed_from_u64(11);
        let state = GameState::new(&Tuning::default(), 70, &mut rng);
        let snap = Snapshot::of(&state);

        assert_eq!(snap.snake.len(), 3);
        assert_eq!(snap.head(), Some(Position::new(10, 10)));
        assert_eq!(snap.foods, state.foods);
        assert_eq!(snap.high_score, 70);
        assert_eq!(snap.tick_interval_ms, 200);
        assert_eq!(snap.phase, GamePhase::Playing);
    }

    #[test]
    fn test_board_rendering() {
        let mut rng = Pcg32::seed_from_u64(12);
        let mut state = GameState::new(&Tuning::default(), 0, &mut rng);
        state.foods = vec![Position::new(0, 0)];
        let text = Snapshot::of(&state).to_string();
        let rows: Vec<&str> = text.lines().skip(1).collect();

        assert_eq!(rows.len(), GRID_HEIGHT as usize);
        assert!(rows.iter().all(|r| r.chars().count() == GRID_WIDTH as usize));
        assert!(rows[0].starts_with('*'));
        assert_eq!(&rows[10][8..11], "oo@");
    }

    #[test]
    fn test_autopilot_matches_state() {
        let mut rng = Pcg32::seed_from_u64(13);
        let mut state = GameState::new(&Tuning::default(), 0, &mut rng);
        state.foods = vec![Position::new(10, 2)];
        let snap = Snapshot::of(&state);
        assert_eq!(snap.autopilot(), Some(sim::choose_direction(&state)));
        assert_eq!(snap.autopilot(), Some(Direction::Up));
    }
}

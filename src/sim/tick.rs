//! Fixed-interval simulation tick
//!
//! One call advances the run by exactly one step at the current interval.

use std::time::Duration;

use rand::Rng;

use super::state::{GamePhase, GameState, Position};
use crate::consts::*;
use crate::tuning::Tuning;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Head left the playfield
    Wall,
    /// Head ran into the body
    SelfCollision,
}

/// Something observable that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Food set was empty and has been refilled
    FoodReplenished { count: usize },
    /// Head landed on a food item
    Ate { at: Position },
    /// Score passed the previous high score
    NewHighScore(u64),
    /// Speed schedule advanced; `step` is the number of steps applied so far
    SpeedUp { step: usize, interval: Duration },
    /// Run ended on this tick
    GameOver { cause: DeathCause },
}

/// Outcome of a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
}

impl TickReport {
    pub fn game_over(&self) -> Option<DeathCause> {
        self.events.iter().find_map(|e| match e {
            GameEvent::GameOver { cause } => Some(*cause),
            _ => None,
        })
    }

    /// New tick interval if the speed schedule advanced
    pub fn speed_change(&self) -> Option<Duration> {
        self.events.iter().find_map(|e| match e {
            GameEvent::SpeedUp { interval, .. } => Some(*interval),
            _ => None,
        })
    }

    pub fn ate(&self) -> bool {
        self.events.iter().any(|e| matches!(e, GameEvent::Ate { .. }))
    }

    pub fn new_high_score(&self) -> Option<u64> {
        self.events.iter().find_map(|e| match e {
            GameEvent::NewHighScore(score) => Some(*score),
            _ => None,
        })
    }
}

/// Advance the game state by one tick
pub fn tick<R: Rng>(state: &mut GameState, tuning: &Tuning, rng: &mut R) -> TickReport {
    let mut report = TickReport::default();

    // Only a running game moves
    if state.phase != GamePhase::Playing {
        return report;
    }

    state.time_ticks += 1;

    if state.foods.is_empty() {
        // Refill and skip movement this tick
        state.replenish_food(tuning, rng);
        report.events.push(GameEvent::FoodReplenished {
            count: state.foods.len(),
        });
    } else if !move_snake(state, tuning, rng, &mut report) {
        return report;
    }

    advance_clock(state, tuning, &mut report);
    report
}

/// Move one cell along the heading. Returns false if the run ended.
fn move_snake<R: Rng>(
    state: &mut GameState,
    tuning: &Tuning,
    rng: &mut R,
    report: &mut TickReport,
) -> bool {
    let head = state.snake.head().step(state.direction);

    let collision = if !head.in_bounds() {
        Some(DeathCause::Wall)
    } else if state.snake.occupies(head) {
        Some(DeathCause::SelfCollision)
    } else {
        None
    };

    if let Some(cause) = collision {
        state.phase = GamePhase::GameOver;
        report.events.push(GameEvent::GameOver { cause });
        log::info!(
            "Game over ({:?}) at {:?}, score {}, length {}",
            cause,
            head,
            state.score,
            state.snake.len()
        );
        return false;
    }

    state.snake.push_head(head);

    match state.foods.iter().position(|f| *f == head) {
        Some(index) => {
            // Grow: tail stays this tick
            state.foods.remove(index);
            state.score += tuning.food_award;
            report.events.push(GameEvent::Ate { at: head });

            if state.score > state.high_score {
                state.high_score = state.score;
                report.events.push(GameEvent::NewHighScore(state.score));
            }

            if state.foods.is_empty() {
                state.replenish_food(tuning, rng);
                report.events.push(GameEvent::FoodReplenished {
                    count: state.foods.len(),
                });
            }
        }
        None => state.snake.drop_tail(),
    }

    true
}

/// Accumulate play time and apply the next speed step once its threshold
/// is reached
fn advance_clock(state: &mut GameState, tuning: &Tuning, report: &mut TickReport) {
    state.elapsed += state.speed.interval;

    let speed = &mut state.speed;
    if state.elapsed < speed.next_threshold {
        return;
    }
    let Some(step) = tuning.speed_steps.get(speed.step) else {
        return;
    };

    speed.interval = Duration::from_millis(step.interval_ms).max(MIN_TICK_INTERVAL);
    speed.step += 1;
    speed.next_threshold += Duration::from_millis(step.next_after_ms);

    log::info!(
        "Speed step {} at {:.1}s: tick every {}ms",
        speed.step,
        state.elapsed.as_secs_f32(),
        speed.interval.as_millis()
    );
    report.events.push(GameEvent::SpeedUp {
        step: speed.step,
        interval: speed.interval,
    });
}

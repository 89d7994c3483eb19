//! Attract-mode steering
//!
//! Picks a heading that heads for the nearest food without walking into a
//! wall or the body on the next step. Used by the demo binary to play
//! unattended.

use super::state::{Direction, GameState, Position};

/// Heading for the next tick. Falls back to the current heading when every
/// option is fatal.
pub fn choose_direction(state: &GameState) -> Direction {
    steer(state.snake.head(), &state.foods, state.direction, |pos| {
        state.snake.occupies(pos)
    })
}

/// Same choice from loose parts, for callers holding a copy of the board
/// rather than the state itself
pub fn steer(
    head: Position,
    foods: &[Position],
    heading: Direction,
    occupied: impl Fn(Position) -> bool,
) -> Direction {
    // Closest food by grid distance; ties resolve by set order
    let target = foods
        .iter()
        .copied()
        .min_by_key(|food| head.manhattan(*food));

    let safe = Direction::ALL
        .into_iter()
        .filter(|dir| !heading.is_opposite(*dir))
        .filter(|dir| {
            let next = head.step(*dir);
            next.in_bounds() && !occupied(next)
        });

    let best = match target {
        Some(food) => safe.min_by_key(|dir| {
            let distance = head.step(*dir).manhattan(food);
            // Prefer keeping the heading on ties to avoid zig-zagging
            (distance, u8::from(*dir != heading))
        }),
        None => safe.min_by_key(|dir| u8::from(*dir != heading)),
    };

    best.unwrap_or(heading)
}

//! Food placement

use std::time::Duration;

use rand::Rng;

use super::state::{Position, Snake};
use crate::consts::*;
use crate::tuning::FoodTier;

/// Concurrent food count for the latest tier reached at `elapsed`
pub fn food_target(tiers: &[FoodTier], elapsed: Duration) -> usize {
    let elapsed_ms = elapsed.as_millis();
    tiers
        .iter()
        .take_while(|tier| elapsed_ms >= u128::from(tier.from_ms))
        .last()
        .map(|tier| tier.count)
        .unwrap_or(1)
}

/// Draw up to `target` distinct free cells uniformly at random.
///
/// Each item gets `FOOD_PLACEMENT_ATTEMPTS` draws; once an item cannot be
/// placed the batch stops short, so a crowded board yields fewer items
/// rather than looping.
pub fn place_food<R: Rng>(snake: &Snake, target: usize, rng: &mut R) -> Vec<Position> {
    let mut foods: Vec<Position> = Vec::with_capacity(target);

    'items: while foods.len() < target {
        for _ in 0..FOOD_PLACEMENT_ATTEMPTS {
            let candidate = Position::new(
                rng.random_range(0..GRID_WIDTH),
                rng.random_range(0..GRID_HEIGHT),
            );
            if !snake.occupies(candidate) && !foods.contains(&candidate) {
                foods.push(candidate);
                continue 'items;
            }
        }
        log::debug!(
            "Food placement gave up after {} draws ({} of {} placed)",
            FOOD_PLACEMENT_ATTEMPTS,
            foods.len(),
            target
        );
        break;
    }

    foods
}

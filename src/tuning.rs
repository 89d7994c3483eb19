//! Data-driven game balance
//!
//! Everything that shapes difficulty lives here so it can be tweaked from a
//! JSON file without touching the simulation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persistence::StorageError;
use crate::sim::food::food_target;

/// One step of the speed ramp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedStep {
    /// Tick interval once this step applies (ms)
    pub interval_ms: u64,
    /// Added to the threshold once this step applies, giving the threshold
    /// of the following step (ms)
    pub next_after_ms: u64,
}

/// Food item count once elapsed play time reaches `from_ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodTier {
    pub from_ms: u64,
    pub count: usize,
}

/// Errors raised when validating a tuning file.
#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("food award must be non-zero")]
    ZeroAward,
    #[error("initial interval must be non-zero")]
    ZeroInterval,
    #[error("speed step {index} interval {interval_ms}ms is not faster than {previous_ms}ms")]
    NotFaster {
        index: usize,
        interval_ms: u64,
        previous_ms: u64,
    },
    #[error("food tiers must be non-empty")]
    NoFoodTiers,
    #[error("food tier {index} is out of order")]
    UnorderedFoodTier { index: usize },
    #[error("food tier {index} must place at least one item")]
    EmptyFoodTier { index: usize },
}

/// Errors raised when loading a tuning file.
#[derive(Debug, Error)]
pub enum TuningLoadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid tuning: {0}")]
    Invalid(#[from] TuningError),
}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Points per food eaten
    pub food_award: u64,
    /// Tick interval at the start of a run (ms)
    pub initial_interval_ms: u64,
    /// Elapsed play time at which the first speed step applies (ms)
    pub first_speed_up_ms: u64,
    /// Speed ramp, applied in order
    pub speed_steps: Vec<SpeedStep>,
    /// Concurrent food count by elapsed time, ascending `from_ms`
    pub food_tiers: Vec<FoodTier>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            food_award: 10,
            initial_interval_ms: 200,
            first_speed_up_ms: 20_000,
            speed_steps: vec![
                SpeedStep {
                    interval_ms: 150,
                    next_after_ms: 40_000,
                },
                SpeedStep {
                    interval_ms: 120,
                    next_after_ms: 50_000,
                },
                SpeedStep {
                    interval_ms: 100,
                    next_after_ms: 50_000,
                },
                SpeedStep {
                    interval_ms: 80,
                    next_after_ms: 50_000,
                },
            ],
            food_tiers: vec![
                FoodTier {
                    from_ms: 0,
                    count: 1,
                },
                FoodTier {
                    from_ms: 40_000,
                    count: 2,
                },
                FoodTier {
                    from_ms: 80_000,
                    count: 3,
                },
            ],
        }
    }
}

impl Tuning {
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn first_speed_up(&self) -> Duration {
        Duration::from_millis(self.first_speed_up_ms)
    }

    /// Target number of concurrent food items at `elapsed`
    pub fn food_target(&self, elapsed: Duration) -> usize {
        food_target(&self.food_tiers, elapsed)
    }

    /// Check the schedule is a strictly accelerating ramp and the food tiers
    /// are ordered
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.food_award == 0 {
            return Err(TuningError::ZeroAward);
        }
        if self.initial_interval_ms == 0 {
            return Err(TuningError::ZeroInterval);
        }

        let mut previous_ms = self.initial_interval_ms;
        for (index, step) in self.speed_steps.iter().enumerate() {
            if step.interval_ms >= previous_ms {
                return Err(TuningError::NotFaster {
                    index,
                    interval_ms: step.interval_ms,
                    previous_ms,
                });
            }
            previous_ms = step.interval_ms;
        }

        if self.food_tiers.is_empty() {
            return Err(TuningError::NoFoodTiers);
        }
        for (index, tier) in self.food_tiers.iter().enumerate() {
            if tier.count == 0 {
                return Err(TuningError::EmptyFoodTier { index });
            }
            if index > 0 && tier.from_ms <= self.food_tiers[index - 1].from_ms {
                return Err(TuningError::UnorderedFoodTier { index });
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningLoadError> {
        let tuning: Tuning = serde_json::from_str(json).map_err(StorageError::from)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a tuning file from disk
    pub fn load(path: &Path) -> Result<Self, TuningLoadError> {
        let json = std::fs::read_to_string(path).map_err(StorageError::from)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_food_tiers() {
        let tuning = Tuning::default();
        assert_eq!(tuning.food_target(Duration::ZERO), 1);
        assert_eq!(tuning.food_target(Duration::from_millis(39_999)), 1);
        assert_eq!(tuning.food_target(Duration::from_secs(40)), 2);
        assert_eq!(tuning.food_target(Duration::from_secs(80)), 3);
        assert_eq!(tuning.food_target(Duration::from_secs(600)), 3);
    }

    #[test]
    fn test_rejects_slower_step() {
        let mut tuning = Tuning::default();
        tuning.speed_steps[2].interval_ms = 130;
        assert_eq!(
            tuning.validate(),
            Err(TuningError::NotFaster {
                index: 2,
                interval_ms: 130,
                previous_ms: 120
            })
        );
    }

    #[test]
    fn test_rejects_unordered_tiers() {
        let mut tuning = Tuning::default();
        tuning.food_tiers.swap(1, 2);
        assert_eq!(
            tuning.validate(),
            Err(TuningError::UnorderedFoodTier { index: 2 })
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "food_award": 5 }"#).unwrap();
        assert_eq!(tuning.food_award, 5);
        assert_eq!(tuning.initial_interval_ms, 200);
        assert_eq!(tuning.speed_steps.len(), 4);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningLoadError::Storage(StorageError::Json(_)))
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "food_award": 0 }"#),
            Err(TuningLoadError::Invalid(TuningError::ZeroAward))
        ));
    }
}

//! Epsilon-greedy exploration schedule

use nimm_core::ConfigError;
use serde::{Deserialize, Serialize};

/// Exploration and learning-rate settings of a value-function player
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplorationParams {
    /// Starting exploration rate
    pub epsilon0: f64,
    /// Floor the rate never decays below
    pub epsilon_min: f64,
    /// Multiplier applied at each decay step
    pub decay_factor: f64,
    /// Rounds between decay steps
    pub decay_period_rounds: u32,
    /// Step size of the value updates
    pub learning_rate: f64,
}

impl Default for ExplorationParams {
    fn default() -> Self {
        Self {
            epsilon0: 1.0,
            epsilon_min: 0.05,
            decay_factor: 0.996,
            decay_period_rounds: 5,
            learning_rate: 0.001,
        }
    }
}

impl ExplorationParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn bad(field: &'static str, reason: String) -> Result<(), ConfigError> {
            Err(ConfigError::Exploration { field, reason })
        }

        if !(self.epsilon0 > 0.0 && self.epsilon0 <= 1.0) {
            return bad("epsilon0", format!("must be in (0, 1], got {}", self.epsilon0));
        }
        if !(self.epsilon_min > 0.0) {
            return bad("epsilon_min", format!("must be positive, got {}", self.epsilon_min));
        }
        if self.epsilon_min > self.epsilon0 {
            return bad(
                "epsilon_min",
                format!("{} exceeds epsilon0 {}", self.epsilon_min, self.epsilon0),
            );
        }
        if !(self.decay_factor > 0.0 && self.decay_factor <= 1.0) {
            return bad("decay_factor", format!("must be in (0, 1], got {}", self.decay_factor));
        }
        if self.decay_period_rounds == 0 {
            return bad("decay_period_rounds", "must be at least 1".to_string());
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return bad("learning_rate", format!("must be in (0, 1], got {}", self.learning_rate));
        }
        Ok(())
    }
}

/// Current exploration rate of one player
#[derive(Clone, Debug, Serialize)]
pub struct EpsilonSchedule {
    epsilon: f64,
    epsilon_min: f64,
    decay_factor: f64,
    period: u32,
}

impl EpsilonSchedule {
    /// Start a schedule from validated parameters
    pub fn new(params: &ExplorationParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            epsilon: params.epsilon0,
            epsilon_min: params.epsilon_min,
            decay_factor: params.decay_factor,
            period: params.decay_period_rounds,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Decay after round `round` (1-based) if it closes a period.
    /// Returns whether a decay step was taken.
    pub fn end_round(&mut self, round: u32) -> bool {
        if round % self.period != 0 {
            return false;
        }
        self.epsilon = (self.epsilon * self.decay_factor).max(self.epsilon_min);
        true
    }
}

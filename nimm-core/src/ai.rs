//! Fixed (non-learning) strategies

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::GameState;

// ============================================================================
// MOVE RULES
// ============================================================================

/// Uniform legal move: `1..=min(max_removable, remaining)`
pub fn random_take<R: Rng>(remaining: u32, max_removable: u32, rng: &mut R) -> u32 {
    rng.gen_range(1..=max_removable.min(remaining))
}

/// The move that leaves a multiple of `max_removable + 1`, if one exists
pub fn optimal_take(remaining: u32, max_removable: u32) -> Option<u32> {
    match remaining % (max_removable + 1) {
        0 => None,
        r => Some(r),
    }
}

// ============================================================================
// STRATEGY
// ============================================================================

/// Policy of a non-learning computer player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Uniform over legal moves
    Random,
    /// Winning move when there is one, otherwise uniform
    Optimal,
    /// Uniform baseline, replaced by the winning move half of the time
    Mixed,
}

impl Strategy {
    /// Pick a move for the seat to move in `state`
    pub fn choose<R: Rng>(&self, state: &GameState, rng: &mut R) -> u32 {
        let remaining = state.items_remaining();
        let max = state.max_removable();

        match self {
            Strategy::Random => random_take(remaining, max, rng),
            Strategy::Optimal => {
                optimal_take(remaining, max).unwrap_or_else(|| random_take(remaining, max, rng))
            }
            Strategy::Mixed => {
                let baseline = random_take(remaining, max, rng);
                if rng.gen_bool(0.5) {
                    optimal_take(remaining, max).unwrap_or(baseline)
                } else {
                    baseline
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! Move selection - one selector per seat
//!
//! Level 3 - Step-level implementation

use nimm_core::{ConfigError, GameRules, GameState, Outcome, Seat, Strategy};
use nimm_learn::{UrnLearner, UrnTable, ValueLearner, ValueTable};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::{LearningMode, PlayerConfig};

/// Side of the coin for the opening toss
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoinSide {
    Heads,
    Tails,
}

impl CoinSide {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            CoinSide::Heads
        } else {
            CoinSide::Tails
        }
    }
}

/// Source of human decisions, supplied by the I/O layer.
///
/// `choose_take` must answer with a legal move; the orchestrator treats
/// anything else as a bug. `None` means the human left and the match stops.
pub trait HumanInput {
    fn choose_take(&mut self, seat: Seat, state: &GameState) -> Option<u32>;

    fn call_coin(&mut self, seat: Seat) -> Option<CoinSide>;
}

/// Final learning state of a learning seat
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LearnedTable {
    Urn { counters: UrnTable },
    Value { values: ValueTable, epsilon: f64 },
}

/// Decision maker wrapper for one seat
#[derive(Clone, Debug)]
enum Agent {
    Human,
    Fixed(Strategy),
    Urn(UrnLearner),
    Value(ValueLearner),
}

/// Move selector for one seat, with its own random generator
#[derive(Clone, Debug)]
pub struct MoveSelector {
    seat: Seat,
    agent: Agent,
    rng: ChaCha8Rng,
}

impl MoveSelector {
    /// Create a selector for one seat
    pub fn new(seat: Seat, config: &PlayerConfig, rules: &GameRules, seed: u64) -> Result<Self, ConfigError> {
        let agent = match config {
            PlayerConfig::Human => Agent::Human,
            PlayerConfig::Random => Agent::Fixed(Strategy::Random),
            PlayerConfig::Optimal => Agent::Fixed(Strategy::Optimal),
            PlayerConfig::Mixed => Agent::Fixed(Strategy::Mixed),
            PlayerConfig::Learning {
                mode: LearningMode::Reinforcement,
            } => Agent::Urn(UrnLearner::new(rules.items_in_play, rules.max_removable)),
            PlayerConfig::Learning {
                mode: LearningMode::ValueFunction { exploration },
            } => Agent::Value(ValueLearner::new(
                rules.items_in_play,
                rules.max_removable,
                exploration,
            )?),
        };

        Ok(Self {
            seat,
            agent,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn is_human(&self) -> bool {
        matches!(self.agent, Agent::Human)
    }

    /// Current exploration rate of a value-function seat
    pub fn epsilon(&self) -> Option<f64> {
        match &self.agent {
            Agent::Value(learner) => Some(learner.epsilon()),
            _ => None,
        }
    }

    /// Clear the per-round move history
    pub fn start_round(&mut self) {
        match &mut self.agent {
            Agent::Urn(learner) => learner.start_round(),
            Agent::Value(learner) => learner.start_round(),
            Agent::Human | Agent::Fixed(_) => {}
        }
    }

    /// Pick a move for this seat; `None` only when a human leaves.
    ///
    /// # Panics
    /// Panics if this is a human seat and no input is given.
    pub fn choose(&mut self, state: &GameState, human: Option<&mut dyn HumanInput>) -> Option<u32> {
        let position = state.items_remaining();
        match &mut self.agent {
            Agent::Human => {
                let input = human.unwrap_or_else(|| panic!("seat {} has no human input", self.seat.number()));
                input.choose_take(self.seat, state)
            }
            Agent::Fixed(strategy) => Some(strategy.choose(state, &mut self.rng)),
            Agent::Urn(learner) => Some(learner.select(position, &mut self.rng)),
            Agent::Value(learner) => Some(learner.select(position, &mut self.rng)),
        }
    }

    /// Apply the round outcome to a learning seat, then decay its
    /// exploration rate if `round` closes a period
    pub fn finish_round(&mut self, outcome: Outcome, round: u32) {
        match &mut self.agent {
            Agent::Urn(learner) => learner.finish_round(outcome),
            Agent::Value(learner) => {
                if learner.end_round(round) {
                    tracing::trace!(
                        "seat {} epsilon now {:.4}",
                        self.seat.number(),
                        learner.epsilon()
                    );
                }
                learner.finish_round(outcome);
            }
            Agent::Human | Agent::Fixed(_) => {}
        }
    }

    /// Learning state, for learning seats
    pub fn learned_table(&self) -> Option<LearnedTable> {
        match &self.agent {
            Agent::Urn(learner) => Some(LearnedTable::Urn {
                counters: learner.table().clone(),
            }),
            Agent::Value(learner) => Some(LearnedTable::Value {
                values: learner.table().clone(),
                epsilon: learner.epsilon(),
            }),
            Agent::Human | Agent::Fixed(_) => None,
        }
    }

    /// Consume the selector, keeping its learning state
    pub fn into_learned_table(self) -> Option<LearnedTable> {
        match self.agent {
            Agent::Urn(learner) => Some(LearnedTable::Urn {
                counters: learner.into_table(),
            }),
            Agent::Value(learner) => {
                let epsilon = learner.epsilon();
                Some(LearnedTable::Value {
                    values: learner.into_table(),
                    epsilon,
                })
            }
            Agent::Human | Agent::Fixed(_) => None,
        }
    }
}

//! Value-function learner (tabular TD(0) with epsilon-greedy play)

use nimm_core::{random_take, ConfigError, Outcome};
use rand::Rng;
use serde::Serialize;

use crate::schedule::{EpsilonSchedule, ExplorationParams};

// ============================================================================
// VALUE TABLE
// ============================================================================

/// Estimated terminal reward for the player to move, per position
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValueTable {
    values: Vec<f64>,
}

impl ValueTable {
    pub fn new(items_in_play: u32) -> Self {
        Self {
            values: vec![0.0; items_in_play as usize],
        }
    }

    pub fn positions(&self) -> u32 {
        self.values.len() as u32
    }

    /// Value of `position` (1-based)
    pub fn get(&self, position: u32) -> f64 {
        self.values[Self::index(position)]
    }

    pub fn set(&mut self, position: u32, value: f64) {
        self.values[Self::index(position)] = value;
    }

    /// Values for positions `1..=positions`
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Move `position` a step of `rate` toward `target`
    fn nudge(&mut self, position: u32, target: f64, rate: f64) {
        let v = &mut self.values[Self::index(position)];
        *v += rate * (target - *v);
    }

    fn index(position: u32) -> usize {
        assert!(position >= 1, "positions are 1-based");
        position as usize - 1
    }
}

// ============================================================================
// VALUE LEARNER
// ============================================================================

/// Value-function learner for one seat
#[derive(Clone, Debug)]
pub struct ValueLearner {
    table: ValueTable,
    max_removable: u32,
    learning_rate: f64,
    schedule: EpsilonSchedule,
    /// Positions visited this round, in order
    history: Vec<u32>,
}

impl ValueLearner {
    /// Fresh learner; fails on invalid exploration parameters
    pub fn new(items_in_play: u32, max_removable: u32, params: &ExplorationParams) -> Result<Self, ConfigError> {
        Ok(Self {
            table: ValueTable::new(items_in_play),
            max_removable,
            learning_rate: params.learning_rate,
            schedule: EpsilonSchedule::new(params)?,
            history: Vec::new(),
        })
    }

    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut ValueTable {
        &mut self.table
    }

    pub fn into_table(self) -> ValueTable {
        self.table
    }

    pub fn epsilon(&self) -> f64 {
        self.schedule.epsilon()
    }

    pub fn history(&self) -> &[u32] {
        &self.history
    }

    pub fn start_round(&mut self) {
        self.history.clear();
    }

    /// Epsilon-greedy move at `position`; the position is recorded
    pub fn select<R: Rng>(&mut self, position: u32, rng: &mut R) -> u32 {
        let take = if rng.gen::<f64>() < self.schedule.epsilon() {
            random_take(position, self.max_removable, rng)
        } else {
            self.greedy(position)
        };
        self.history.push(position);
        take
    }

    /// Take the whole pile when possible, otherwise leave the opponent the
    /// lowest-valued position (smallest move on ties)
    pub fn greedy(&self, position: u32) -> u32 {
        if position <= self.max_removable {
            return position;
        }

        let mut best_take = 1;
        let mut best_value = self.table.get(position - 1);
        for take in 2..=self.max_removable {
            let value = self.table.get(position - take);
            if value < best_value {
                best_value = value;
                best_take = take;
            }
        }
        best_take
    }

    /// Backward TD(0) sweep over this round's positions, then clear them
    pub fn finish_round(&mut self, outcome: Outcome) {
        let rate = self.learning_rate;
        let mut target = outcome.reward();
        for &position in self.history.iter().rev() {
            self.table.nudge(position, target, rate);
            target = self.table.get(position);
        }
        self.history.clear();
    }

    /// Decay epsilon after round `round` (1-based)
    pub fn end_round(&mut self, round: u32) -> bool {
        self.schedule.end_round(round)
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! Urn (ball-counting) reinforcement learner
//!
//! Every position holds one counter per move size. A move is drawn from an
//! urn filled in proportion to the counters; after the round the counters of
//! the moves the player made grow by one on a win and shrink by one on a loss.

use nimm_core::Outcome;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::ser::{Serialize, Serializer};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Balls per legal move in a fresh (or reset) position
const INITIAL_BALLS: u32 = 2;

/// Divisor compressing counters into urn tickets: `0 + 1 + ... + (max - 1)`
pub fn ticket_divisor(max_removable: u32) -> u32 {
    (0..max_removable).sum()
}

// ============================================================================
// URN TABLE
// ============================================================================

/// Counters indexed by `(position, move_index)`, `move_index = take - 1`.
///
/// Stored as a single row-major buffer so every position owns its own row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrnTable {
    positions: u32,
    width: usize,
    counters: Vec<u32>,
}

impl UrnTable {
    pub fn new(items_in_play: u32, max_removable: u32) -> Self {
        let width = max_removable as usize;
        let mut table = Self {
            positions: items_in_play,
            width,
            counters: vec![0; items_in_play as usize * width],
        };
        for position in 1..=items_in_play {
            table.reset_row(position);
        }
        table
    }

    /// Number of positions (the full pile size)
    pub fn positions(&self) -> u32 {
        self.positions
    }

    pub fn max_removable(&self) -> u32 {
        self.width as u32
    }

    /// Counters of `position` (1-based)
    pub fn row(&self, position: u32) -> &[u32] {
        let start = self.offset(position);
        &self.counters[start..start + self.width]
    }

    /// Rows for positions `1..=positions`
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.counters.chunks(self.width)
    }

    pub fn counter(&self, position: u32, move_index: usize) -> u32 {
        self.row(position)[move_index]
    }

    /// Add one ball for a move that led to a win
    pub fn reinforce(&mut self, position: u32, move_index: usize) {
        let idx = self.offset(position) + move_index;
        self.counters[idx] += 1;
    }

    /// Remove one ball for a move that led to a loss.
    ///
    /// Returns true when the row ran empty and was reset to its initial pattern.
    pub fn punish(&mut self, position: u32, move_index: usize) -> bool {
        let idx = self.offset(position) + move_index;
        self.counters[idx] = self.counters[idx].saturating_sub(1);

        if self.row(position).iter().all(|&c| c == 0) {
            self.reset_row(position);
            true
        } else {
            false
        }
    }

    /// Initial pattern: moves larger than the position get no balls
    fn reset_row(&mut self, position: u32) {
        let start = self.offset(position);
        for (k, counter) in self.counters[start..start + self.width].iter_mut().enumerate() {
            *counter = if (k as u32) < position { INITIAL_BALLS } else { 0 };
        }
    }

    fn offset(&self, position: u32) -> usize {
        assert!(
            position >= 1 && position <= self.positions,
            "position {} outside 1..={}",
            position,
            self.positions
        );
        (position as usize - 1) * self.width
    }
}

impl Serialize for UrnTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

// ============================================================================
// URN LEARNER
// ============================================================================

/// A draw made during the current round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UrnChoice {
    pub position: u32,
    pub move_index: usize,
}

/// Reinforcement learner for one seat
#[derive(Clone, Debug)]
pub struct UrnLearner {
    table: UrnTable,
    divisor: u32,
    history: Vec<UrnChoice>,
}

impl UrnLearner {
    pub fn new(items_in_play: u32, max_removable: u32) -> Self {
        Self {
            table: UrnTable::new(items_in_play, max_removable),
            divisor: ticket_divisor(max_removable).max(1),
            history: Vec::new(),
        }
    }

    pub fn table(&self) -> &UrnTable {
        &self.table
    }

    pub fn into_table(self) -> UrnTable {
        self.table
    }

    /// Draws recorded this round
    pub fn history(&self) -> &[UrnChoice] {
        &self.history
    }

    /// Forget the previous round's draws
    pub fn start_round(&mut self) {
        self.history.clear();
    }

    /// Draw a move at `position` and record it
    pub fn select<R: Rng>(&mut self, position: u32, rng: &mut R) -> u32 {
        let mut urn = self.fill_urn(position);
        assert!(!urn.is_empty(), "empty urn at position {}", position);

        urn.shuffle(rng);
        let move_index = urn[rng.gen_range(0..urn.len())];

        self.history.push(UrnChoice { position, move_index });
        move_index as u32 + 1
    }

    /// Tickets for every legal move, `ceil(counter / divisor)` each
    fn fill_urn(&self, position: u32) -> Vec<usize> {
        let mut urn = Vec::new();
        for (k, &counter) in self.table.row(position).iter().enumerate() {
            if k as u32 + 1 > position {
                break;
            }
            let tickets = counter.div_ceil(self.divisor);
            urn.extend(std::iter::repeat(k).take(tickets as usize));
        }
        urn
    }

    /// Apply the round's outcome to every recorded draw, then clear them
    pub fn finish_round(&mut self, outcome: Outcome) {
        for choice in self.history.drain(..) {
            match outcome {
                Outcome::Win => self.table.reinforce(choice.position, choice.move_index),
                Outcome::Loss => {
                    if self.table.punish(choice.position, choice.move_index) {
                        tracing::trace!("urn reset at position {}", choice.position);
                    }
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

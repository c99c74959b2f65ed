//! Round state and turn ownership

use serde::{Deserialize, Serialize};

use crate::rules::GameRules;

// ============================================================================
// CORE TYPES
// ============================================================================

/// One of the two seats at the table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    One = 0,
    Two = 1,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::One, Seat::Two];

    pub fn opponent(self) -> Self {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }

    /// Index into per-seat arrays
    pub fn index(self) -> usize {
        self as usize
    }

    /// 1-based seat number for display
    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

/// Round outcome from one seat's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    /// Terminal reward handed to the learners
    pub fn reward(self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Loss => -1.0,
        }
    }
}

/// Round result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    Won(Seat),
}

/// Seat owning a 1-based turn index: odd turns belong to the starter
pub fn active_player(turn_index: u32, first: Seat) -> Seat {
    if turn_index % 2 != 0 {
        first
    } else {
        first.opponent()
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// State of a single round
#[derive(Clone, Debug)]
pub struct GameState {
    items_in_play: u32,
    max_removable: u32,
    items_remaining: u32,
    /// 1-based index of the turn about to be played
    turn_index: u32,
    first: Seat,
    result: GameResult,
}

impl GameState {
    /// Fresh round with the full pile
    pub fn new(rules: &GameRules, first: Seat) -> Self {
        Self {
            items_in_play: rules.items_in_play,
            max_removable: rules.max_removable,
            items_remaining: rules.items_in_play,
            turn_index: 1,
            first,
            result: GameResult::Ongoing,
        }
    }

    pub fn items_in_play(&self) -> u32 {
        self.items_in_play
    }

    pub fn max_removable(&self) -> u32 {
        self.max_removable
    }

    pub fn items_remaining(&self) -> u32 {
        self.items_remaining
    }

    pub fn turn_index(&self) -> u32 {
        self.turn_index
    }

    /// Seat that started this round
    pub fn first_player(&self) -> Seat {
        self.first
    }

    /// Seat to move
    pub fn current_player(&self) -> Seat {
        active_player(self.turn_index, self.first)
    }

    /// Largest legal move right now
    pub fn max_take(&self) -> u32 {
        self.max_removable.min(self.items_remaining)
    }

    pub fn is_legal(&self, take: u32) -> bool {
        self.result == GameResult::Ongoing && take >= 1 && take <= self.max_take()
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.result != GameResult::Ongoing
    }

    /// Remove `take` items for the seat to move.
    ///
    /// # Panics
    /// Panics on an illegal move; every policy produces legal moves by
    /// construction, so an illegal one is a bug in the caller.
    pub fn apply_move(&mut self, take: u32) -> GameResult {
        assert!(
            self.is_legal(take),
            "illegal move: take {} with {} remaining (max {})",
            take,
            self.items_remaining,
            self.max_removable
        );

        let mover = self.current_player();
        self.items_remaining -= take;
        if self.items_remaining == 0 {
            self.result = GameResult::Won(mover);
        } else {
            self.turn_index += 1;
        }
        self.result
    }
}

// ============================================================================
// TESTS
// ============================================================================

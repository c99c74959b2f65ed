//! Scoreboard - win counts and rolling win rates
//!
//! Level 4 - Utilities

use std::collections::VecDeque;

use nimm_core::Seat;
use serde::Serialize;

/// Rounds in the rolling window
pub const ROLLING_WINDOW: usize = 10;

/// Rolling rate (percent) a player must hold to count as having learned
pub const SUSTAINED_RATE: f64 = 50.0;

/// Copy of the scoreboard handed to observers
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScoreSnapshot {
    pub wins: [u32; 2],
    /// Percent of the last `ROLLING_WINDOW` rounds won (0 until the window fills)
    pub rolling_rate: [f64; 2],
    /// Round from which the rolling rate has stayed at or above 50%
    pub sustained_since: [Option<u32>; 2],
}

/// Running statistics for both seats
#[derive(Clone, Debug, Default)]
pub struct Scoreboard {
    wins: [u32; 2],
    /// Winners of the most recent rounds, oldest first
    window: VecDeque<Seat>,
    rolling_rate: [f64; 2],
    sustained_since: [Option<u32>; 2],
    rounds: u32,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the winner of round `round` (1-based)
    pub fn record(&mut self, round: u32, winner: Seat) {
        self.rounds += 1;
        self.wins[winner.index()] += 1;

        self.window.push_back(winner);
        if self.window.len() > ROLLING_WINDOW {
            self.window.pop_front();
        }

        if self.window.len() == ROLLING_WINDOW {
            for seat in Seat::BOTH {
                let won = self.window.iter().filter(|&&w| w == seat).count();
                self.rolling_rate[seat.index()] = 100.0 * won as f64 / ROLLING_WINDOW as f64;
            }
        }

        for seat in Seat::BOTH {
            let i = seat.index();
            match self.sustained_since[i] {
                None if self.rolling_rate[i] >= SUSTAINED_RATE => self.sustained_since[i] = Some(round),
                Some(_) if self.rolling_rate[i] < SUSTAINED_RATE => self.sustained_since[i] = None,
                _ => {}
            }
        }
    }

    pub fn wins(&self, seat: Seat) -> u32 {
        self.wins[seat.index()]
    }

    pub fn rolling_rate(&self, seat: Seat) -> f64 {
        self.rolling_rate[seat.index()]
    }

    pub fn sustained_since(&self, seat: Seat) -> Option<u32> {
        self.sustained_since[seat.index()]
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            wins: self.wins,
            rolling_rate: self.rolling_rate,
            sustained_since: self.sustained_since,
        }
    }
}

//! Progress events for renderers and progress bars

use nimm_core::Seat;
use serde::Serialize;

use crate::stats::ScoreSnapshot;

/// A move that was just applied
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MoveEvent {
    pub round: u32,
    pub turn_index: u32,
    pub mover: Seat,
    pub take: u32,
    /// Items left after the move
    pub items_remaining: u32,
}

/// A round that just ended, after the learners were updated
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RoundEvent {
    pub round: u32,
    pub first_player: Seat,
    pub winner: Seat,
    pub scores: ScoreSnapshot,
}

/// Callbacks invoked by the orchestrator; all default to no-ops
pub trait MatchObserver {
    /// Before round 1, once the starter is known
    fn on_match_start(&mut self, _first_player: Seat) {}

    /// Fresh pile laid out, before the first move of `round`
    fn on_round_start(&mut self, _round: u32, _first_player: Seat) {}

    fn on_move(&mut self, _event: &MoveEvent) {}

    fn on_round_end(&mut self, _event: &RoundEvent) {}
}

/// Observer that ignores everything
pub struct NoopObserver;

impl MatchObserver for NoopObserver {}

/// Keeps every event; handy in tests
#[derive(Default)]
pub struct EventLog {
    pub first_player: Option<Seat>,
    /// Round number and starter of every round begun
    pub round_starts: Vec<(u32, Seat)>,
    pub moves: Vec<MoveEvent>,
    pub rounds: Vec<RoundEvent>,
}

impl MatchObserver for EventLog {
    fn on_match_start(&mut self, first_player: Seat) {
        self.first_player = Some(first_player);
    }

    fn on_round_start(&mut self, round: u32, first_player: Seat) {
        self.round_starts.push((round, first_player));
    }

    fn on_move(&mut self, event: &MoveEvent) {
        self.moves.push(*event);
    }

    fn on_round_end(&mut self, event: &RoundEvent) {
        self.rounds.push(*event);
    }
}

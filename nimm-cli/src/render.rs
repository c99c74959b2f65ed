//! Text rendering of a match in progress

use std::io::Write;

use nimm_core::Seat;
use nimm_match::{MatchObserver, MoveEvent, RoundEvent};

/// Draw `remaining` items as `| ` with an extra gap after every
/// `max_removable + 1` items
pub fn draw_pile(remaining: u32, max_removable: u32) -> String {
    let group = max_removable + 1;
    let mut pile = String::with_capacity(remaining as usize * 2 + (remaining / group) as usize);
    for i in 1..=remaining {
        pile.push_str("| ");
        if i % group == 0 {
            pile.push(' ');
        }
    }
    pile
}

/// Display names of the two seats
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeatNames([String; 2]);

impl SeatNames {
    /// Missing or blank names fall back to "Player 1" / "Player 2"
    pub fn new(one: Option<&str>, two: Option<&str>) -> Self {
        let pick = |name: Option<&str>, seat: Seat| match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Player {}", seat.number()),
        };
        Self([pick(one, Seat::One), pick(two, Seat::Two)])
    }

    pub fn get(&self, seat: Seat) -> &str {
        &self.0[seat.index()]
    }
}

impl Default for SeatNames {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Observer that prints every move and round result
pub struct Renderer<W: Write> {
    out: W,
    names: SeatNames,
    items_in_play: u32,
    max_removable: u32,
    show_scores: bool,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, names: SeatNames, items_in_play: u32, max_removable: u32, show_scores: bool) -> Self {
        Self {
            out,
            names,
            items_in_play,
            max_removable,
            show_scores,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MatchObserver for Renderer<W> {
    fn on_match_start(&mut self, first_player: Seat) {
        writeln!(self.out, "{} starts", self.names.get(first_player)).ok();
    }

    fn on_round_start(&mut self, round: u32, _first_player: Seat) {
        writeln!(self.out, "\n--- Round {} ---", round).ok();
        writeln!(self.out, "{}", draw_pile(self.items_in_play, self.max_removable)).ok();
    }

    fn on_move(&mut self, event: &MoveEvent) {
        writeln!(self.out, "{} takes {}", self.names.get(event.mover), event.take).ok();
        writeln!(self.out, "{}", draw_pile(event.items_remaining, self.max_removable)).ok();
    }

    fn on_round_end(&mut self, event: &RoundEvent) {
        writeln!(self.out, "{} wins round {}", self.names.get(event.winner), event.round).ok();
        if self.show_scores {
            writeln!(
                self.out,
                "\nScores: {} {} - {} {}\n",
                self.names.get(Seat::One),
                event.scores.wins[0],
                event.scores.wins[1],
                self.names.get(Seat::Two)
            )
            .ok();
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

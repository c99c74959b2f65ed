//! Human input from a terminal

use dialoguer::{Input, Select};
use nimm_core::{GameState, Seat};
use nimm_match::{CoinSide, HumanInput};

use crate::render::SeatNames;

/// Asks the seated humans through interactive terminal prompts.
///
/// The pile itself is drawn by the renderer before every prompt.
pub struct TermInput {
    names: SeatNames,
}

impl TermInput {
    pub fn new(names: SeatNames) -> Self {
        Self { names }
    }
}

impl HumanInput for TermInput {
    fn choose_take(&mut self, seat: Seat, state: &GameState) -> Option<u32> {
        let max = state.max_take();
        let answer = Input::<String>::new()
            .with_prompt(format!("{}, how many items do you take (1-{})", self.names.get(seat), max))
            .validate_with(move |text: &String| -> Result<(), String> { parse_take(text, max).map(|_| ()) })
            .report(false)
            .interact();
        answered(self.names.get(seat), answer).and_then(|text| parse_take(&text, max).ok())
    }

    fn call_coin(&mut self, seat: Seat) -> Option<CoinSide> {
        let sides = [CoinSide::Heads, CoinSide::Tails];
        let labels: &[&str] = &["Heads", "Tails"];
        let choice = Select::new()
            .with_prompt(format!("{}, call the coin", self.names.get(seat)))
            .report(false)
            .items(labels)
            .default(0)
            .interact();
        answered(self.names.get(seat), choice).map(|i| sides[i])
    }
}

/// A prompt that failed (closed terminal, interrupted read) means the
/// player left
fn answered<T>(name: &str, result: dialoguer::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("No answer from {}: {}", name, e);
            None
        }
    }
}

/// Parse a move and check it lies in `1..=max`
pub fn parse_take(text: &str, max: u32) -> Result<u32, String> {
    let take: u32 = text
        .trim()
        .parse()
        .map_err(|_| format!("Enter a whole number from 1 to {}", max))?;
    if !(1..=max).contains(&take) {
        return Err(format!("You may take 1 to {} items", max));
    }
    Ok(take)
}

// ============================================================================
// TESTS
// ============================================================================

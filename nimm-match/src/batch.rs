//! Batch training - independent copies of one match
//!
//! Level 2 - Phases

use nimm_core::{ConfigError, Seat};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{MatchConfig, PlayerConfig};
use crate::orchestrator::{MatchOrchestrator, MatchResult};

/// Seed used for match 0 when the config has none
const DEFAULT_BASE_SEED: u64 = 42;

/// Aggregate statistics over a batch
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchSummary {
    pub players: [PlayerConfig; 2],
    pub matches: usize,
    pub rounds_per_match: u32,
    pub base_seed: u64,
    pub mean_wins: [f64; 2],
    pub mean_rolling_rate: [f64; 2],
    /// Matches whose final rolling rate was sustained at or above 50%
    pub sustained_matches: [usize; 2],
    /// Mean round at which the sustained stretch began, over those matches
    pub mean_sustained_since: [Option<f64>; 2],
}

impl BatchSummary {
    pub fn from_results(config: &MatchConfig, base_seed: u64, results: &[MatchResult]) -> Self {
        let mut summary = Self {
            players: config.players,
            matches: results.len(),
            rounds_per_match: config.rules.round_count,
            base_seed,
            mean_wins: [0.0; 2],
            mean_rolling_rate: [0.0; 2],
            sustained_matches: [0; 2],
            mean_sustained_since: [None; 2],
        };

        for seat in Seat::BOTH {
            let i = seat.index();
            summary.mean_wins[i] = mean(results, |r| r.wins_for(seat) as f64);
            summary.mean_rolling_rate[i] = mean(results, |r| r.rolling_rate_for(seat));

            let sustained: Vec<u32> = results.iter().filter_map(|r| r.sustained_since_for(seat)).collect();
            summary.sustained_matches[i] = sustained.len();
            if !sustained.is_empty() {
                let total: f64 = sustained.iter().map(|&r| r as f64).sum();
                summary.mean_sustained_since[i] = Some(total / sustained.len() as f64);
            }
        }

        summary
    }
}

fn mean<F: Fn(&MatchResult) -> f64>(results: &[MatchResult], f: F) -> f64 {
    if results.is_empty() {
        0.0
    } else {
        results.iter().map(f).sum::<f64>() / results.len() as f64
    }
}

/// Run `matches` copies of `config` and summarize them
pub fn run_batch(
    config: &MatchConfig,
    matches: usize,
    parallel: bool,
) -> Result<(BatchSummary, Vec<MatchResult>), ConfigError> {
    run_batch_with_progress(config, matches, parallel, || {})
}

/// Same as [`run_batch`], calling `on_match_done` after every match
pub fn run_batch_with_progress<F>(
    config: &MatchConfig,
    matches: usize,
    parallel: bool,
    on_match_done: F,
) -> Result<(BatchSummary, Vec<MatchResult>), ConfigError>
where
    F: Fn() + Sync,
{
    // Validate once up front; every copy differs only by seed
    MatchOrchestrator::new(config.clone())?;

    let base_seed = config.seed.unwrap_or(DEFAULT_BASE_SEED);
    tracing::info!(
        "Running {} matches of {} rounds ({})",
        matches,
        config.rules.round_count,
        if parallel { "parallel" } else { "sequential" }
    );

    let play = |index: usize| -> Result<MatchResult, ConfigError> {
        let seeded = config.clone().with_seed(base_seed.wrapping_add(index as u64));
        let result = MatchOrchestrator::new(seeded)?.run_match();
        on_match_done();
        Ok(result)
    };

    let results = if parallel {
        (0..matches).into_par_iter().map(play).collect::<Result<Vec<_>, _>>()?
    } else {
        (0..matches).map(play).collect::<Result<Vec<_>, _>>()?
    };

    let summary = BatchSummary::from_results(config, base_seed, &results);
    tracing::info!(
        "Batch finished: mean wins {:.1} / {:.1}",
        summary.mean_wins[0],
        summary.mean_wins[1]
    );
    Ok((summary, results))
}

// ============================================================================
// TESTS
// ============================================================================

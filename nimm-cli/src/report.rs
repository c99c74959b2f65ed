//! Match and batch reports, as text or JSON

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use nimm_core::Seat;
use nimm_match::{BatchSummary, LearnedTable, MatchResult};
use serde::Serialize;

use crate::render::SeatNames;

/// Report payload stamped with its generation time
#[derive(Serialize)]
struct Report<'a, T: Serialize> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    body: &'a T,
}

fn stamped<T: Serialize>(body: &T) -> Report<'_, T> {
    Report {
        generated_at: Utc::now(),
        body,
    }
}

/// Render any report body as pretty JSON with a timestamp
pub fn to_json<T: Serialize>(body: &T) -> Result<String> {
    serde_json::to_string_pretty(&stamped(body)).context("Failed to serialize report")
}

/// Write a JSON report to `path`
pub fn save_json<T: Serialize>(body: &T, path: &Path) -> Result<()> {
    let content = to_json(body)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write report: {}", path.display()))
}

// ============================================================================
// MATCH REPORT
// ============================================================================

pub fn print_match_json(result: &MatchResult) -> Result<()> {
    println!("{}", to_json(result)?);
    Ok(())
}

pub fn print_match_text(result: &MatchResult, names: &SeatNames) -> Result<()> {
    write_match_text(&mut io::stdout().lock(), result, names).context("Failed to print report")
}

fn write_match_text<W: Write>(out: &mut W, result: &MatchResult, names: &SeatNames) -> io::Result<()> {
    writeln!(out, "\n=== Match Results ===")?;
    writeln!(
        out,
        "Rules: {} items, take 1-{}, {} rounds ({} started)",
        result.rules.items_in_play,
        result.rules.max_removable,
        result.rounds_played,
        names.get(result.first_player)
    )?;
    if result.abandoned {
        writeln!(
            out,
            "Stopped early after {} of {} rounds",
            result.rounds_played, result.rules.round_count
        )?;
    }

    for seat in Seat::BOTH {
        let player = &result.players[seat.index()];
        writeln!(out, "\n{} (seat {}): {}", names.get(seat), seat.number(), player.label())?;
        writeln!(
            out,
            "  Wins:              {} ({:.1}%)",
            result.wins_for(seat),
            result.win_rate(seat) * 100.0
        )?;
        writeln!(out, "  Rolling rate (%):  {:.0}", result.rolling_rate_for(seat))?;
        if player.is_learning() {
            match result.sustained_since_for(seat) {
                Some(round) => writeln!(out, "  Learned since:     round {}", round)?,
                None => writeln!(out, "  Learned since:     -")?,
            }
        }
        if let Some(params) = player.exploration() {
            writeln!(
                out,
                "  Exploration:       e0={} min={} decay={} period={} lr={}",
                params.epsilon0,
                params.epsilon_min,
                params.decay_factor,
                params.decay_period_rounds,
                params.learning_rate
            )?;
        }
    }

    for seat in Seat::BOTH {
        if let Some(table) = result.table_for(seat) {
            write_table(out, names.get(seat), table)?;
        }
    }
    Ok(())
}

fn write_table<W: Write>(out: &mut W, name: &str, table: &LearnedTable) -> io::Result<()> {
    writeln!(out, "\n*** {} ***", name)?;
    match table {
        LearnedTable::Urn { counters } => {
            for (i, row) in counters.rows().enumerate() {
                writeln!(out, "  items {:>3}: {:?}", i + 1, row)?;
            }
        }
        LearnedTable::Value { values, epsilon } => {
            writeln!(out, "  epsilon: {:.4}", epsilon)?;
            for (i, value) in values.values().iter().enumerate() {
                writeln!(out, "  state {:>3}: {:+.4}", i + 1, value)?;
            }
        }
    }
    Ok(())
}

// ============================================================================
// BATCH REPORT
// ============================================================================

pub fn print_batch_json(summary: &BatchSummary) -> Result<()> {
    println!("{}", to_json(summary)?);
    Ok(())
}

pub fn print_batch_text(summary: &BatchSummary) {
    println!("\n=== Batch Results ===");
    println!(
        "{} matches of {} rounds (seeds {}..{})",
        summary.matches,
        summary.rounds_per_match,
        summary.base_seed,
        summary.base_seed.wrapping_add(summary.matches as u64)
    );

    for seat in Seat::BOTH {
        let i = seat.index();
        println!("\nSeat {}: {}", seat.number(), summary.players[i].label());
        println!("  Mean wins:         {:.1}", summary.mean_wins[i]);
        println!("  Mean rolling (%):  {:.1}", summary.mean_rolling_rate[i]);
        println!(
            "  Sustained >= 50%:  {} of {} matches",
            summary.sustained_matches[i], summary.matches
        );
        if let Some(mean) = summary.mean_sustained_since[i] {
            println!("  Mean since round:  {:.0}", mean);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

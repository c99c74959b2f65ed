//! Batch command - train many seeded copies of one match
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: resolve_config(), run_batch_with_progress(), report_results()

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use nimm_match::{run_batch_with_progress, BatchSummary, MatchResult};

use crate::play_cmd::{resolve_config, ConfigArgs};
use crate::report;

#[derive(Args)]
pub struct BatchArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// Number of matches to run
    #[arg(long, default_value = "8")]
    pub matches: usize,

    /// Run matches one after another instead of in parallel
    #[arg(long)]
    pub sequential: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Also write the summary and per-match results to a JSON file
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Run batch command
pub fn run(args: BatchArgs, seed: Option<u64>) -> Result<()> {
    let config = resolve_config(&args.source, seed)?;
    if config.has_human() {
        bail!("Batch mode cannot seat human players");
    }

    let bar = ProgressBar::new(args.matches as u64);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} matches [{elapsed_precise}]",
    )?);

    let (summary, results) = run_batch_with_progress(&config, args.matches, !args.sequential, || bar.inc(1))?;
    bar.finish_and_clear();

    if let Some(path) = &args.output {
        report::save_json(&BatchFile { summary: &summary, results: &results }, path)?;
        tracing::info!("Results saved to {}", path.display());
    }

    report_results(&summary, args.json)
}

/// Layout of the `--output` file
#[derive(serde::Serialize)]
struct BatchFile<'a> {
    summary: &'a BatchSummary,
    results: &'a [MatchResult],
}

fn report_results(summary: &BatchSummary, json: bool) -> Result<()> {
    if json {
        report::print_batch_json(summary)
    } else {
        report::print_batch_text(summary);
        Ok(())
    }
}

//! Play command - run one match
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: resolve_config(), play_match(), report_results()
//! - Level 3: build_observer(), apply_overrides()
//! - Level 4: argument parsing utilities

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use nimm_core::GameRules;
use nimm_learn::ExplorationParams;
use nimm_match::{MatchConfig, MatchObserver, MatchOrchestrator, MatchResult, PlayerConfig, RoundEvent};

use crate::human::TermInput;
use crate::render::{Renderer, SeatNames};
use crate::report;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Where the match config comes from, shared by `play` and `batch`
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigArgs {
    /// Match config JSON file
    #[arg(long, value_name = "FILE", conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Built-in preset (see `nimm presets`)
    #[arg(long)]
    pub preset: Option<String>,

    /// Items in play at the start of each round
    #[arg(long)]
    pub items: Option<u32>,

    /// Most items a player may take per turn
    #[arg(long)]
    pub max_take: Option<u32>,

    /// Number of rounds in the match
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Seat 1 player: human, random, optimal, mixed, reinforcement, value
    #[arg(long)]
    pub player1: Option<String>,

    /// Seat 2 player: human, random, optimal, mixed, reinforcement, value
    #[arg(long)]
    pub player2: Option<String>,

    /// Exploration for value players: e0,emin,decay,period,lr
    #[arg(long, value_name = "E0,EMIN,DECAY,PERIOD,LR")]
    pub exploration: Option<String>,

    /// Write the resolved config to a JSON file
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,
}

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// Print every move
    #[arg(long)]
    pub show: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Display name of seat 1
    #[arg(long, value_name = "NAME")]
    pub name1: Option<String>,

    /// Display name of seat 2
    #[arg(long, value_name = "NAME")]
    pub name2: Option<String>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// This function reads like a table of contents:
/// 1. Resolve the match config
/// 2. Play the match
/// 3. Report results
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = resolve_config(&args.source, seed)?;
    let names = SeatNames::new(args.name1.as_deref(), args.name2.as_deref());

    let result = play_match(config, &names, args.show)?;

    report_results(&result, &names, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Build the config from file, preset or defaults, then apply flag overrides
pub fn resolve_config(args: &ConfigArgs, seed: Option<u64>) -> Result<MatchConfig> {
    let base = match (&args.config, &args.preset) {
        (Some(path), _) => MatchConfig::load(path)?,
        (None, Some(name)) => MatchConfig::preset(name)?,
        (None, None) => MatchConfig::default(),
    };

    let mut config = apply_overrides(base, args)?;
    if seed.is_some() {
        config.seed = seed;
    }
    config.validate()?;

    if let Some(path) = &args.save_config {
        config
            .save(path)
            .with_context(|| format!("Failed to save config: {}", path.display()))?;
        tracing::info!("Config saved to {}", path.display());
    }

    Ok(config)
}

/// Play the match, rendering moves or showing progress
fn play_match(config: MatchConfig, names: &SeatNames, show: bool) -> Result<MatchResult> {
    let rules = config.rules;
    let has_human = config.has_human();

    let orchestrator = if has_human {
        MatchOrchestrator::with_human_input(config, Box::new(TermInput::new(names.clone())))?
    } else {
        MatchOrchestrator::new(config)?
    };

    let result = if show || has_human {
        let mut renderer = Renderer::new(
            std::io::stdout(),
            names.clone(),
            rules.items_in_play,
            rules.max_removable,
            has_human,
        );
        orchestrator.run_with_observer(&mut renderer)
    } else {
        let mut progress = RoundProgress::new(rules.round_count)?;
        let result = orchestrator.run_with_observer(&mut progress);
        progress.bar.finish_and_clear();
        result
    };

    Ok(result)
}

fn report_results(result: &MatchResult, names: &SeatNames, json: bool) -> Result<()> {
    if json {
        report::print_match_json(result)
    } else {
        report::print_match_text(result, names)
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Progress bar advanced once per round
struct RoundProgress {
    bar: ProgressBar,
}

impl RoundProgress {
    fn new(rounds: u32) -> Result<Self> {
        let bar = ProgressBar::new(rounds as u64);
        bar.set_style(ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} rounds [{elapsed_precise}] {msg}",
        )?);
        Ok(Self { bar })
    }
}

impl MatchObserver for RoundProgress {
    fn on_round_end(&mut self, event: &RoundEvent) {
        self.bar.inc(1);
        if event.round % 100 == 0 {
            self.bar.set_message(format!(
                "{} - {}",
                event.scores.wins[0], event.scores.wins[1]
            ));
        }
    }
}

/// Apply rule, player and exploration flags on top of `config`
fn apply_overrides(mut config: MatchConfig, args: &ConfigArgs) -> Result<MatchConfig> {
    if args.items.is_some() || args.max_take.is_some() || args.rounds.is_some() {
        let current = config.rules;
        config.rules = GameRules::new(
            args.items.unwrap_or(current.items_in_play),
            args.max_take.unwrap_or(current.max_removable),
            args.rounds.unwrap_or(current.round_count),
        )?;
    }

    if let Some(kind) = &args.player1 {
        config.players[0] = kind.parse()?;
    }
    if let Some(kind) = &args.player2 {
        config.players[1] = kind.parse()?;
    }

    if let Some(text) = &args.exploration {
        let params = parse_exploration(text)?;
        if !config.players.iter().any(|p| p.exploration().is_some()) {
            tracing::warn!("--exploration given but no value-function player is configured");
        }
        config.players = config.players.map(|p: PlayerConfig| p.with_exploration(params));
    }

    Ok(config)
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Parse `e0,emin,decay,period,lr`
pub fn parse_exploration(text: &str) -> Result<ExplorationParams> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != 5 {
        bail!("Expected 5 comma-separated values (e0,emin,decay,period,lr), got {}", parts.len());
    }

    let float = |i: usize, name: &str| -> Result<f64> {
        parts[i]
            .parse()
            .with_context(|| format!("Invalid {}: {}", name, parts[i]))
    };

    let params = ExplorationParams {
        epsilon0: float(0, "epsilon0")?,
        epsilon_min: float(1, "epsilon_min")?,
        decay_factor: float(2, "decay_factor")?,
        decay_period_rounds: parts[3]
            .parse()
            .with_context(|| format!("Invalid decay_period_rounds: {}", parts[3]))?,
        learning_rate: float(4, "learning_rate")?,
    };
    params.validate()?;
    Ok(params)
}

// ============================================================================
// TESTS
// ============================================================================

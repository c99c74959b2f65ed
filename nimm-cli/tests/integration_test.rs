//! Integration tests for the NIMM match runner
//!
//! Tests the full stack: rules, fixed strategies, learners and match orchestration

use nimm_core::{random_take, ConfigError, GameRules, GameState, Seat};
use nimm_learn::{ExplorationParams, ValueLearner};
use nimm_match::{
    run_batch, CoinSide, EventLog, FirstMove, HumanInput, LearnedTable, MatchConfig, MatchOrchestrator,
    MatchResult, PlayerConfig,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn rules(items: u32, max: u32, rounds: u32) -> GameRules {
    GameRules::new(items, max, rounds).unwrap()
}

fn play(config: MatchConfig) -> MatchResult {
    MatchOrchestrator::new(config).unwrap().run_match()
}

/// Human stand-in that always takes the same amount when it can
struct StubbornHuman {
    take: u32,
}

impl HumanInput for StubbornHuman {
    fn choose_take(&mut self, _seat: Seat, state: &GameState) -> Option<u32> {
        Some(self.take.min(state.max_take()))
    }

    fn call_coin(&mut self, _seat: Seat) -> Option<CoinSide> {
        Some(CoinSide::Tails)
    }
}

/// Human stand-in that plays uniformly at random
struct RandomHuman {
    rng: ChaCha8Rng,
}

impl HumanInput for RandomHuman {
    fn choose_take(&mut self, _seat: Seat, state: &GameState) -> Option<u32> {
        Some(random_take(state.items_remaining(), state.max_removable(), &mut self.rng))
    }

    fn call_coin(&mut self, _seat: Seat) -> Option<CoinSide> {
        Some(CoinSide::random(&mut self.rng))
    }
}

// ============================================================================
// FIXED STRATEGIES
// ============================================================================

#[test]
fn test_optimal_vs_optimal_non_starter_wins_every_round() {
    let config = MatchConfig::new(rules(8, 3, 100), PlayerConfig::Optimal, PlayerConfig::Optimal)
        .with_first_move(FirstMove::Fixed(Seat::One))
        .with_seed(1);
    let result = play(config);

    assert_eq!(result.rounds_played, 100);
    assert_eq!(result.wins_for(Seat::Two), 100);
    assert_eq!(result.wins_for(Seat::One), 0);
    assert_eq!(result.rolling_rate_for(Seat::Two), 100.0);
    assert_eq!(result.sustained_since_for(Seat::Two), Some(10));
}

#[test]
fn test_optimal_beats_random_from_winning_piles() {
    // 13 items, take 1-3: the starter holds the winning move
    let config = MatchConfig::new(rules(13, 3, 200), PlayerConfig::Optimal, PlayerConfig::Random)
        .with_first_move(FirstMove::Fixed(Seat::One))
        .with_seed(2);
    let result = play(config);
    assert_eq!(result.wins_for(Seat::One), 200);
}

#[test]
fn test_rolling_history_tracks_scoreboard() {
    let config = MatchConfig::new(rules(12, 3, 50), PlayerConfig::Mixed, PlayerConfig::Random).with_seed(3);
    let result = play(config);

    assert_eq!(result.rolling_history.len(), 50);
    assert!(result.rolling_history[..9].iter().all(|r| *r == [0, 0]));
    for rates in &result.rolling_history[9..] {
        assert_eq!(rates[0] as u32 + rates[1] as u32, 100);
    }
    let last = result.rolling_history[49];
    assert_eq!(last[0] as f64, result.rolling_rate_for(Seat::One));
}

// ============================================================================
// LEARNING PLAYERS
// ============================================================================

#[test]
fn test_reinforcement_learner_improves_against_optimal() {
    let config = MatchConfig::new(rules(12, 3, 5000), PlayerConfig::Optimal, PlayerConfig::reinforcement())
        .with_seed(2024);
    let result = play(config);

    let window = 500;
    let windows: Vec<u32> = (0..10)
        .map(|w| result.wins_between(Seat::Two, w * window..(w + 1) * window))
        .collect();
    // Allow for sampling noise between neighbouring windows
    for (w, pair) in windows.windows(2).enumerate() {
        assert!(
            pair[1] + 40 >= pair[0],
            "window {} dropped from {} to {} wins ({:?})",
            w + 1,
            pair[0],
            pair[1],
            windows
        );
    }
    assert!(windows[9] >= windows[0], "windows {:?}", windows);
    // The learner only has a winning pile when the optimal seat starts
    assert!(windows[9] >= 200, "last window only {} wins", windows[9]);

    match result.table_for(Seat::Two) {
        Some(LearnedTable::Urn { counters }) => {
            for (i, row) in counters.rows().enumerate() {
                assert!(row.iter().any(|&c| c > 0), "row {} is empty", i + 1);
            }
        }
        other => panic!("expected urn table, got {:?}", other),
    }
}

#[test]
fn test_value_learner_finds_losing_positions() {
    let params = ExplorationParams {
        epsilon0: 1.0,
        epsilon_min: 0.05,
        decay_factor: 0.9,
        decay_period_rounds: 20,
        learning_rate: 0.1,
    };
    let config = MatchConfig::new(rules(12, 3, 20_000), PlayerConfig::Optimal, PlayerConfig::value_function(params))
        .with_seed(77);
    let result = play(config);

    let (values, epsilon) = match result.table_for(Seat::Two) {
        Some(LearnedTable::Value { values, epsilon }) => (values.clone(), *epsilon),
        other => panic!("expected value table, got {:?}", other),
    };

    assert!(epsilon >= params.epsilon_min);
    assert!((epsilon - params.epsilon_min).abs() < 1e-12);

    assert!(values.get(4) < 0.0, "V[4] = {}", values.get(4));
    assert!(values.get(8) < 0.0, "V[8] = {}", values.get(8));
    for p in 1..=3 {
        assert!(values.get(4) < values.get(p), "V[4] >= V[{}]", p);
    }
    for p in (1..=11).filter(|p| p % 4 != 0) {
        assert!(values.get(p) > 0.0, "V[{}] = {}", p, values.get(p));
    }

    let mut learner = ValueLearner::new(12, 3, &params).unwrap();
    *learner.table_mut() = values;
    for p in [1, 2, 3, 5, 6, 7, 9, 10, 11] {
        assert_eq!(learner.greedy(p), p % 4, "greedy move from {}", p);
    }
}

#[test]
fn test_value_learners_train_against_each_other() {
    let params = ExplorationParams {
        epsilon0: 1.0,
        epsilon_min: 0.1,
        decay_factor: 0.95,
        decay_period_rounds: 20,
        learning_rate: 0.1,
    };
    let config = MatchConfig::new(
        rules(12, 3, 2000),
        PlayerConfig::value_function(params),
        PlayerConfig::value_function(params),
    )
    .with_seed(31);
    let result = play(config);

    assert_eq!(result.rounds_played, 2000);
    for seat in Seat::BOTH {
        let values = match result.table_for(seat) {
            Some(LearnedTable::Value { values, .. }) => values,
            other => panic!("expected value table, got {:?}", other),
        };
        assert!(
            values.values().iter().any(|&v| v > 0.0),
            "seat {} never learned a winning position",
            seat.number()
        );
        assert!(
            values.values().iter().any(|&v| v < 0.0),
            "seat {} never learned a losing position",
            seat.number()
        );
    }
}

#[test]
fn test_value_vs_reinforcement_preset_shape() {
    let mut config = MatchConfig::preset("value-vs-reinforcement").unwrap().with_seed(5);
    config.rules.round_count = 300;
    let result = play(config);

    assert_eq!(result.rounds_played, 300);
    assert!(matches!(result.table_for(Seat::One), Some(LearnedTable::Value { .. })));
    assert!(matches!(result.table_for(Seat::Two), Some(LearnedTable::Urn { .. })));
}

// ============================================================================
// HUMAN PLAYERS AND OBSERVERS
// ============================================================================

#[test]
fn test_human_against_optimal_loses_from_losing_pile() {
    let config = MatchConfig::new(rules(8, 3, 5), PlayerConfig::Human, PlayerConfig::Optimal)
        .with_first_move(FirstMove::Fixed(Seat::One));
    let orchestrator = MatchOrchestrator::with_human_input(config, Box::new(StubbornHuman { take: 1 })).unwrap();
    let result = orchestrator.run_match();
    assert_eq!(result.wins_for(Seat::Two), 5);
}

#[test]
fn test_two_humans_share_one_input() {
    let config = MatchConfig::preset("human-vs-human").unwrap().with_seed(8);
    let input = RandomHuman {
        rng: ChaCha8Rng::seed_from_u64(8),
    };
    let mut log = EventLog::default();
    let result = MatchOrchestrator::with_human_input(config, Box::new(input))
        .unwrap()
        .run_with_observer(&mut log);

    assert_eq!(result.rounds_played, 5);
    assert!(log.first_player.is_some());
    assert!(log.moves.iter().all(|m| (1..=3).contains(&m.take)));
}

#[test]
fn test_observer_sees_every_move_and_round() {
    let config = MatchConfig::new(rules(10, 4, 25), PlayerConfig::Random, PlayerConfig::reinforcement()).with_seed(6);
    let mut log = EventLog::default();
    let result = MatchOrchestrator::new(config).unwrap().run_with_observer(&mut log);

    assert_eq!(log.rounds.len(), 25);
    for round in 1..=25 {
        let taken: u32 = log.moves.iter().filter(|m| m.round == round).map(|m| m.take).sum();
        assert_eq!(taken, 10, "round {}", round);
    }
    let last = log.rounds.last().unwrap();
    assert_eq!(last.scores.wins, result.wins);
    assert_eq!(log.rounds[0].first_player, result.first_player);
    for (event, winner) in log.rounds.iter().zip(&result.round_winners) {
        assert_eq!(event.winner, *winner);
    }
}

// ============================================================================
// CONFIGURATION AND BATCHES
// ============================================================================

#[test]
fn test_config_errors() {
    assert!(matches!(GameRules::new(7, 3, 10), Err(ConfigError::TooFewItems { .. })));
    assert!(matches!(
        GameRules::new(12, 6, 10),
        Err(ConfigError::MaxRemovableOutOfRange { .. })
    ));
    assert!(matches!(
        GameRules::new(12, 1, 10),
        Err(ConfigError::MaxRemovableOutOfRange { .. })
    ));
    assert!(matches!(GameRules::new(12, 3, 0), Err(ConfigError::NoRounds)));

    let human = MatchConfig::new(rules(12, 3, 5), PlayerConfig::Optimal, PlayerConfig::Human);
    assert!(matches!(
        MatchOrchestrator::new(human),
        Err(ConfigError::MissingHumanInput { seat: 2 })
    ));

    let missing = std::env::temp_dir().join("nimm-does-not-exist.json");
    assert!(MatchConfig::load(&missing).is_err());
}

#[test]
fn test_batch_summary_over_seeds() {
    let config = MatchConfig::new(rules(12, 3, 400), PlayerConfig::Optimal, PlayerConfig::reinforcement())
        .with_seed(10);
    let (summary, results) = run_batch(&config, 4, true).unwrap();

    assert_eq!(results.len(), 4);
    let mean: f64 = results.iter().map(|r| r.wins_for(Seat::Two) as f64).sum::<f64>() / 4.0;
    assert!((summary.mean_wins[1] - mean).abs() < 1e-9);

    // Each match matches a standalone run with the derived seed
    let solo = play(config.clone().with_seed(12));
    assert_eq!(solo.round_winners, results[2].round_winners);
}

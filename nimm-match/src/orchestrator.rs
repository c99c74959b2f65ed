//! Match orchestration - rounds, turns and learning updates
//!
//! Level 1 - Orchestration and Level 2 - Phases

use std::ops::Range;

use nimm_core::{ConfigError, GameResult, GameRules, GameState, Outcome, Seat};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::{FirstMove, MatchConfig, PlayerConfig};
use crate::observer::{MatchObserver, MoveEvent, NoopObserver, RoundEvent};
use crate::selector::{CoinSide, HumanInput, LearnedTable, MoveSelector};
use crate::stats::Scoreboard;

/// Result of a match
#[derive(Clone, Debug, Serialize)]
pub struct MatchResult {
    pub rules: GameRules,
    pub players: [PlayerConfig; 2],
    /// Starter of round 1
    pub first_player: Seat,
    pub rounds_played: u32,
    /// A human left before the last round; the unfinished round is not scored
    pub abandoned: bool,
    /// Absolute wins per seat
    pub wins: [u32; 2],
    /// Final rolling win rate (percent over the last 10 rounds)
    pub rolling_rate: [f64; 2],
    /// Round from which the rolling rate stayed at or above 50%
    pub sustained_since: [Option<u32>; 2],
    /// Winner of each round, in order
    #[serde(skip)]
    pub round_winners: Vec<Seat>,
    /// Rolling win rate (percent) of both seats after each round
    #[serde(skip)]
    pub rolling_history: Vec<[u8; 2]>,
    /// Final learning state of learning seats
    pub tables: [Option<LearnedTable>; 2],
}

impl MatchResult {
    pub fn wins_for(&self, seat: Seat) -> u32 {
        self.wins[seat.index()]
    }

    pub fn rolling_rate_for(&self, seat: Seat) -> f64 {
        self.rolling_rate[seat.index()]
    }

    pub fn sustained_since_for(&self, seat: Seat) -> Option<u32> {
        self.sustained_since[seat.index()]
    }

    pub fn table_for(&self, seat: Seat) -> Option<&LearnedTable> {
        self.tables[seat.index()].as_ref()
    }

    /// Wins of `seat` over a range of 0-based round indices
    pub fn wins_between(&self, seat: Seat, rounds: Range<usize>) -> u32 {
        let end = rounds.end.min(self.round_winners.len());
        let start = rounds.start.min(end);
        self.round_winners[start..end]
            .iter()
            .filter(|&&w| w == seat)
            .count() as u32
    }

    /// Win rate over the whole match (0.0 to 1.0)
    pub fn win_rate(&self, seat: Seat) -> f32 {
        if self.rounds_played == 0 {
            0.0
        } else {
            self.wins_for(seat) as f32 / self.rounds_played as f32
        }
    }
}

/// Orchestrator states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    RoundStart,
    TurnLoop,
    RoundEnd,
    MatchEnd,
}

/// Runs a whole match and owns every piece of mutable state in it
pub struct MatchOrchestrator {
    config: MatchConfig,
    selectors: [MoveSelector; 2],
    scoreboard: Scoreboard,
    round_winners: Vec<Seat>,
    rolling_history: Vec<[u8; 2]>,
    /// Match-level generator for the coin toss
    rng: ChaCha8Rng,
    human: Option<Box<dyn HumanInput>>,
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

impl MatchOrchestrator {
    /// Create an orchestrator for a match without human players
    pub fn new(config: MatchConfig) -> Result<Self, ConfigError> {
        Self::build(config, None)
    }

    /// Create an orchestrator whose human seats are driven by `input`
    pub fn with_human_input(config: MatchConfig, input: Box<dyn HumanInput>) -> Result<Self, ConfigError> {
        Self::build(config, Some(input))
    }

    fn build(config: MatchConfig, human: Option<Box<dyn HumanInput>>) -> Result<Self, ConfigError> {
        config.validate()?;
        if human.is_none() {
            if let Some(seat) = Seat::BOTH.into_iter().find(|&s| config.player(s).is_human()) {
                return Err(ConfigError::MissingHumanInput { seat: seat.number() });
            }
        }

        let mut rng = create_rng(config.seed);
        let seeds: [u64; 2] = [rng.gen(), rng.gen()];
        let selectors = [
            MoveSelector::new(Seat::One, config.player(Seat::One), &config.rules, seeds[0])?,
            MoveSelector::new(Seat::Two, config.player(Seat::Two), &config.rules, seeds[1])?,
        ];

        Ok(Self {
            config,
            selectors,
            scoreboard: Scoreboard::new(),
            round_winners: Vec::new(),
            rolling_history: Vec::new(),
            rng,
            human,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Play every round of the match
    pub fn run_match(self) -> MatchResult {
        self.run_with_observer(&mut NoopObserver)
    }

    /// Play every round of the match, reporting progress to `observer`
    ///
    /// This function reads like a table of contents:
    /// 1. Decide who starts round 1
    /// 2. Loop RoundStart -> TurnLoop -> RoundEnd until the last round,
    ///    or until a human leaves
    /// 3. Collect the results
    pub fn run_with_observer(mut self, observer: &mut dyn MatchObserver) -> MatchResult {
        let rules = self.config.rules;
        let first_player = self.decide_first_player();
        observer.on_match_start(first_player);

        tracing::info!(
            "Starting match: {} vs {} ({} rounds, {} items, max take {}, seat {} starts)",
            self.config.players[0].label(),
            self.config.players[1].label(),
            rules.round_count,
            rules.items_in_play,
            rules.max_removable,
            first_player.number()
        );

        let mut starter = first_player;
        let mut round = 0;
        let mut state = GameState::new(&rules, starter);
        let mut phase = Phase::RoundStart;
        let mut abandoned = false;

        while phase != Phase::MatchEnd {
            phase = match phase {
                Phase::RoundStart => {
                    round += 1;
                    state = self.start_round(starter);
                    observer.on_round_start(round, starter);
                    Phase::TurnLoop
                }
                Phase::TurnLoop => {
                    if !self.play_turn(&mut state, round, observer) {
                        abandoned = true;
                        Phase::MatchEnd
                    } else if state.is_over() {
                        Phase::RoundEnd
                    } else {
                        Phase::TurnLoop
                    }
                }
                Phase::RoundEnd => {
                    self.finish_round(&state, round, observer);
                    if !matches!(self.config.first_move, FirstMove::Fixed(_)) {
                        starter = starter.opponent();
                    }
                    if round >= rules.round_count {
                        Phase::MatchEnd
                    } else {
                        Phase::RoundStart
                    }
                }
                Phase::MatchEnd => Phase::MatchEnd,
            };
        }

        tracing::info!(
            "Match {}: seat 1 won {}, seat 2 won {} of {} rounds",
            if abandoned { "stopped" } else { "finished" },
            self.scoreboard.wins(Seat::One),
            self.scoreboard.wins(Seat::Two),
            self.scoreboard.rounds()
        );

        self.into_result(first_player, abandoned)
    }

    // ========================================================================
    // Level 2 - Phases
    // ========================================================================

    /// Starter of round 1: seat one calls the coin and starts if right
    ///
    /// A human who leaves instead of calling gets a random call; the
    /// departure is noticed on their first move.
    fn decide_first_player(&mut self) -> Seat {
        match self.config.first_move {
            FirstMove::Alternate(seat) | FirstMove::Fixed(seat) => seat,
            FirstMove::CoinToss => {
                let called = match self.human.as_deref_mut() {
                    Some(input) if self.selectors[0].is_human() => input.call_coin(Seat::One),
                    _ => None,
                };
                let call = called.unwrap_or_else(|| CoinSide::random(&mut self.rng));
                let toss = CoinSide::random(&mut self.rng);
                if call == toss {
                    Seat::One
                } else {
                    Seat::Two
                }
            }
        }
    }

    /// Fresh pile; both seats forget last round's history
    fn start_round(&mut self, starter: Seat) -> GameState {
        for selector in &mut self.selectors {
            selector.start_round();
        }
        GameState::new(&self.config.rules, starter)
    }

    /// One move by the seat to move; false if a human left instead
    fn play_turn(&mut self, state: &mut GameState, round: u32, observer: &mut dyn MatchObserver) -> bool {
        let mover = state.current_player();
        let turn_index = state.turn_index();
        let human = self.human.as_deref_mut().map(|input| input as &mut dyn HumanInput);
        let Some(take) = self.selectors[mover.index()].choose(state, human) else {
            tracing::warn!(
                "Seat {} left during round {}; stopping the match",
                mover.number(),
                round
            );
            return false;
        };

        state.apply_move(take);

        tracing::trace!(
            "round {} turn {}: seat {} takes {}, {} left",
            round,
            turn_index,
            mover.number(),
            take,
            state.items_remaining()
        );
        observer.on_move(&MoveEvent {
            round,
            turn_index,
            mover,
            take,
            items_remaining: state.items_remaining(),
        });
        true
    }

    /// Scores, learning updates and epsilon decay after the last move
    fn finish_round(&mut self, state: &GameState, round: u32, observer: &mut dyn MatchObserver) {
        let winner = match state.result() {
            GameResult::Won(seat) => seat,
            GameResult::Ongoing => unreachable!("round {} finished without a winner", round),
        };

        self.scoreboard.record(round, winner);
        self.round_winners.push(winner);
        self.rolling_history.push([
            self.scoreboard.rolling_rate(Seat::One) as u8,
            self.scoreboard.rolling_rate(Seat::Two) as u8,
        ]);

        for selector in &mut self.selectors {
            let outcome = if selector.seat() == winner {
                Outcome::Win
            } else {
                Outcome::Loss
            };
            selector.finish_round(outcome, round);
        }

        tracing::debug!(
            "Round {}: seat {} wins ({} - {})",
            round,
            winner.number(),
            self.scoreboard.wins(Seat::One),
            self.scoreboard.wins(Seat::Two)
        );
        observer.on_round_end(&RoundEvent {
            round,
            first_player: state.first_player(),
            winner,
            scores: self.scoreboard.snapshot(),
        });
    }

    fn into_result(self, first_player: Seat, abandoned: bool) -> MatchResult {
        let [one, two] = self.selectors;
        MatchResult {
            rules: self.config.rules,
            players: self.config.players,
            first_player,
            rounds_played: self.scoreboard.rounds(),
            abandoned,
            wins: [self.scoreboard.wins(Seat::One), self.scoreboard.wins(Seat::Two)],
            rolling_rate: [
                self.scoreboard.rolling_rate(Seat::One),
                self.scoreboard.rolling_rate(Seat::Two),
            ],
            sustained_since: [
                self.scoreboard.sustained_since(Seat::One),
                self.scoreboard.sustained_since(Seat::Two),
            ],
            round_winners: self.round_winners,
            rolling_history: self.rolling_history,
            tables: [one.into_learned_table(), two.into_learned_table()],
        }
    }
}

// ============================================================================
// Level 4 - Utilities
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::EventLog;

    fn optimal_pair(items: u32, max: u32, rounds: u32) -> MatchConfig {
        MatchConfig::new(
            GameRules::new(items, max, rounds).unwrap(),
            PlayerConfig::Optimal,
            PlayerConfig::Optimal,
        )
        .with_seed(42)
    }

    struct ScriptedHuman {
        call: CoinSide,
        /// Moves answered before leaving
        moves_left: Option<u32>,
    }

    impl ScriptedHuman {
        fn staying(call: CoinSide) -> Self {
            Self { call, moves_left: None }
        }
    }

    impl HumanInput for ScriptedHuman {
        fn choose_take(&mut self, _seat: Seat, state: &GameState) -> Option<u32> {
            match &mut self.moves_left {
                Some(0) => None,
                Some(n) => {
                    *n -= 1;
                    Some(state.max_take())
                }
                None => Some(state.max_take()),
            }
        }

        fn call_coin(&mut self, _seat: Seat) -> Option<CoinSide> {
            Some(self.call)
        }
    }

    #[test]
    fn test_human_seat_requires_input() {
        let config = MatchConfig::new(GameRules::default(), PlayerConfig::Optimal, PlayerConfig::Human);
        assert!(matches!(
            MatchOrchestrator::new(config),
            Err(ConfigError::MissingHumanInput { seat: 2 })
        ));
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let mut config = optimal_pair(12, 3, 10);
        config.rules.round_count = 0;
        assert!(matches!(MatchOrchestrator::new(config), Err(ConfigError::NoRounds)));
    }

    #[test]
    fn test_plays_every_round() {
        let result = MatchOrchestrator::new(optimal_pair(12, 3, 37)).unwrap().run_match();
        assert_eq!(result.rounds_played, 37);
        assert_eq!(result.wins[0] + result.wins[1], 37);
        assert_eq!(result.round_winners.len(), 37);
        assert_eq!(result.rolling_history.len(), 37);
        assert!(result.tables.iter().all(Option::is_none));
    }

    #[test]
    fn test_starter_alternates_and_loses_on_losing_pile() {
        let config = optimal_pair(12, 3, 20).with_first_move(FirstMove::Alternate(Seat::Two));
        let mut log = EventLog::default();
        let result = MatchOrchestrator::new(config).unwrap().run_with_observer(&mut log);

        assert_eq!(log.first_player, Some(Seat::Two));
        for (i, round) in log.rounds.iter().enumerate() {
            let expected = if i % 2 == 0 { Seat::Two } else { Seat::One };
            assert_eq!(round.first_player, expected);
            assert_eq!(round.winner, expected.opponent());
        }
        assert_eq!(result.wins, [10, 10]);
    }

    #[test]
    fn test_fixed_starter_never_changes() {
        let config = optimal_pair(8, 3, 15).with_first_move(FirstMove::Fixed(Seat::One));
        let mut log = EventLog::default();
        let result = MatchOrchestrator::new(config).unwrap().run_with_observer(&mut log);
        assert!(log.rounds.iter().all(|r| r.first_player == Seat::One));
        assert_eq!(result.wins_for(Seat::Two), 15);
    }

    #[test]
    fn test_moves_reach_zero_and_alternate() {
        let config = optimal_pair(10, 2, 3).with_first_move(FirstMove::Alternate(Seat::One));
        let mut log = EventLog::default();
        MatchOrchestrator::new(config).unwrap().run_with_observer(&mut log);

        let first_round: Vec<_> = log.moves.iter().filter(|m| m.round == 1).collect();
        assert_eq!(first_round.last().map(|m| m.items_remaining), Some(0));
        for pair in first_round.windows(2) {
            assert_ne!(pair[0].mover, pair[1].mover);
            assert_eq!(pair[0].items_remaining - pair[1].take, pair[1].items_remaining);
        }
        assert_eq!(first_round[0].items_remaining, 10 - first_round[0].take);
        assert_eq!(first_round[0].turn_index, 1);
    }

    #[test]
    fn test_same_seed_same_match() {
        let config = MatchConfig::new(
            GameRules::new(15, 4, 200).unwrap(),
            PlayerConfig::Mixed,
            PlayerConfig::reinforcement(),
        )
        .with_seed(9);
        let a = MatchOrchestrator::new(config.clone()).unwrap().run_match();
        let b = MatchOrchestrator::new(config).unwrap().run_match();
        assert_eq!(a.round_winners, b.round_winners);
        assert_eq!(a.first_player, b.first_player);
    }

    #[test]
    fn test_human_calls_the_coin() {
        let config = MatchConfig::new(
            GameRules::new(8, 3, 2).unwrap(),
            PlayerConfig::Human,
            PlayerConfig::Random,
        )
        .with_seed(5);
        let human = ScriptedHuman::staying(CoinSide::Heads);
        let orchestrator = MatchOrchestrator::with_human_input(config, Box::new(human)).unwrap();
        let result = orchestrator.run_match();
        assert_eq!(result.rounds_played, 2);
        assert!(!result.abandoned);
    }

    #[test]
    fn test_human_leaving_stops_match() {
        // 8 items, max 3, human always takes 3 and starts every round:
        // 8 -> 5 (optimal takes 1) -> 4 -> 1 (optimal takes 1) -> 0, so two
        // human moves per round
        let config = MatchConfig::new(
            GameRules::new(8, 3, 10).unwrap(),
            PlayerConfig::Human,
            PlayerConfig::Optimal,
        )
        .with_first_move(FirstMove::Fixed(Seat::One))
        .with_seed(5);
        let human = ScriptedHuman {
            call: CoinSide::Heads,
            moves_left: Some(5),
        };
        let mut log = EventLog::default();
        let result = MatchOrchestrator::with_human_input(config, Box::new(human))
            .unwrap()
            .run_with_observer(&mut log);

        assert!(result.abandoned);
        assert_eq!(result.rounds_played, 2);
        assert_eq!(result.round_winners.len(), 2);
        assert_eq!(log.rounds.len(), 2);
        assert_eq!(log.round_starts.len(), 3);
        assert_eq!(result.wins_for(Seat::Two), 2);
    }

    #[test]
    fn test_round_start_precedes_moves() {
        let config = optimal_pair(12, 3, 4).with_first_move(FirstMove::Alternate(Seat::One));
        let mut log = EventLog::default();
        MatchOrchestrator::new(config).unwrap().run_with_observer(&mut log);

        assert_eq!(
            log.round_starts,
            vec![(1, Seat::One), (2, Seat::Two), (3, Seat::One), (4, Seat::Two)]
        );
    }

    #[test]
    fn test_long_match_builds_without_preallocating() {
        let config = optimal_pair(12, 3, u32::MAX);
        let orchestrator = MatchOrchestrator::new(config).unwrap();
        assert_eq!(orchestrator.config().rules.round_count, u32::MAX);
    }

    #[test]
    fn test_bad_exploration_rejected() {
        let params = nimm_learn::ExplorationParams {
            epsilon_min: 0.9,
            epsilon0: 0.5,
            ..nimm_learn::ExplorationParams::default()
        };
        let config = MatchConfig::new(
            GameRules::default(),
            PlayerConfig::value_function(params),
            PlayerConfig::Optimal,
        );
        assert!(matches!(
            MatchOrchestrator::new(config),
            Err(ConfigError::Exploration { .. })
        ));
    }

    #[test]
    fn test_learning_seats_report_tables() {
        let config = MatchConfig::new(
            GameRules::new(9, 2, 30).unwrap(),
            PlayerConfig::reinforcement(),
            PlayerConfig::value_function(nimm_learn::ExplorationParams::default()),
        )
        .with_seed(3);
        let result = MatchOrchestrator::new(config).unwrap().run_match();

        match result.table_for(Seat::One) {
            Some(LearnedTable::Urn { counters }) => assert_eq!(counters.positions(), 9),
            other => panic!("expected urn table, got {:?}", other),
        }
        match result.table_for(Seat::Two) {
            Some(LearnedTable::Value { values, epsilon }) => {
                assert_eq!(values.positions(), 9);
                // 30 rounds, period 5: six decay steps of 0.996
                assert!((epsilon - 0.996f64.powi(6)).abs() < 1e-12);
            }
            other => panic!("expected value table, got {:?}", other),
        }
    }

    #[test]
    fn test_wins_between_clamps_range() {
        let result = MatchOrchestrator::new(
            optimal_pair(8, 3, 10).with_first_move(FirstMove::Fixed(Seat::Two)),
        )
        .unwrap()
        .run_match();
        assert_eq!(result.wins_between(Seat::One, 0..5), 5);
        assert_eq!(result.wins_between(Seat::One, 5..100), 5);
        assert_eq!(result.wins_between(Seat::Two, 0..10), 0);
        assert!((result.win_rate(Seat::One) - 1.0).abs() < f32::EPSILON);
    }
}

use chrono::Local;
use rand::{rngs::StdRng, SeedableRng};

use crate::error::GameError;
use crate::generator;
use crate::prompt::{Deck, Difficulty, Operator, Prompt};
use crate::scoreboard::{ScoreboardEntry, ScoreboardRecorder};
use crate::session::{SessionConfig, SessionState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Active,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Wrong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    TimeUp,
    DeckExhausted,
    Quit,
}

/// What the player sees after submitting an answer
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub outcome: Outcome,
    pub score: i64,
    /// Set when this answer ended the game
    pub finished: Option<GameResult>,
}

/// Final state of a game, produced exactly once when it ends
#[derive(Clone, Debug, PartialEq)]
pub struct GameResult {
    pub reason: EndReason,
    pub final_score: i64,
    pub entry: ScoreboardEntry,
    /// Present when the scoreboard write failed; the score above still stands
    pub record_error: Option<String>,
}

/// Drives one player's games: start, answer, tick, end, reset
pub struct Game {
    config: SessionConfig,
    phase: Phase,
    state: Option<SessionState>,
    quit_requested: bool,
    result: Option<GameResult>,
    recorder: Box<dyn ScoreboardRecorder + Send>,
    rng: StdRng,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

impl Game {
    pub fn new(config: SessionConfig, recorder: Box<dyn ScoreboardRecorder + Send>) -> Self {
        Self::with_rng(config, recorder, StdRng::from_entropy())
    }

    /// Deterministic decks for a given seed
    pub fn seeded(
        config: SessionConfig,
        recorder: Box<dyn ScoreboardRecorder + Send>,
        seed: u64,
    ) -> Self {
        Self::with_rng(config, recorder, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: SessionConfig,
        recorder: Box<dyn ScoreboardRecorder + Send>,
        rng: StdRng,
    ) -> Self {
        Self {
            config,
            phase: Phase::NotStarted,
            state: None,
            quit_requested: false,
            result: None,
            recorder,
            rng,
        }
    }

    /// Generate a deck for `operator`/`difficulty` and begin a game
    pub fn start(
        &mut self,
        operator: Operator,
        difficulty: Difficulty,
    ) -> Result<&Prompt, GameError> {
        if self.phase != Phase::NotStarted {
            return Err(GameError::InvalidTransition(self.phase));
        }

        let deck = generator::generate(operator, difficulty, &mut self.rng);
        self.begin(deck, operator, difficulty)
    }

    /// Begin a game from a prepared deck, using the configured
    /// difficulty and operator for the scoreboard entry
    pub fn start_with_deck(&mut self, deck: Deck) -> Result<&Prompt, GameError> {
        self.begin(deck, self.config.operator, self.config.difficulty)
    }

    // the config only takes the new settings once the deck is accepted
    fn begin(
        &mut self,
        deck: Deck,
        operator: Operator,
        difficulty: Difficulty,
    ) -> Result<&Prompt, GameError> {
        if self.phase != Phase::NotStarted {
            return Err(GameError::InvalidTransition(self.phase));
        }
        if deck.is_empty() {
            return Err(GameError::EmptyDeck {
                difficulty,
                operator,
            });
        }

        self.config.operator = operator;
        self.config.difficulty = difficulty;

        tracing::info!(
            username = self.config.display_username(),
            difficulty = %self.config.difficulty,
            operator = %Operator::label(self.config.recorded_operator()),
            cards = deck.len(),
            "game started"
        );

        self.quit_requested = false;
        self.result = None;
        self.phase = Phase::Active;
        let state = self.state.insert(SessionState::new(deck));

        state
            .current_prompt()
            .ok_or(GameError::EmptyDeck {
                difficulty: self.config.difficulty,
                operator: self.config.operator,
            })
    }

    /// Score a numeric answer against the prompt on screen
    pub fn submit_answer(&mut self, value: i64) -> Result<Submission, GameError> {
        let state = self.active_state()?;

        let outcome = if state.current_answer() == Some(value) {
            state.score += 1;
            state.retained_input.clear();
            state.advance();
            Outcome::Correct
        } else {
            state.score -= 1;
            state.retained_input = value.to_string();
            Outcome::Wrong
        };
        let score = state.score;

        Ok(Submission {
            outcome,
            score,
            finished: self.check_termination(),
        })
    }

    /// Score raw text from the answer box. Anything that is not an integer
    /// is counted as a wrong answer and left in the box.
    pub fn submit_raw(&mut self, raw: &str) -> Result<Submission, GameError> {
        self.active_state()?;

        match parse_answer(raw) {
            Ok(value) => self.submit_answer(value),
            Err(err) => {
                tracing::debug!(%err, "unparsable answer scored as wrong");
                let state = self.active_state()?;
                state.score -= 1;
                state.retained_input = raw.to_string();
                let score = state.score;

                Ok(Submission {
                    outcome: Outcome::Wrong,
                    score,
                    finished: self.check_termination(),
                })
            }
        }
    }

    /// Advance the clock by one second. Ticks outside an active game are ignored.
    pub fn tick(&mut self) -> Option<GameResult> {
        match self.state.as_mut() {
            Some(state) if self.phase == Phase::Active => {
                state.elapsed_ticks = state.elapsed_ticks.saturating_add(1);
            }
            _ => {
                tracing::trace!(phase = ?self.phase, "tick ignored");
                return None;
            }
        }
        self.check_termination()
    }

    /// Explicit end-game request from the player
    pub fn end_game(&mut self) -> Option<GameResult> {
        if self.phase != Phase::Active {
            return None;
        }
        self.quit_requested = true;
        self.check_termination()
    }

    /// End the game if time is up, every card is answered, or the player quit.
    ///
    /// Returns the result only on the call that performs the transition;
    /// later calls return `None`.
    pub fn check_termination(&mut self) -> Option<GameResult> {
        if self.phase != Phase::Active {
            if self.phase == Phase::Ended {
                tracing::debug!("termination already handled");
            }
            return None;
        }

        let state = self.state.as_ref()?;
        let reason = if self.quit_requested {
            EndReason::Quit
        } else if state.elapsed_ticks >= self.config.time_limit_ticks {
            EndReason::TimeUp
        } else if state.is_exhausted() {
            EndReason::DeckExhausted
        } else {
            return None;
        };
        let final_score = state.score;

        Some(self.finish(reason, final_score))
    }

    fn finish(&mut self, reason: EndReason, final_score: i64) -> GameResult {
        self.phase = Phase::Ended;

        let entry = ScoreboardEntry::new(&self.config, final_score, Local::now());
        let record_error = match self.recorder.record(&entry) {
            Ok(()) => None,
            Err(err) => {
                tracing::error!(error = %err, final_score, "failed to record final score");
                Some(err.to_string())
            }
        };

        tracing::info!(?reason, final_score, "game ended");

        let result = GameResult {
            reason,
            final_score,
            entry,
            record_error,
        };
        self.result = Some(result.clone());
        result
    }

    /// Discard the finished game and return to the configuration screen
    pub fn reset(&mut self) {
        self.phase = Phase::NotStarted;
        self.state = None;
        self.quit_requested = false;
        self.result = None;
    }

    fn active_state(&mut self) -> Result<&mut SessionState, GameError> {
        match self.state.as_mut() {
            Some(state) if self.phase == Phase::Active => Ok(state),
            _ => Err(GameError::NotActive(self.phase)),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_started(&self) -> bool {
        self.phase != Phase::NotStarted
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Ended
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.config.username = username.into();
    }

    pub fn score(&self) -> i64 {
        self.state.as_ref().map_or(0, |s| s.score)
    }

    pub fn current_prompt(&self) -> Option<&Prompt> {
        self.state.as_ref().and_then(|s| s.current_prompt())
    }

    /// Cards left including the one on screen
    pub fn remaining(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.remaining())
    }

    pub fn elapsed_ticks(&self) -> u32 {
        self.state.as_ref().map_or(0, |s| s.elapsed_ticks)
    }

    /// Seconds left on the clock, never below zero
    pub fn seconds_remaining(&self) -> u32 {
        self.config
            .time_limit_ticks
            .saturating_sub(self.elapsed_ticks())
    }

    /// Text that should stay in the answer box
    pub fn retained_input(&self) -> &str {
        self.state.as_ref().map_or("", |s| s.retained_input.as_str())
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }
}

/// Parse the answer box contents
pub fn parse_answer(raw: &str) -> Result<i64, GameError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| GameError::InvalidAnswerInput(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{Card, Symbol};
    use crate::scoreboard::MemoryScoreboard;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn game_with_store() -> (Game, Arc<MemoryScoreboard>) {
        let store = Arc::new(MemoryScoreboard::new());
        let game = Game::seeded(
            SessionConfig::new("tester", Difficulty::Normal, Operator::Multiplication),
            Box::new(Arc::clone(&store)),
            1,
        );
        (game, store)
    }

    fn small_deck() -> Deck {
        Deck::new(vec![
            Card::new(Prompt::binary(2, Symbol::Times, 3), 6),
            Card::new(Prompt::binary(4, Symbol::Times, 5), 20),
        ])
    }

    fn current_answer(game: &Game) -> i64 {
        game.current_prompt().and_then(|p| p.evaluate()).unwrap()
    }

    #[test]
    fn test_new_game_is_not_started() {
        let (game, _) = game_with_store();
        assert_eq!(game.phase(), Phase::NotStarted);
        assert!(!game.has_started());
        assert!(game.current_prompt().is_none());
        assert_eq!(game.score(), 0);
        assert_eq!(game.seconds_remaining(), 60);
    }

    #[test]
    fn test_start_activates_with_zero_score() {
        let (mut game, _) = game_with_store();
        let prompt = game
            .start(Operator::Multiplication, Difficulty::Normal)
            .unwrap()
            .clone();

        assert_eq!(prompt.len(), 3);
        assert_eq!(game.phase(), Phase::Active);
        assert_eq!(game.score(), 0);
        assert_eq!(game.elapsed_ticks(), 0);
        assert_eq!(game.remaining(), 169);
    }

    #[test]
    fn test_start_rejects_empty_deck() {
        let (mut game, _) = game_with_store();
        let err = game.start_with_deck(Deck::default()).unwrap_err();
        assert_matches!(err, GameError::EmptyDeck { .. });
        assert_eq!(game.phase(), Phase::NotStarted);
    }

    #[test]
    fn test_rejected_deck_keeps_previous_settings() {
        let (mut game, _) = game_with_store();
        let err = game
            .begin(Deck::default(), Operator::Division, Difficulty::Hard)
            .unwrap_err();
        assert_matches!(
            err,
            GameError::EmptyDeck {
                difficulty: Difficulty::Hard,
                operator: Operator::Division,
            }
        );
        assert_eq!(game.phase(), Phase::NotStarted);
        assert_eq!(game.config().operator, Operator::Multiplication);
        assert_eq!(game.config().difficulty, Difficulty::Normal);

        game.start(Operator::Addition, Difficulty::Normal).unwrap();
        assert_eq!(game.config().operator, Operator::Addition);
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let (mut game, _) = game_with_store();
        game.start_with_deck(small_deck()).unwrap();
        assert_matches!(
            game.start_with_deck(small_deck()),
            Err(GameError::InvalidTransition(Phase::Active))
        );
    }

    #[test]
    fn test_correct_answer_scores_and_advances() {
        let (mut game, _) = game_with_store();
        game.start_with_deck(small_deck()).unwrap();

        let sub = game.submit_answer(6).unwrap();
        assert_eq!(sub.outcome, Outcome::Correct);
        assert_eq!(sub.score, 1);
        assert!(sub.finished.is_none());
        assert_eq!(game.remaining(), 1);
        assert_eq!(current_answer(&game), 20);
        assert_eq!(game.retained_input(), "");
    }

    #[test]
    fn test_wrong_answer_penalizes_and_keeps_prompt() {
        let (mut game, _) = game_with_store();
        game.start_with_deck(small_deck()).unwrap();

        let sub = game.submit_answer(7).unwrap();
        assert_eq!(sub.outcome, Outcome::Wrong);
        assert_eq!(sub.score, -1);
        assert_eq!(game.remaining(), 2);
        assert_eq!(current_answer(&game), 6);
        assert_eq!(game.retained_input(), "7");

        game.submit_answer(8).unwrap();
        assert_eq!(game.score(), -2);
    }

    #[test]
    fn test_unparsable_input_counts_as_wrong() {
        let (mut game, _) = game_with_store();
        game.start_with_deck(small_deck()).unwrap();

        let sub = game.submit_raw("six").unwrap();
        assert_eq!(sub.outcome, Outcome::Wrong);
        assert_eq!(game.score(), -1);
        assert_eq!(game.retained_input(), "six");

        let sub = game.submit_raw("").unwrap();
        assert_eq!(sub.outcome, Outcome::Wrong);
        assert_eq!(game.score(), -2);

        let sub = game.submit_raw(" 6 ").unwrap();
        assert_eq!(sub.outcome, Outcome::Correct);
        assert_eq!(game.score(), -1);
    }

    #[test]
    fn test_submit_requires_active_game() {
        let (mut game, _) = game_with_store();
        assert_matches!(
            game.submit_answer(1),
            Err(GameError::NotActive(Phase::NotStarted))
        );
        assert_matches!(game.submit_raw("1"), Err(GameError::NotActive(_)));
    }

    #[test]
    fn test_exhausting_deck_ends_game() {
        let (mut game, store) = game_with_store();
        game.start_with_deck(small_deck()).unwrap();

        game.submit_answer(6).unwrap();
        let sub = game.submit_answer(20).unwrap();

        let result = sub.finished.expect("deck exhausted");
        assert_eq!(result.reason, EndReason::DeckExhausted);
        assert_eq!(result.final_score, 2);
        assert_eq!(game.phase(), Phase::Ended);
        assert!(game.current_prompt().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sixty_ticks_end_game() {
        let (mut game, store) = game_with_store();
        game.start_with_deck(small_deck()).unwrap();

        for _ in 0..59 {
            assert!(game.tick().is_none());
        }
        assert_eq!(game.seconds_remaining(), 1);
        assert_eq!(game.phase(), Phase::Active);

        let result = game.tick().expect("time up");
        assert_eq!(result.reason, EndReason::TimeUp);
        assert_eq!(game.seconds_remaining(), 0);

        // late ticks neither move the clock nor record again
        assert!(game.tick().is_none());
        assert_eq!(game.elapsed_ticks(), 60);
        assert_eq!(game.seconds_remaining(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_end_game_records_once() {
        let (mut game, store) = game_with_store();
        game.start_with_deck(small_deck()).unwrap();
        game.submit_answer(6).unwrap();
        game.tick();

        let result = game.end_game().expect("quit");
        assert_eq!(result.reason, EndReason::Quit);
        assert_eq!(result.final_score, 1);

        assert!(game.end_game().is_none());
        assert!(game.check_termination().is_none());
        assert!(game.check_termination().is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(game.result().map(|r| r.final_score), Some(1));
    }

    #[test]
    fn test_score_frozen_after_end() {
        let (mut game, _) = game_with_store();
        game.start_with_deck(small_deck()).unwrap();
        game.end_game();

        assert_matches!(
            game.submit_answer(6),
            Err(GameError::NotActive(Phase::Ended))
        );
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_reset_returns_to_not_started() {
        let (mut game, _) = game_with_store();
        game.start_with_deck(small_deck()).unwrap();
        game.end_game();
        assert_matches!(
            game.start_with_deck(small_deck()),
            Err(GameError::InvalidTransition(Phase::Ended))
        );

        game.reset();
        assert_eq!(game.phase(), Phase::NotStarted);
        assert!(game.result().is_none());
        assert_eq!(game.remaining(), 0);

        game.start(Operator::Division, Difficulty::Normal).unwrap();
        assert_eq!(game.remaining(), 156);
        assert_eq!(game.config().operator, Operator::Division);
    }

    #[test]
    fn test_hard_game_records_invalid_operator() {
        let (mut game, store) = game_with_store();
        game.start(Operator::Addition, Difficulty::Hard).unwrap();
        assert_eq!(game.current_prompt().map(|p| p.len()), Some(5));

        game.end_game();
        let entries = crate::scoreboard::ScoreboardQuery::all(&*store).unwrap();
        assert_eq!(entries[0].operator, None);
        assert_eq!(entries[0].operator_label(), "Invalid");
        assert_eq!(entries[0].difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("42"), Ok(42));
        assert_eq!(parse_answer(" -7 "), Ok(-7));
        assert_matches!(parse_answer("4.5"), Err(GameError::InvalidAnswerInput(_)));
        assert_matches!(parse_answer(""), Err(GameError::InvalidAnswerInput(_)));
    }
}

//! Error types shared across the game core and the scoreboard backends.

use thiserror::Error;

use crate::game::Phase;
use crate::prompt::{Difficulty, Operator};

/// Errors raised by the game controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("no prompts generated for {difficulty} / {operator}")]
    EmptyDeck {
        difficulty: Difficulty,
        operator: Operator,
    },

    #[error("game is not active (phase: {0:?})")]
    NotActive(Phase),

    #[error("cannot start a game from phase {0:?}; reset first")]
    InvalidTransition(Phase),

    #[error("answer input is not an integer: {0:?}")]
    InvalidAnswerInput(String),
}

/// Errors raised while persisting or reading scoreboard entries.
#[derive(Error, Debug)]
pub enum ScoreboardError {
    #[error("scoreboard I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scoreboard CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("scoreboard database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("malformed scoreboard row: {0}")]
    Parse(#[from] UnknownLabel),

    #[error("malformed scoreboard timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("scoreboard backend unavailable: {0}")]
    Unavailable(String),
}

/// A difficulty or operator label that does not name a known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} label: {value:?}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

pub type ScoreboardResult<T> = std::result::Result<T, ScoreboardError>;

// Library surface: the game core and scoreboard collaborators.
// The terminal host in main.rs only drives these through their public API.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod game;
pub mod generator;
pub mod leaderboard;
pub mod logging;
pub mod prompt;
pub mod runtime;
pub mod scoreboard;
pub mod session;

pub use error::{GameError, ScoreboardError};
pub use game::{EndReason, Game, GameResult, Outcome, Phase, Submission};
pub use prompt::{Card, Deck, Difficulty, Operator, Prompt, Symbol, Token};
pub use session::SessionConfig;

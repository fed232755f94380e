//! Persistence boundary for finished games.
//!
//! Entries are append-only. Backends implement [`ScoreboardRecorder`] to
//! store a finished game and [`ScoreboardQuery`] to read results back for
//! the leaderboard and histogram views.

pub mod cache;
pub mod csv_store;
pub mod memory;
pub mod retry;
pub mod sqlite;

pub use cache::{CachedScoreboard, Clock, SystemClock};
pub use csv_store::CsvScoreboard;
pub use memory::MemoryScoreboard;
pub use retry::{RetryConfig, RetryingRecorder};
pub use sqlite::SqliteScoreboard;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ScoreboardResult;
use crate::prompt::{Difficulty, Operator};
use crate::session::SessionConfig;

/// One finished game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardEntry {
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Local>,
    pub username: String,
    pub difficulty: Difficulty,
    #[serde(with = "operator_label")]
    pub operator: Option<Operator>,
    pub score: i64,
}

impl ScoreboardEntry {
    pub fn new(config: &SessionConfig, score: i64, timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            username: config.display_username().to_string(),
            difficulty: config.difficulty,
            operator: config.recorded_operator(),
            score,
        }
    }

    pub fn operator_label(&self) -> String {
        Operator::label(self.operator)
    }

    pub fn matches(&self, difficulty: Difficulty, operator: Option<Operator>) -> bool {
        self.difficulty == difficulty && self.operator == operator
    }
}

/// Appends finished games to durable storage
pub trait ScoreboardRecorder {
    fn record(&self, entry: &ScoreboardEntry) -> ScoreboardResult<()>;
}

/// Reads finished games back, in insertion order
pub trait ScoreboardQuery {
    fn all(&self) -> ScoreboardResult<Vec<ScoreboardEntry>>;

    fn query(
        &self,
        difficulty: Difficulty,
        operator: Option<Operator>,
    ) -> ScoreboardResult<Vec<ScoreboardEntry>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|e| e.matches(difficulty, operator))
            .collect())
    }
}

/// A backend usable from both the game and the scoreboard screen
pub trait ScoreboardStore: ScoreboardRecorder + ScoreboardQuery + Send + Sync {}

impl<T: ScoreboardRecorder + ScoreboardQuery + Send + Sync + ?Sized> ScoreboardStore for T {}

impl<T: ScoreboardRecorder + ?Sized> ScoreboardRecorder for Arc<T> {
    fn record(&self, entry: &ScoreboardEntry) -> ScoreboardResult<()> {
        (**self).record(entry)
    }
}

impl<T: ScoreboardRecorder + ?Sized> ScoreboardRecorder for Box<T> {
    fn record(&self, entry: &ScoreboardEntry) -> ScoreboardResult<()> {
        (**self).record(entry)
    }
}

impl<T: ScoreboardQuery + ?Sized> ScoreboardQuery for Arc<T> {
    fn all(&self) -> ScoreboardResult<Vec<ScoreboardEntry>> {
        (**self).all()
    }

    fn query(
        &self,
        difficulty: Difficulty,
        operator: Option<Operator>,
    ) -> ScoreboardResult<Vec<ScoreboardEntry>> {
        (**self).query(difficulty, operator)
    }
}

impl<T: ScoreboardQuery + ?Sized> ScoreboardQuery for Box<T> {
    fn all(&self) -> ScoreboardResult<Vec<ScoreboardEntry>> {
        (**self).all()
    }

    fn query(
        &self,
        difficulty: Difficulty,
        operator: Option<Operator>,
    ) -> ScoreboardResult<Vec<ScoreboardEntry>> {
        (**self).query(difficulty, operator)
    }
}

/// RFC 3339 on write. Reads also accept naive `2024-03-01 10:00:00.123456`
/// stamps, taken as local time.
pub(crate) mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const NAIVE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

    pub fn serialize<S: Serializer>(ts: &DateTime<Local>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Local>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Local>, chrono::ParseError> {
        let raw = raw.trim();
        match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => Ok(ts.with_timezone(&Local)),
            Err(rfc_err) => {
                let naive = NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)?;
                // a stamp inside a DST gap has no local time
                Local.from_local_datetime(&naive).earliest().ok_or(rfc_err)
            }
        }
    }
}

/// Serializes `None` as the literal `Invalid` label used by hard games
pub(crate) mod operator_label {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::prompt::{Operator, INVALID_OPERATOR_LABEL};

    pub fn serialize<S: Serializer>(op: &Option<Operator>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&Operator::label(*op))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Operator>, D::Error> {
        let label = String::deserialize(d)?;
        if label == INVALID_OPERATOR_LABEL {
            return Ok(None);
        }
        label.parse::<Operator>().map(Some).map_err(de::Error::custom)
    }

    pub fn parse(label: &str) -> Result<Option<Operator>, crate::error::UnknownLabel> {
        if label == INVALID_OPERATOR_LABEL {
            Ok(None)
        } else {
            label.parse::<Operator>().map(Some)
        }
    }
}

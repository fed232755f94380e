use std::sync::Mutex;

use super::{ScoreboardEntry, ScoreboardQuery, ScoreboardRecorder};
use crate::error::ScoreboardResult;

/// In-process scoreboard, used for tests and as a fallback when no backend
/// can be opened
#[derive(Debug, Default)]
pub struct MemoryScoreboard {
    entries: Mutex<Vec<ScoreboardEntry>>,
}

impl MemoryScoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ScoreboardRecorder for MemoryScoreboard {
    fn record(&self, entry: &ScoreboardEntry) -> ScoreboardResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.clone());
        Ok(())
    }
}

impl ScoreboardQuery for MemoryScoreboard {
    fn all(&self) -> ScoreboardResult<Vec<ScoreboardEntry>> {
        Ok(self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }
}

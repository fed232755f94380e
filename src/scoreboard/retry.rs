//! Retry scoreboard writes with exponential backoff

use std::time::Duration;

use super::{ScoreboardEntry, ScoreboardQuery, ScoreboardRecorder};
use crate::error::ScoreboardResult;
use crate::prompt::{Difficulty, Operator};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Attempts after the first one
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            backoff_multiplier: 2.0,
            max_delay_ms: 2000,
        }
    }
}

impl RetryConfig {
    /// Delay slept after failed attempt number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay_ms as f64;
        let delay_ms =
            (base * self.backoff_multiplier.powi(attempt as i32)).min(self.max_delay_ms as f64);
        Duration::from_millis(delay_ms as u64)
    }
}

/// Wraps a recorder and retries failed appends before giving up
pub struct RetryingRecorder<R> {
    inner: R,
    config: RetryConfig,
}

impl<R> RetryingRecorder<R> {
    pub fn new(inner: R, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: ScoreboardRecorder> ScoreboardRecorder for RetryingRecorder<R> {
    fn record(&self, entry: &ScoreboardEntry) -> ScoreboardResult<()> {
        let mut attempt = 0;
        loop {
            match self.inner.record(entry) {
                Ok(()) => {
                    if attempt > 0 {
                        tracing::info!(attempt, "scoreboard write succeeded after retry");
                    }
                    return Ok(());
                }
                Err(err) if attempt < self.config.max_retries => {
                    let delay = self.config.delay_for(attempt);
                    tracing::warn!(attempt, ?delay, error = %err, "scoreboard write failed, retrying");
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(attempts = attempt + 1, error = %err, "scoreboard write failed");
                    return Err(err);
                }
            }
        }
    }
}

impl<R: ScoreboardQuery> ScoreboardQuery for RetryingRecorder<R> {
    fn all(&self) -> ScoreboardResult<Vec<ScoreboardEntry>> {
        self.inner.all()
    }

    fn query(
        &self,
        difficulty: Difficulty,
        operator: Option<Operator>,
    ) -> ScoreboardResult<Vec<ScoreboardEntry>> {
        self.inner.query(difficulty, operator)
    }
}

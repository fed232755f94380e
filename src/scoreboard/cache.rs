//! Bounded, time-expiring cache in front of a scoreboard backend.
//!
//! Each distinct read (all rows, or one difficulty/operator category) is a
//! separate cache slot. A slot is served from memory until it is older than
//! `max_age`, after which the next read goes to the backend. When `capacity`
//! slots are filled, the oldest slot is evicted. Recording through the cache
//! drops every slot so the player's own score shows up on the next read.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::{ScoreboardEntry, ScoreboardQuery, ScoreboardRecorder};
use crate::error::ScoreboardResult;
use crate::prompt::{Difficulty, Operator};

pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60);
pub const DEFAULT_CAPACITY: usize = 5;

/// Source of "now" for expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

type CacheKey = Option<(Difficulty, Option<Operator>)>;

#[derive(Debug)]
struct Slot {
    key: CacheKey,
    fetched_at: Instant,
    rows: Vec<ScoreboardEntry>,
}

pub struct CachedScoreboard<S, C = SystemClock> {
    inner: S,
    clock: C,
    max_age: Duration,
    capacity: usize,
    slots: Mutex<VecDeque<Slot>>,
}

impl<S> CachedScoreboard<S, SystemClock> {
    pub fn new(inner: S) -> Self {
        Self::with_clock(inner, DEFAULT_MAX_AGE, DEFAULT_CAPACITY, SystemClock)
    }

    pub fn with_limits(inner: S, max_age: Duration, capacity: usize) -> Self {
        Self::with_clock(inner, max_age, capacity, SystemClock)
    }
}

impl<S, C: Clock> CachedScoreboard<S, C> {
    pub fn with_clock(inner: S, max_age: Duration, capacity: usize, clock: C) -> Self {
        Self {
            inner,
            clock,
            max_age,
            capacity: capacity.max(1),
            slots: Mutex::new(VecDeque::new()),
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of slots currently held, fresh or stale
    pub fn cached_slots(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn invalidate(&self) {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn cached<F>(&self, key: CacheKey, fetch: F) -> ScoreboardResult<Vec<ScoreboardEntry>>
    where
        F: FnOnce() -> ScoreboardResult<Vec<ScoreboardEntry>>,
    {
        let now = self.clock.now();
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(pos) = slots.iter().position(|s| s.key == key) {
            if now.saturating_duration_since(slots[pos].fetched_at) < self.max_age {
                tracing::debug!(?key, "scoreboard cache hit");
                return Ok(slots[pos].rows.clone());
            }
            slots.remove(pos);
        }

        tracing::debug!(?key, "scoreboard cache miss");
        let rows = fetch()?;

        while slots.len() >= self.capacity {
            slots.pop_front();
        }
        slots.push_back(Slot {
            key,
            fetched_at: now,
            rows: rows.clone(),
        });

        Ok(rows)
    }
}

impl<S: ScoreboardQuery, C: Clock> ScoreboardQuery for CachedScoreboard<S, C> {
    fn all(&self) -> ScoreboardResult<Vec<ScoreboardEntry>> {
        self.cached(None, || self.inner.all())
    }

    fn query(
        &self,
        difficulty: Difficulty,
        operator: Option<Operator>,
    ) -> ScoreboardResult<Vec<ScoreboardEntry>> {
        self.cached(Some((difficulty, operator)), || {
            self.inner.query(difficulty, operator)
        })
    }
}

impl<S: ScoreboardRecorder, C: Clock> ScoreboardRecorder for CachedScoreboard<S, C> {
    fn record(&self, entry: &ScoreboardEntry) -> ScoreboardResult<()> {
        self.inner.record(entry)?;
        self.invalidate();
        Ok(())
    }
}

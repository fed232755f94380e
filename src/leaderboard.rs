use itertools::Itertools;

use crate::prompt::{Difficulty, Operator};
use crate::scoreboard::ScoreboardEntry;

pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// A scoreboard category as shown in the scoreboard tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Category {
    pub difficulty: Difficulty,
    pub operator: Option<Operator>,
}

impl Category {
    /// The four normal operators followed by hard mode
    pub fn all() -> Vec<Category> {
        Operator::ALL
            .into_iter()
            .map(|op| Category {
                difficulty: Difficulty::Normal,
                operator: Some(op),
            })
            .chain(std::iter::once(Category {
                difficulty: Difficulty::Hard,
                operator: None,
            }))
            .collect()
    }

    pub fn title(&self) -> String {
        match self.operator {
            Some(op) => op.to_string(),
            None => self.difficulty.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub rank: usize,
    pub entry: ScoreboardEntry,
}

/// Top `size` entries by score, highest first, ranked from 1.
/// Ties keep insertion order.
pub fn leaderboard(entries: &[ScoreboardEntry], size: usize) -> Vec<RankedEntry> {
    entries
        .iter()
        .sorted_by(|a, b| b.score.cmp(&a.score))
        .take(size)
        .enumerate()
        .map(|(idx, entry)| RankedEntry {
            rank: idx + 1,
            entry: entry.clone(),
        })
        .collect()
}

/// Number of games per distinct score, ascending by score
pub fn histogram(entries: &[ScoreboardEntry]) -> Vec<(i64, usize)> {
    entries
        .iter()
        .map(|e| e.score)
        .counts()
        .into_iter()
        .sorted_by_key(|&(score, _)| score)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreStats {
    pub games: usize,
    pub best: i64,
    pub worst: i64,
    pub mean: f64,
    pub std_dev: f64,
}

/// Summary over a category; `None` when no games were played
pub fn score_stats(entries: &[ScoreboardEntry]) -> Option<ScoreStats> {
    let scores: Vec<f64> = entries.iter().map(|e| e.score as f64).collect();
    let (worst, best) = match entries.iter().map(|e| e.score).minmax() {
        itertools::MinMaxResult::NoElements => return None,
        itertools::MinMaxResult::OneElement(s) => (s, s),
        itertools::MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };

    Some(ScoreStats {
        games: entries.len(),
        best,
        worst,
        mean: mean(&scores)?,
        std_dev: std_dev(&scores)?,
    })
}

fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;

            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}

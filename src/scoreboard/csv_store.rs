use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{ScoreboardEntry, ScoreboardQuery, ScoreboardRecorder};
use crate::error::ScoreboardResult;

/// Flat-file scoreboard: one CSV row per finished game,
/// `timestamp,username,difficulty,operator,score`
#[derive(Debug)]
pub struct CsvScoreboard {
    path: PathBuf,
    // serializes appends from sessions sharing this handle
    write_lock: Mutex<()>,
}

impl CsvScoreboard {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreboardRecorder for CsvScoreboard {
    fn record(&self, entry: &ScoreboardEntry) -> ScoreboardResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // If the file doesn't exist yet (or is empty), we need to emit a header
        let needs_header = fs::metadata(&self.path).map_or(true, |m| m.len() == 0);

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(entry)?;
        writer.flush()?;

        tracing::debug!(path = %self.path.display(), score = entry.score, "appended scoreboard row");
        Ok(())
    }
}

impl ScoreboardQuery for CsvScoreboard {
    fn all(&self) -> ScoreboardResult<Vec<ScoreboardEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        // short rows (a torn append) surface as decode errors, not length errors
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let mut entries = Vec::new();
        for row in reader.deserialize::<ScoreboardEntry>() {
            match row {
                Ok(entry) => entries.push(entry),
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => {
                    let line = err.position().map(|pos| pos.line());
                    tracing::warn!(
                        path = %self.path.display(),
                        ?line,
                        error = %err,
                        "skipping unreadable scoreboard row"
                    );
                }
            }
        }
        Ok(entries)
    }
}

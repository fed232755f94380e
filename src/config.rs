use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::leaderboard::DEFAULT_LEADERBOARD_SIZE;
use crate::prompt::{Difficulty, Operator};

/// Where finished games are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Csv,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub username: String,
    pub difficulty: Difficulty,
    pub operator: Operator,
    pub backend: Backend,
    /// Overrides the backend's default location
    pub scoreboard_path: Option<PathBuf>,
    pub cache_ttl_secs: u64,
    pub leaderboard_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            difficulty: Difficulty::Normal,
            operator: Operator::Multiplication,
            backend: Backend::Csv,
            scoreboard_path: None,
            cache_ttl_secs: 60,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
        }
    }
}

impl Config {
    pub fn resolved_scoreboard_path(&self) -> PathBuf {
        match (&self.scoreboard_path, self.backend) {
            (Some(path), _) => path.clone(),
            (None, Backend::Csv) => AppDirs::scoreboard_csv_path(),
            (None, Backend::Sqlite) => AppDirs::scoreboard_db_path(),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|err| {
                tracing::warn!(path = %self.path.display(), %err, "ignoring unreadable config");
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

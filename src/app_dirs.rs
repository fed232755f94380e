use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "mathsprint";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    /// State directory: `$HOME/.local/state/mathsprint` when HOME is set
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join(APP_NAME))
        } else {
            Self::project().map(|dirs| dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn config_path() -> PathBuf {
        Self::project()
            .map(|dirs| dirs.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("mathsprint_config.json"))
    }

    pub fn scoreboard_csv_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("mathsprint_scoreboard.csv"))
            .unwrap_or_else(|| PathBuf::from("mathsprint_scoreboard.csv"))
    }

    pub fn scoreboard_db_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("scoreboard.db"))
            .unwrap_or_else(|| PathBuf::from("mathsprint_scoreboard.db"))
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("mathsprint.log"))
            .unwrap_or_else(|| PathBuf::from("mathsprint.log"))
    }
}

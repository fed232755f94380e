use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `mathsprint=debug`
pub const LOG_ENV: &str = "MATHSPRINT_LOG";

const DEFAULT_FILTER: &str = "mathsprint=info";

/// Send logs to `path`; the terminal belongs to the game screen.
pub fn init_file_logging(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // a subscriber may already be installed (tests, embedding hosts)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    Ok(())
}

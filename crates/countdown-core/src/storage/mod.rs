mod config;
pub mod database;
pub mod prefs;

pub use config::{AlarmConfig, Config, NotificationsConfig, TimerConfig};
pub use database::Database;
pub use prefs::Prefs;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `COUNTDOWN_DATA_DIR` overrides the location entirely. Otherwise it is
/// `~/.config/countdown[-dev]/`, with `COUNTDOWN_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("COUNTDOWN_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env =
                std::env::var("COUNTDOWN_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("countdown-dev")
            } else {
                base_dir.join("countdown")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

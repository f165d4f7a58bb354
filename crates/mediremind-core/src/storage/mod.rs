mod config;
pub mod database;

pub use config::{AuthConfig, Config, ScheduleConfig, SupplyConfig};
pub use database::{Database, DoseLogEntry, MedicationStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `MEDIREMIND_DATA_DIR` wins when set. Otherwise `~/.config/mediremind[-dev]/`
/// based on `MEDIREMIND_ENV` (set `MEDIREMIND_ENV=dev` for the development
/// directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("MEDIREMIND_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("MEDIREMIND_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("mediremind-dev")
            } else {
                base_dir.join("mediremind")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

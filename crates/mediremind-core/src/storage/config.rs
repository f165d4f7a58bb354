//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Schedule generation horizon
//! - Refill defaults for new medications
//! - Lock-screen PIN and prompt labels
//!
//! Configuration is stored at `<data dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::auth::AuthLabels;
use crate::error::ConfigError;

/// Schedule generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Days ahead to expand reminders, also the cap for ongoing treatments.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
}

/// Supply tracking defaults applied when a medication is added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyConfig {
    #[serde(default = "default_refill_threshold")]
    pub default_refill_threshold: u32,
    #[serde(default)]
    pub refill_reminders: bool,
}

/// Lock-screen settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Hex SHA-256 of the PIN. Unset means no PIN has been chosen yet.
    #[serde(default)]
    pub pin_sha256: Option<String>,
    /// Wrong PINs allowed per session before the prompt reports a lockout.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_fallback_label")]
    pub fallback_label: String,
    #[serde(default = "default_cancel_label")]
    pub cancel_label: String,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub supply: SupplyConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_horizon_days() -> u32 {
    30
}
fn default_refill_threshold() -> u32 {
    5
}
fn default_max_attempts() -> u32 {
    5
}
fn default_fallback_label() -> String {
    "Use PIN".into()
}
fn default_cancel_label() -> String {
    "Cancel".into()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
        }
    }
}

impl Default for SupplyConfig {
    fn default() -> Self {
        Self {
            default_refill_threshold: default_refill_threshold(),
            refill_reminders: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            pin_sha256: None,
            max_attempts: default_max_attempts(),
            fallback_label: default_fallback_label(),
            cancel_label: default_cancel_label(),
        }
    }
}

impl AuthConfig {
    pub fn labels(&self) -> AuthLabels {
        AuthLabels {
            fallback_label: self.fallback_label.clone(),
            cancel_label: self.cancel_label.clone(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location inside the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first run.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there when it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, keeping the field's type.
    /// Does not persist; call [`Config::save`] afterwards.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// as the field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.schedule.horizon_days, 30);
        assert_eq!(parsed.auth.max_attempts, 5);
        assert_eq!(parsed.auth.pin_sha256, None);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[schedule]\nhorizon_days = 7\n").unwrap();
        assert_eq!(parsed.schedule.horizon_days, 7);
        assert_eq!(parsed.supply.default_refill_threshold, 5);
        assert_eq!(parsed.auth.fallback_label, "Use PIN");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("schedule.horizon_days").as_deref(), Some("30"));
        assert_eq!(cfg.get("supply.refill_reminders").as_deref(), Some("false"));
        assert_eq!(cfg.get("auth.cancel_label").as_deref(), Some("Cancel"));
        assert!(cfg.get("schedule.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_preserves_field_types() {
        let mut cfg = Config::default();
        cfg.set("schedule.horizon_days", "14").unwrap();
        cfg.set("supply.refill_reminders", "true").unwrap();
        cfg.set("auth.fallback_label", "Enter code").unwrap();
        assert_eq!(cfg.schedule.horizon_days, 14);
        assert!(cfg.supply.refill_reminders);
        assert_eq!(cfg.auth.fallback_label, "Enter code");
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("schedule.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("supply.refill_reminders", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("schedule.horizon_days", "-3"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.schedule.horizon_days, 30);
    }

    #[test]
    fn load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.schedule.horizon_days, 30);

        let mut cfg = cfg;
        cfg.set("schedule.horizon_days", "60").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().schedule.horizon_days, 60);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "schedule = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn auth_labels_from_config() {
        let labels = Config::default().auth.labels();
        assert_eq!(labels, AuthLabels::default());
    }
}

//! User settings

use serde::{Deserialize, Serialize};

use super::paths::SanityPaths;
use crate::error::{LedgerError, LedgerResult};
use crate::sync::file_io::write_json_atomic;

/// Preferences stored in `config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Root of this user's namespace in the remote store
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Log filter used when `SANITY_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Append every change to `audit.log`
    #[serde(default = "default_audit_enabled")]
    pub audit_enabled: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_user_id() -> String {
    "local".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_audit_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            user_id: default_user_id(),
            log_level: default_log_level(),
            currency_symbol: default_currency(),
            audit_enabled: default_audit_enabled(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if there is no file
    pub fn load_or_create(paths: &SanityPaths) -> LedgerResult<Self> {
        let settings_path = paths.settings_file();
        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| LedgerError::Io(format!("Failed to read settings file: {}", e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| LedgerError::Config(format!("Failed to parse settings file: {}", e)))
    }

    pub fn save(&self, paths: &SanityPaths) -> LedgerResult<()> {
        paths.ensure_directories()?;
        write_json_atomic(&paths.settings_file(), self)
    }

    /// Set one setting from its `config.json` key and a string value
    pub fn set(&mut self, key: &str, value: &str) -> LedgerResult<()> {
        match key {
            "user_id" => {
                let value = value.trim();
                if value.is_empty() || value.contains('/') {
                    return Err(LedgerError::Validation(
                        "user_id must be non-empty and contain no '/'".into(),
                    ));
                }
                self.user_id = value.to_string();
            }
            "log_level" => self.log_level = value.to_string(),
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "audit_enabled" => {
                self.audit_enabled = value.parse().map_err(|_| {
                    LedgerError::Validation(format!("Expected true or false, got '{}'", value))
                })?
            }
            other => {
                return Err(LedgerError::Validation(format!("Unknown setting '{}'", other)))
            }
        }
        Ok(())
    }
}

use crate::postal_code::{PostalCode, DEFAULT_POSTAL_CODE};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_postal_code() -> String {
    DEFAULT_POSTAL_CODE.to_string()
}

fn default_dashboard_path() -> String {
    "dashboard.json".into()
}

fn default_storage_path() -> String {
    "storage.json".into()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Location every location-aware widget fetches for.
    #[serde(default = "default_postal_code")]
    pub postal_code: String,
    /// When enabled the application initialises the logger at debug level.
    /// Defaults to `false` when the field is missing in the settings file.
    #[serde(default)]
    pub debug_logging: bool,
    /// Write logs to this file instead of stdout.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Widget list the dashboard is mounted from.
    #[serde(default = "default_dashboard_path")]
    pub dashboard_path: String,
    /// Key-value file backing widget preferences.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Overrides the column count from the dashboard file.
    #[serde(default)]
    pub columns: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            postal_code: default_postal_code(),
            debug_logging: false,
            log_file: None,
            dashboard_path: default_dashboard_path(),
            storage_path: default_storage_path(),
            columns: None,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).with_context(|| format!("parse settings {path}"))
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// The configured postal code, or the default when it is invalid.
    pub fn postal_code(&self) -> PostalCode {
        match PostalCode::parse(&self.postal_code) {
            Ok(code) => code,
            Err(e) => {
                tracing::warn!("{e}; using {DEFAULT_POSTAL_CODE}");
                PostalCode::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings::load(path.to_str().unwrap()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.postal_code().as_str(), "19129");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"postal_code":"19103","debug_logging":true}"#).unwrap();
        let settings = Settings::load(path.to_str().unwrap()).unwrap();
        assert_eq!(settings.postal_code, "19103");
        assert!(settings.debug_logging);
        assert_eq!(settings.dashboard_path, "dashboard.json");
        assert_eq!(settings.storage_path, "storage.json");
    }

    #[test]
    fn invalid_postal_code_falls_back() {
        let settings = Settings {
            postal_code: "nope".into(),
            ..Settings::default()
        };
        assert_eq!(settings.postal_code(), PostalCode::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let path = path.to_str().unwrap();
        let settings = Settings {
            columns: Some(3),
            ..Settings::default()
        };
        settings.save(path).unwrap();
        assert_eq!(Settings::load(path).unwrap(), settings);
    }
}

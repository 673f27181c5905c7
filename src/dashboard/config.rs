use crate::dashboard::widgets::{merge_json, WidgetRegistry};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

fn default_version() -> u32 {
    1
}

fn default_columns() -> u8 {
    2
}

/// Horizontal extent of a widget card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WidgetWidth {
    /// One grid column.
    #[default]
    Half,
    /// Every grid column.
    Full,
}

impl WidgetWidth {
    pub fn toggled(self) -> Self {
        match self {
            WidgetWidth::Half => WidgetWidth::Full,
            WidgetWidth::Full => WidgetWidth::Half,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetWidth::Half => "half",
            WidgetWidth::Full => "full",
        }
    }
}

/// Initial placement and settings of one widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetSlotConfig {
    pub key: String,
    #[serde(default)]
    pub width: WidgetWidth,
    #[serde(default)]
    pub settings: serde_json::Value,
}

impl WidgetSlotConfig {
    pub fn with_widget(key: &str) -> Self {
        Self {
            key: key.to_string(),
            width: WidgetWidth::Half,
            settings: serde_json::Value::Null,
        }
    }
}

/// Static widget list the dashboard is mounted from. Changes made while the
/// dashboard runs (moves, hides, width toggles) are not written back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_columns")]
    pub columns: u8,
    #[serde(default)]
    pub widgets: Vec<WidgetSlotConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            columns: default_columns(),
            widgets: [
                "weather",
                "system",
                "events",
                "reddit",
                "traffic",
                "news",
                "market",
                "phillyDataExplorer",
                "septa",
                "itinerary",
            ]
            .iter()
            .map(|key| WidgetSlotConfig::with_widget(key))
            .collect(),
        }
    }
}

impl DashboardConfig {
    /// Load a configuration from disk. A missing or empty file yields the
    /// default widget list. Unknown and duplicate widgets are filtered out
    /// using the provided registry.
    pub fn load(path: impl AsRef<Path>, registry: &WidgetRegistry) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).unwrap_or_default();
        let mut cfg = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("parse dashboard config {}", path.display()))?
        };
        let warnings = cfg.sanitize(registry);
        for w in warnings {
            tracing::warn!("{w}");
        }
        Ok(cfg)
    }

    /// Save the configuration to disk.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Remove unknown or repeated widgets and fill in default settings.
    pub fn sanitize(&mut self, registry: &WidgetRegistry) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();
        self.widgets.retain(|slot| {
            if slot.key.is_empty() {
                return false;
            }
            if !registry.contains(&slot.key) {
                tracing::warn!(widget = %slot.key, "unknown dashboard widget dropped");
                warnings.push(format!("unknown dashboard widget '{}' dropped", slot.key));
                return false;
            }
            if !seen.insert(slot.key.clone()) {
                warnings.push(format!("duplicate dashboard widget '{}' dropped", slot.key));
                return false;
            }
            true
        });
        for slot in &mut self.widgets {
            let defaults = registry
                .default_settings(&slot.key)
                .unwrap_or_else(|| json!({}));
            slot.settings = if slot.settings.is_null() {
                defaults
            } else {
                merge_json(&defaults, &slot.settings)
            };
        }
        if self.columns == 0 {
            warnings.push("dashboard columns must be at least 1".into());
            self.columns = 1;
        }
        warnings
    }

    pub fn settings_for(&self, key: &str) -> Option<&serde_json::Value> {
        self.widgets
            .iter()
            .find(|slot| slot.key == key)
            .map(|slot| &slot.settings)
    }

    pub fn path_for(base: &str) -> PathBuf {
        let base = Path::new(base);
        if base.is_dir() {
            base.join("dashboard.json")
        } else {
            PathBuf::from(base)
        }
    }
}

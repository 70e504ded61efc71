//! Configuration and settings management for MapKit
//!
//! Provides configuration file handling, defaults, and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - History settings (timeline depth limits per editing surface)
//! - Event bus sizing
//! - Logging (level filter, output format)

use mapkit_core::HistoryKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

/// Undo/redo timeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of changesets kept on a timeline's backward stack
    pub max_depth: usize,
    /// Per-surface overrides, keyed by history key name (e.g. "layout")
    pub max_depth_overrides: BTreeMap<String, usize>,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_depth: 100,
            max_depth_overrides: BTreeMap::new(),
        }
    }
}

impl HistorySettings {
    /// Resolve the depth limit for one timeline
    pub fn depth_for(&self, key: HistoryKey) -> usize {
        self.max_depth_overrides
            .get(key.as_str())
            .copied()
            .unwrap_or(self.max_depth)
    }

    /// Overrides with parsed keys. Unknown names are skipped; `validate`
    /// rejects them.
    pub fn overrides(&self) -> impl Iterator<Item = (HistoryKey, usize)> + '_ {
        self.max_depth_overrides
            .iter()
            .filter_map(|(name, depth)| name.parse().ok().map(|key| (key, *depth)))
    }

    fn validate(&self) -> SettingsResult<()> {
        if self.max_depth == 0 {
            return Err(SettingsError::invalid("history.max_depth", "must be > 0"));
        }
        for (name, depth) in &self.max_depth_overrides {
            if name.parse::<HistoryKey>().is_err() {
                return Err(SettingsError::invalid(
                    format!("history.max_depth_overrides.{}", name),
                    "unknown history key",
                ));
            }
            if *depth == 0 {
                return Err(SettingsError::invalid(
                    format!("history.max_depth_overrides.{}", name),
                    "must be > 0",
                ));
            }
        }
        Ok(())
    }
}

/// Event bus sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusSettings {
    /// Capacity of the broadcast channel used by async observers
    pub channel_capacity: usize,
    /// Keep a bounded in-memory history of published events
    pub enable_history: bool,
    /// Maximum number of retained events
    pub max_history_size: usize,
}

impl Default for EventBusSettings {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            enable_history: false,
            max_history_size: 1000,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level filter ("error", "warn", "info", "debug", "trace");
    /// `RUST_LOG` takes precedence when set
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Undo/redo timelines
    pub history: HistorySettings,
    /// Event bus
    pub event_bus: EventBusSettings,
    /// Logging
    pub logging: LoggingSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config location: `<config dir>/mapkit/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("mapkit").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load the config at `path`, or defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = ConfigFormat::from_path(path)?;

        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
            })?;
        }

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.history.validate()?;

        if self.event_bus.channel_capacity == 0 {
            return Err(SettingsError::invalid(
                "event_bus.channel_capacity",
                "must be > 0",
            ));
        }

        if self.event_bus.enable_history && self.event_bus.max_history_size == 0 {
            return Err(SettingsError::invalid(
                "event_bus.max_history_size",
                "must be > 0 when history is enabled",
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(SettingsError::invalid(
                "logging.level",
                format!("expected one of {}", LOG_LEVELS.join(", ")),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::combat::UNKNOWN_COMBATANT;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tui: TuiConfig,
    pub combat: CombatConfig,
    pub data: DataConfig,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Input poll interval in milliseconds for the event loop.
    pub tick_rate_ms: u64,
}

/// Combat tracker behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Refresh interval of the live turn clock while a turn is running.
    pub clock_tick_ms: u64,
    /// Name recorded for a turn whose combatant was removed mid-turn.
    pub unknown_combatant_label: String,
    /// Save the roster and history on quit, and load them on start.
    pub autosave: bool,
}

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 250 }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            clock_tick_ms: 1000,
            unknown_combatant_label: UNKNOWN_COMBATANT.to_string(),
            autosave: true,
        }
    }
}

/// Where the configuration came from. Loading happens before logging is
/// installed, so the outcome is carried out and logged by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Missing(PathBuf),
    Invalid { path: PathBuf, error: String },
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            Self::File(path) => log::info!("Loaded config from {}", path.display()),
            Self::Missing(path) => {
                log::debug!("No config file at {}, using defaults", path.display())
            }
            Self::Invalid { path, error } => log::warn!(
                "Failed to parse config at {}: {error}; using defaults",
                path.display()
            ),
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/initiative-tracker/config.toml`.
    /// Falls back to `Default` if the file is missing or unparseable.
    pub fn load() -> (Self, ConfigSource) {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => Self::from_toml(&contents, config_path),
            Err(_) => (Self::default(), ConfigSource::Missing(config_path)),
        }
    }

    fn from_toml(contents: &str, source: PathBuf) -> (Self, ConfigSource) {
        match toml::from_str(contents) {
            Ok(config) => (config, ConfigSource::File(source)),
            Err(e) => (
                Self::default(),
                ConfigSource::Invalid {
                    path: source,
                    error: e.to_string(),
                },
            ),
        }
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("initiative-tracker"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    /// Where the roster and turn history are autosaved.
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir().join("combat.json")
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("initiative-tracker").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

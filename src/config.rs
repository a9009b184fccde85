//! On-disk configuration: settings and the rule list.
//!
//! Persisted as pretty-printed JSON under the per-user config directory.
//! Loading is total: a missing, unreadable, or corrupt file yields the
//! default configuration with a warning, never an error, so the core
//! always starts.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::keys::Key;
use crate::rules::{BlockRule, ToggleHotkey};

/// Directory name under the platform config dir.
const APP_DIR: &str = "keyfence";
/// Config file name inside [`APP_DIR`].
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine a config directory for this user")]
    NoConfigDir,
    #[error("failed to write config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Application settings, including the toggle hotkey record.
///
/// `run_at_startup` and `start_minimized` are consumed by the outer layers
/// (autostart registration, window presentation); they are round-tripped
/// here so those layers share one config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub run_at_startup: bool,
    pub start_minimized: bool,
    pub toggle_key: Key,
    pub toggle_ctrl: bool,
    pub toggle_alt: bool,
    pub toggle_shift: bool,
    pub toggle_win: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            run_at_startup: false,
            start_minimized: false,
            toggle_key: Key::F12,
            toggle_ctrl: true,
            toggle_alt: true,
            toggle_shift: false,
            toggle_win: false,
        }
    }
}

impl AppSettings {
    /// The toggle hotkey these settings describe.
    pub fn toggle_hotkey(&self) -> ToggleHotkey {
        ToggleHotkey::new(
            self.toggle_key,
            self.toggle_ctrl,
            self.toggle_alt,
            self.toggle_shift,
            self.toggle_win,
        )
    }
}

/// Everything that goes to disk: settings plus the ordered rule list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigData {
    pub settings: AppSettings,
    pub rules: Vec<BlockRule>,
}

impl Default for ConfigData {
    fn default() -> Self {
        Self {
            settings: AppSettings::default(),
            rules: default_rules(),
        }
    }
}

/// The rule set shipped on first start or after a corrupt config.
pub fn default_rules() -> Vec<BlockRule> {
    vec![
        BlockRule {
            name: "No WinKey".to_string(),
            key: Key::LWin,
            require_win: true,
            ..Default::default()
        },
        BlockRule {
            name: "No Alt-Tab".to_string(),
            key: Key::Tab,
            require_alt: true,
            ..Default::default()
        },
    ]
}

/// Path of the config file, `None` when the platform offers no config dir.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load the configuration from the default location.
pub fn load() -> ConfigData {
    match config_path() {
        Some(path) => load_from(&path),
        None => {
            crate::warn!("no config directory available, using defaults");
            ConfigData::default()
        }
    }
}

/// Load from an explicit path, falling back to defaults on any failure.
pub fn load_from(path: &Path) -> ConfigData {
    if !path.exists() {
        crate::info!("no config at {}, using defaults", path.display());
        return ConfigData::default();
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            crate::warn!("failed to read {}: {}, using defaults", path.display(), e);
            return ConfigData::default();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(data) => data,
        Err(e) => {
            crate::warn!("corrupt config at {}: {}, using defaults", path.display(), e);
            ConfigData::default()
        }
    }
}

/// Persist to the default location.
pub fn save(data: &ConfigData) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(&path, data)
}

/// Persist to an explicit path, creating parent directories as needed.
pub fn save_to(path: &Path, data: &ConfigData) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json)?;
    crate::debug!("config saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

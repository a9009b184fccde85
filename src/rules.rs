//! Blocking rules and the protection-toggle hotkey.
//!
//! These are owned and edited by the configuration layer; the engine only
//! ever observes read-only snapshots of them.

use serde::{Deserialize, Serialize};

use crate::keys::Key;

/// Placeholder name assigned to freshly created rules. Rules still carrying
/// it are labeled from their key combination instead.
pub const DEFAULT_RULE_NAME: &str = "New Rule";

/// One key combination to block while protection is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockRule {
    pub name: String,
    pub key: Key,
    #[serde(rename = "ctrl")]
    pub require_ctrl: bool,
    #[serde(rename = "alt")]
    pub require_alt: bool,
    #[serde(rename = "shift")]
    pub require_shift: bool,
    #[serde(rename = "win")]
    pub require_win: bool,
    pub active: bool,
}

impl Default for BlockRule {
    fn default() -> Self {
        Self {
            name: DEFAULT_RULE_NAME.to_string(),
            key: Key::None,
            require_ctrl: false,
            require_alt: false,
            require_shift: false,
            require_win: false,
            active: true,
        }
    }
}

impl BlockRule {
    /// Human-readable label: the custom name if one was set, otherwise the
    /// key combination ("Ctrl + Alt + Tab").
    pub fn label(&self) -> String {
        if !self.name.trim().is_empty() && self.name != DEFAULT_RULE_NAME {
            return self.name.clone();
        }

        let mut parts: Vec<String> = Vec::with_capacity(5);
        if self.require_ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.require_alt {
            parts.push("Alt".to_string());
        }
        if self.require_shift {
            parts.push("Shift".to_string());
        }
        if self.require_win {
            parts.push("Win".to_string());
        }
        parts.push(self.key.to_string());
        parts.join(" + ")
    }
}

/// The single configured combination that flips protection on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToggleHotkey {
    pub key: Key,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub win: bool,
}

impl ToggleHotkey {
    pub fn new(key: Key, ctrl: bool, alt: bool, shift: bool, win: bool) -> Self {
        Self {
            key,
            ctrl,
            alt,
            shift,
            win,
        }
    }
}

#[cfg(test)]
#[path = "rules_test.rs"]
mod tests;

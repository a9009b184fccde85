//! Logical key identifiers.
//!
//! Platform hook backends translate their native key codes into [`Key`]
//! before anything else sees the event, so the decision engine and the
//! configuration layer never deal with raw virtual-key codes.

use serde::{Deserialize, Serialize};

/// A logical, platform-independent key.
///
/// `None` is a sentinel: a rule or toggle keyed to it never matches any
/// physical key. Backends map unrecognized physical keys to `Other(code)`
/// rather than `None` so the sentinel stays inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Key {
    #[default]
    None,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Top-row digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    F13, F14, F15, F16, F17, F18, F19, F20, F21, F22, F23, F24,

    // Editing and whitespace
    Tab, Enter, Space, Backspace, Delete, Insert, Escape,

    // Navigation
    Home, End, PageUp, PageDown, Up, Down, Left, Right,

    // Locks and system keys
    CapsLock, NumLock, ScrollLock, PrintScreen, Pause, Apps,

    // Modifiers as standalone keys (a low-level hook reports these as
    // ordinary key-down events)
    LShift, RShift, LCtrl, RCtrl, LAlt, RAlt, LWin, RWin,

    /// Platform key code with no logical mapping.
    Other(u32),
}

impl Key {
    /// Whether this key is a Windows/Command key.
    pub fn is_win_key(self) -> bool {
        matches!(self, Key::LWin | Key::RWin)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::None => write!(f, "None"),
            Key::Other(code) => write!(f, "Key({})", code),
            Key::Digit0 => write!(f, "0"),
            Key::Digit1 => write!(f, "1"),
            Key::Digit2 => write!(f, "2"),
            Key::Digit3 => write!(f, "3"),
            Key::Digit4 => write!(f, "4"),
            Key::Digit5 => write!(f, "5"),
            Key::Digit6 => write!(f, "6"),
            Key::Digit7 => write!(f, "7"),
            Key::Digit8 => write!(f, "8"),
            Key::Digit9 => write!(f, "9"),
            other => write!(f, "{:?}", other),
        }
    }
}

/// One key press as observed by the hook callback.
///
/// Constructed fresh per callback invocation and never stored; the modifier
/// flags are the keyboard state at the moment the event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    /// True exactly when the event's own key is a Windows/Command key.
    pub is_win_key: bool,
}

impl KeyEvent {
    /// Build an event, deriving `is_win_key` from the key identity.
    pub fn new(key: Key, ctrl: bool, alt: bool, shift: bool) -> Self {
        Self {
            key,
            ctrl,
            alt,
            shift,
            is_win_key: key.is_win_key(),
        }
    }
}

#[cfg(test)]
#[path = "keys_test.rs"]
mod tests;

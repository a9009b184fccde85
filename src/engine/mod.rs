//! The per-keystroke decision engine.
//!
//! `BlockerEngine::decide` runs inside the OS hook callback for every key
//! press, so it must return in well under a millisecond: no I/O, no
//! allocation, no lock the owning thread could hold for long. Operating
//! systems silently remove hooks that stall, which would disable protection
//! until a manual reinstall.

pub mod bridge;
pub mod snapshot;

pub use bridge::{toggle_channel, ToggleNotifier, ToggleRequest};
pub use snapshot::SnapshotCell;

use std::sync::atomic::{AtomicBool, Ordering};

use crate::keys::{Key, KeyEvent};
use crate::rules::{BlockRule, ToggleHotkey};

/// Outcome of a single key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Swallow the event; no other application sees it.
    Block,
    /// Hand the event on to the rest of the system.
    PassThrough,
}

/// Shared state read by the hook thread and written by the owning thread.
///
/// Rule and toggle updates are published as whole immutable snapshots; the
/// hook thread may process a few more events under the previous snapshot
/// right after an update, which is fine.
pub struct BlockerEngine {
    rules: SnapshotCell<Vec<BlockRule>>,
    toggle: SnapshotCell<ToggleHotkey>,
    blocking_active: AtomicBool,
    notifier: ToggleNotifier,
}

impl BlockerEngine {
    /// Create an engine with no rules, no toggle hotkey, and protection
    /// off. The notifier feeds toggle requests to the owning task.
    pub fn new(notifier: ToggleNotifier) -> Self {
        Self {
            rules: SnapshotCell::new(Vec::new()),
            toggle: SnapshotCell::new(ToggleHotkey::default()),
            blocking_active: AtomicBool::new(false),
            notifier,
        }
    }

    /// Replace the rule snapshot wholesale. The caller passes only the
    /// rules that should be enforced (i.e. it filters out inactive ones);
    /// order is preserved and decides match priority.
    pub fn set_rules(&self, rules: Vec<BlockRule>) {
        self.rules.publish(rules);
    }

    /// Replace the toggle hotkey configuration.
    pub fn set_toggle_hotkey(&self, hotkey: ToggleHotkey) {
        self.toggle.publish(hotkey);
    }

    /// Flip rule-based blocking on or off without touching the hook.
    pub fn set_blocking_state(&self, enabled: bool) {
        self.blocking_active.store(enabled, Ordering::SeqCst);
    }

    /// Current protection state.
    pub fn is_blocking_active(&self) -> bool {
        self.blocking_active.load(Ordering::SeqCst)
    }

    /// Decide the fate of one key event.
    ///
    /// Total over all inputs: this never fails and never performs I/O.
    /// Evaluation order is fixed: toggle hotkey first (regardless of the
    /// protection state), then the protection short-circuit, then a
    /// first-exact-match scan of the rule snapshot.
    pub fn decide(&self, event: &KeyEvent) -> Decision {
        // 1. Toggle hotkey, always swallowed so no other app observes it.
        //    The configured win flag is deliberately not compared; a toggle
        //    saved with Win set still fires without Win held. Changing this
        //    changes which combinations toggle protection, so it stays.
        let toggle = self.toggle.read();
        if toggle.key != Key::None
            && event.key == toggle.key
            && event.ctrl == toggle.ctrl
            && event.alt == toggle.alt
            && event.shift == toggle.shift
        {
            self.notifier.notify();
            return Decision::Block;
        }

        // 2. Protection off: everything else passes untouched.
        if !self.blocking_active.load(Ordering::SeqCst) {
            return Decision::PassThrough;
        }

        // 3. First exact match wins; a same-key rule whose modifiers do
        //    not match does not stop the scan.
        let rules = self.rules.read();
        for rule in rules.iter() {
            if rule.key == Key::None || rule.key != event.key {
                continue;
            }

            // Win-required rules block on the Win key alone, without
            // consulting the rule's other modifier requirements.
            if event.is_win_key && rule.require_win {
                return Decision::Block;
            }

            if rule.require_alt == event.alt
                && rule.require_ctrl == event.ctrl
                && rule.require_shift == event.shift
            {
                return Decision::Block;
            }
        }

        Decision::PassThrough
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

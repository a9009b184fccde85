//! Application controller: owns the configuration, the engine, and the
//! hook lifecycle, and consumes toggle requests from the hook thread.
//!
//! This is the "owning thread" side of the core: every publish into the
//! engine happens here, and the protection flip requested by the toggle
//! hotkey is decided here by inverting the controller's own state.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::config::{self, ConfigData};
use crate::engine::{toggle_channel, BlockerEngine, ToggleRequest};
use crate::hook::{create_platform_backend, DecisionFn, HookBackend, HookService};
use crate::rules::BlockRule;

pub struct App {
    config: ConfigData,
    engine: Arc<BlockerEngine>,
    hooks: HookService,
    toggle_rx: UnboundedReceiver<ToggleRequest>,
    protection_active: bool,
}

impl App {
    /// Build the app from the on-disk configuration and the platform hook
    /// backend. Protection starts off; the toggle hotkey switches it on.
    pub fn bootstrap() -> Self {
        Self::with_parts(config::load(), create_platform_backend())
    }

    /// Dependency-injected constructor, also used by tests with a mock
    /// backend.
    pub fn with_parts(config: ConfigData, backend: Box<dyn HookBackend>) -> Self {
        let (notifier, toggle_rx) = toggle_channel();
        let engine = Arc::new(BlockerEngine::new(notifier));

        engine.set_toggle_hotkey(config.settings.toggle_hotkey());
        engine.set_rules(active_rules(&config.rules));
        engine.set_blocking_state(false);

        Self {
            config,
            engine,
            hooks: HookService::new(backend),
            toggle_rx,
            protection_active: false,
        }
    }

    pub fn engine(&self) -> Arc<BlockerEngine> {
        self.engine.clone()
    }

    pub fn is_protection_active(&self) -> bool {
        self.protection_active
    }

    /// Replace the configuration and republish the derived snapshots.
    pub fn apply_config(&mut self, config: ConfigData) {
        self.engine.set_toggle_hotkey(config.settings.toggle_hotkey());
        self.engine.set_rules(active_rules(&config.rules));
        self.config = config;
        crate::info!(
            "configuration applied: {} rule(s), toggle {}",
            self.config.rules.len(),
            self.config.settings.toggle_key
        );
    }

    /// Persist the current configuration.
    pub fn save_config(&self) -> Result<(), config::ConfigError> {
        config::save(&self.config)
    }

    /// One toggle request: invert the protection state and publish it.
    pub fn handle_toggle(&mut self) {
        self.protection_active = !self.protection_active;
        self.engine.set_blocking_state(self.protection_active);
        crate::info!(
            "protection {}",
            if self.protection_active { "enabled" } else { "disabled" }
        );
    }

    /// Install the hook and service toggle requests until shutdown.
    ///
    /// A hook registration failure is not fatal: the loop still runs so
    /// the process can be inspected and shut down normally, but protection
    /// is unavailable. Registration is not retried.
    pub async fn run(mut self) {
        let engine = self.engine.clone();
        let decide: DecisionFn = Arc::new(move |event| engine.decide(event));

        if let Err(e) = self.hooks.install(decide) {
            crate::error!("protection unavailable: {}", e);
        }

        let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel::<()>();
        if let Err(e) = ctrlc::set_handler(move || {
            let _ = shutdown_tx.send(());
        }) {
            crate::warn!("failed to register Ctrl-C handler: {}", e);
        }

        loop {
            tokio::select! {
                request = self.toggle_rx.recv() => match request {
                    Some(ToggleRequest) => self.handle_toggle(),
                    // Engine gone; nothing left to service.
                    None => break,
                },
                _ = shutdown_rx.recv() => {
                    crate::info!("shutdown requested");
                    break;
                }
            }
        }

        self.hooks.uninstall();
    }
}

/// Snapshot-ready copy of the rules that should be enforced, in the
/// caller's order.
fn active_rules(rules: &[BlockRule]) -> Vec<BlockRule> {
    rules.iter().filter(|rule| rule.active).cloned().collect()
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;

//! Hook-thread to owning-task handoff for toggle notifications.
//!
//! The hook callback runs on an OS-controlled thread and must return
//! immediately; the protection-state flip it requests happens later on the
//! owning async task. An unbounded channel keeps the sending side free of
//! any wait, full-queue or otherwise.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A request to flip the global protection state. Carries no payload; the
/// consumer decides the new state by inverting its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleRequest;

/// Sending half handed to the decision engine.
#[derive(Clone)]
pub struct ToggleNotifier {
    tx: UnboundedSender<ToggleRequest>,
}

impl ToggleNotifier {
    /// Queue a toggle request. Never blocks; if the consumer is gone the
    /// request is dropped, which only happens during teardown.
    pub fn notify(&self) {
        if self.tx.send(ToggleRequest).is_err() {
            crate::trace!("toggle request dropped, receiver closed");
        }
    }
}

/// Create the bridge. The notifier goes to the engine, the receiver to the
/// owning task. Rapid repeated notifications arrive as independent
/// requests; debouncing, if wanted, is the consumer's business.
pub fn toggle_channel() -> (ToggleNotifier, UnboundedReceiver<ToggleRequest>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ToggleNotifier { tx }, rx)
}

#[cfg(test)]
#[path = "bridge_test.rs"]
mod tests;

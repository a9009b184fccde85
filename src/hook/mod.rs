//! OS keyboard hook lifecycle.
//!
//! One narrow platform boundary: a backend registers the process for the
//! OS's low-level keyboard event stream and routes every key press through
//! a decision callback. The engine stays platform-agnostic and testable
//! against a mock backend.
//!
//! Backends per target OS:
//! - Windows: `WH_KEYBOARD_LL` hook with its own message-pump thread
//! - macOS: CGEventTap on a dedicated `CFRunLoop` thread (requires the
//!   Accessibility permission)
//! - everything else: a stub whose install reports `Unsupported`

#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(any(windows, target_os = "macos")))]
mod unsupported;
#[cfg(windows)]
mod windows;

use std::sync::Arc;

use crate::engine::Decision;
use crate::keys::KeyEvent;

/// Errors from hook registration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HookError {
    /// The OS refused the registration (missing privilege, resource
    /// exhaustion). Retrying with unchanged conditions will not help.
    #[error("keyboard hook registration failed: {0}")]
    RegistrationFailed(String),
    /// No hook backend exists for this target OS.
    #[error("keyboard hooks are not supported on this platform")]
    Unsupported,
}

/// Decision callback invoked by the backend for every key press.
pub type DecisionFn = Arc<dyn Fn(&KeyEvent) -> Decision + Send + Sync>;

/// A platform keyboard-hook implementation.
///
/// `install` must report failure synchronously even when the backend runs
/// the OS event loop on its own thread. `uninstall` must be safe to call
/// at any time; an event already inside the callback completes normally.
pub trait HookBackend: Send {
    fn install(&mut self, decide: DecisionFn) -> Result<(), HookError>;
    fn uninstall(&mut self);
    fn is_installed(&self) -> bool;
}

/// Owns a backend and enforces the two-state lifecycle:
/// Uninstalled -> Installed -> Uninstalled, both transitions idempotent.
pub struct HookService {
    backend: Box<dyn HookBackend>,
}

impl HookService {
    pub fn new(backend: Box<dyn HookBackend>) -> Self {
        Self { backend }
    }

    /// Service wired to the backend for the current target OS.
    pub fn for_platform() -> Self {
        Self::new(create_platform_backend())
    }

    /// Register the hook. A no-op when already installed. On failure the
    /// service stays uninstalled and does not retry; the caller must treat
    /// protection as unavailable.
    pub fn install(&mut self, decide: DecisionFn) -> Result<(), HookError> {
        if self.backend.is_installed() {
            crate::debug!("hook already installed, ignoring install request");
            return Ok(());
        }
        self.backend.install(decide)?;
        crate::info!("keyboard hook installed");
        Ok(())
    }

    /// Deregister the hook. A no-op when not installed.
    pub fn uninstall(&mut self) {
        if !self.backend.is_installed() {
            return;
        }
        self.backend.uninstall();
        crate::info!("keyboard hook uninstalled");
    }

    pub fn is_installed(&self) -> bool {
        self.backend.is_installed()
    }
}

impl Drop for HookService {
    fn drop(&mut self) {
        self.uninstall();
    }
}

/// Create the hook backend for the current target OS.
pub fn create_platform_backend() -> Box<dyn HookBackend> {
    #[cfg(windows)]
    {
        Box::new(windows::WindowsHookBackend::new())
    }
    #[cfg(target_os = "macos")]
    {
        Box::new(macos::EventTapBackend::new())
    }
    #[cfg(not(any(windows, target_os = "macos")))]
    {
        Box::new(unsupported::UnsupportedBackend)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

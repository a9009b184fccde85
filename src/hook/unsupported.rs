//! Stub backend for targets without a hook implementation.
//!
//! Keeps the crate building everywhere; installing reports the failure the
//! same way a refused OS registration does, so the caller treats
//! protection as unavailable.

use super::{DecisionFn, HookBackend, HookError};

pub struct UnsupportedBackend;

impl HookBackend for UnsupportedBackend {
    fn install(&mut self, _decide: DecisionFn) -> Result<(), HookError> {
        Err(HookError::Unsupported)
    }

    fn uninstall(&mut self) {}

    fn is_installed(&self) -> bool {
        false
    }
}

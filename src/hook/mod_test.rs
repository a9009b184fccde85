// Tests for the hook service lifecycle

use super::*;
use crate::keys::Key;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Backend that records lifecycle calls instead of touching the OS.
struct MockBackend {
    installed: bool,
    fail_install: bool,
    install_calls: Arc<AtomicUsize>,
    uninstall_calls: Arc<AtomicUsize>,
    decide: Option<DecisionFn>,
}

impl MockBackend {
    fn new(fail_install: bool) -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let installs = Arc::new(AtomicUsize::new(0));
        let uninstalls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                installed: false,
                fail_install,
                install_calls: installs.clone(),
                uninstall_calls: uninstalls.clone(),
                decide: None,
            },
            installs,
            uninstalls,
        )
    }
}

impl HookBackend for MockBackend {
    fn install(&mut self, decide: DecisionFn) -> Result<(), HookError> {
        self.install_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_install {
            return Err(HookError::RegistrationFailed("access denied".to_string()));
        }
        self.decide = Some(decide);
        self.installed = true;
        Ok(())
    }

    fn uninstall(&mut self) {
        self.uninstall_calls.fetch_add(1, Ordering::SeqCst);
        self.decide = None;
        self.installed = false;
    }

    fn is_installed(&self) -> bool {
        self.installed
    }
}

fn pass_all() -> DecisionFn {
    Arc::new(|_ev: &KeyEvent| Decision::PassThrough)
}

#[test]
fn test_install_then_uninstall() {
    let (backend, _, _) = MockBackend::new(false);
    let mut service = HookService::new(Box::new(backend));

    assert!(!service.is_installed());
    service.install(pass_all()).unwrap();
    assert!(service.is_installed());
    service.uninstall();
    assert!(!service.is_installed());
}

#[test]
fn test_install_is_idempotent() {
    let (backend, installs, _) = MockBackend::new(false);
    let mut service = HookService::new(Box::new(backend));

    service.install(pass_all()).unwrap();
    service.install(pass_all()).unwrap();
    service.install(pass_all()).unwrap();

    // Only the first call reaches the backend.
    assert_eq!(installs.load(Ordering::SeqCst), 1);
    assert!(service.is_installed());
}

#[test]
fn test_uninstall_is_idempotent() {
    let (backend, _, uninstalls) = MockBackend::new(false);
    let mut service = HookService::new(Box::new(backend));

    service.uninstall();
    assert_eq!(uninstalls.load(Ordering::SeqCst), 0);

    service.install(pass_all()).unwrap();
    service.uninstall();
    service.uninstall();
    assert_eq!(uninstalls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_install_leaves_service_uninstalled() {
    let (backend, installs, _) = MockBackend::new(true);
    let mut service = HookService::new(Box::new(backend));

    let err = service.install(pass_all()).unwrap_err();
    assert!(matches!(err, HookError::RegistrationFailed(_)));
    assert!(!service.is_installed());

    // The service itself never retries; only an explicit caller request
    // reaches the backend again.
    assert_eq!(installs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_drop_uninstalls() {
    let (backend, _, uninstalls) = MockBackend::new(false);
    {
        let mut service = HookService::new(Box::new(backend));
        service.install(pass_all()).unwrap();
    }
    assert_eq!(uninstalls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_decision_fn_reaches_backend() {
    let hits = Arc::new(AtomicUsize::new(0));
    let decide: DecisionFn = {
        let hits = hits.clone();
        Arc::new(move |ev: &KeyEvent| {
            hits.fetch_add(1, Ordering::SeqCst);
            if ev.key == Key::Tab {
                Decision::Block
            } else {
                Decision::PassThrough
            }
        })
    };

    let (backend, _, _) = MockBackend::new(false);
    let mut service = HookService::new(Box::new(backend));
    service.install(decide.clone()).unwrap();

    // Drive the callback the way a backend would.
    let ev = KeyEvent::new(Key::Tab, false, true, false);
    assert_eq!(decide(&ev), Decision::Block);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_hook_error_display() {
    let err = HookError::RegistrationFailed("no privilege".to_string());
    assert_eq!(
        err.to_string(),
        "keyboard hook registration failed: no privilege"
    );
    assert_eq!(
        HookError::Unsupported.to_string(),
        "keyboard hooks are not supported on this platform"
    );
}

//! System-wide keystroke blocking with a global protection toggle.
//!
//! An OS-level keyboard hook routes every key press through a
//! [`engine::BlockerEngine`] that decides, per event, whether to swallow
//! it or let it pass. One configurable "magic" combination flips the
//! global protection state; it is always swallowed so no other
//! application ever observes it.
//!
//! The hook callback runs on an OS-controlled thread and is latency
//! critical; all configuration crosses to it as immutable snapshots (see
//! [`engine::snapshot`]) and the only traffic back is a non-blocking
//! toggle notification (see [`engine::bridge`]).

pub mod app;
pub mod config;
pub mod engine;
pub mod hook;
pub mod keys;
pub mod rules;

// Re-export log macros for use throughout the crate
pub use tracing::{debug, error, info, trace, warn};

use tracing_subscriber::EnvFilter;

/// Binary entry point: initialize logging, load the configuration, and
/// run the blocking service until shutdown.
pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("keyfence starting");

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to build async runtime: {}", e);
            return;
        }
    };

    let app = app::App::bootstrap();
    runtime.block_on(app.run());

    info!("keyfence stopped");
}

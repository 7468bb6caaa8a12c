#![cfg(test)]

//! Test logging for unit tests, installed once through `ctor` in `lib.rs`.
//!
//! Level precedence: `TEST_LOG`, then `RUST_LOG`, then `warn`. Countdown
//! ticks log at `trace`, so `TEST_LOG=quiz_backend=trace` shows the full
//! event stream of a scheduler test.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Idempotent; never panics if a subscriber is already installed.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

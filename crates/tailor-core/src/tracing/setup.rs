//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the tracing/logging system.
///
/// Reads the `TAILOR_LOG` environment variable for per-module log levels.
/// Format: `TAILOR_LOG=tailor_causal::search=debug,tailor_causal::orient=info`
///
/// Falls back to `tailor=info` if `TAILOR_LOG` is not set or is invalid.
/// Safe to call more than once; only the first call installs a subscriber.
///
/// # Panics
///
/// If a global subscriber was installed by something other than this
/// function.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("TAILOR_LOG")
            .unwrap_or_else(|_| EnvFilter::new("tailor=info"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}

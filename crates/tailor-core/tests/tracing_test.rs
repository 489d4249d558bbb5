//! Tests for tracing setup: T0-TRC-01 through T0-TRC-03.

use std::sync::Mutex;

use tailor_core::tracing::init_tracing;

/// Serializes tests that touch the TAILOR_LOG variable.
static TRACING_MUTEX: Mutex<()> = Mutex::new(());

/// T0-TRC-01: A per-module filter string is accepted.
#[test]
fn t0_trc_01_filter_accepted() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("TAILOR_LOG", "tailor_causal::search=debug,tailor_causal::orient=warn");
    init_tracing();
    std::env::remove_var("TAILOR_LOG");
}

/// T0-TRC-02: Repeated initialization is a no-op.
#[test]
fn t0_trc_02_idempotent() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
    tracing::info!(target: "tailor", "still alive");
}

/// T0-TRC-03: Initialization installs the global subscriber.
#[test]
fn t0_trc_03_installs_global_subscriber() {
    let _lock = TRACING_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    init_tracing();
    assert!(tracing::dispatcher::has_been_set());
}

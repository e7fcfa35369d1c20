// Shared test setup

use std::sync::Once;

static INIT: Once = Once::new();

/// Route library tracing through the test harness, honoring RUST_LOG
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

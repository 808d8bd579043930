pub mod fake_coordinator;
pub mod stub_binary;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a test subscriber once per test binary.
///
/// The filter is taken from `GRAPHLAUNCH_LOG`, then `RUST_LOG`, and defaults
/// to `info`. Output goes through the test writer, so it only shows up for
/// failing tests or with `--nocapture`. Driver and capture records are also
/// visible here whenever a test uses `TracingSink` instead of `MemorySink`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = std::env::var(graphlaunch::logging::LOG_ENV)
            .ok()
            .and_then(|s| EnvFilter::try_new(s).ok())
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(false)
            .init();
    });
}

/// Fail the test if `f` has not finished within 10 seconds; barrier and
/// child-process waits are all bounded well below that.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(10), f)
        .await
        .expect("Test timed out after 10 seconds")
}

#![allow(dead_code)]

use std::time::Duration;

use graphlaunch::classpath::ClasspathQuery;
use graphlaunch::config::LaunchSettings;

pub use graphlaunch_test_utils::fake_coordinator::{BarrierCall, RecordingCoordinator};
pub use graphlaunch_test_utils::stub_binary::{echo_args_stub, write_stub};
pub use graphlaunch_test_utils::{init_tracing, with_timeout};

/// A classpath query that just prints `listing`.
pub fn echo_query(listing: &str) -> ClasspathQuery {
    ClasspathQuery::new(
        "/bin/sh",
        vec!["-c".to_string(), format!("printf '%s\\n' '{listing}'")],
    )
}

/// Settings with short barrier timeouts and no drain delay.
pub fn fast_settings() -> LaunchSettings {
    LaunchSettings {
        barrier_timeout: Duration::from_secs(5),
        drain_delay: Duration::from_millis(10),
        ..LaunchSettings::default()
    }
}

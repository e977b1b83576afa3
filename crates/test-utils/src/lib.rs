pub mod builders;
pub mod commands;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a tracing subscriber once per test binary.
///
/// Pool scheduling, process spawns and exit classification are logged at
/// `debug`, recorded failures at `warn`. Output goes through the test writer,
/// so it only shows up for failing tests. `RUST_LOG=procpool=debug` turns
/// on the per-process lines; the default is `warn`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(false)
            .try_init()
            .ok();
    });
}

/// Await `f`, failing the test if it takes longer than [`TEST_TIMEOUT`].
///
/// Every process these tests start finishes well within it, so hitting it
/// means a run, callback or barrier got stuck.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("timed out after {TEST_TIMEOUT:?} waiting on the pool"))
}

//! Telemetry helpers for structured logging.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset or unparsable: queue lifecycle and
/// task log lines at `info`, everything else at `warn`.
pub const DEFAULT_FILTER: &str = "warn,prometheus_task_queue=info";

/// Build the filter `init_tracing` installs.
#[must_use]
pub fn queue_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a fmt subscriber with [`queue_filter`] if no global subscriber is set.
///
/// Applications usually install their own subscriber; this helper is for
/// binaries and tests. Thread names are included so `pq-worker` and
/// `pq-task` lines can be told apart.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(queue_filter())
        .with_thread_names(true)
        .try_init();
}

//! Tokio runtime that executes task units.

use tokio::runtime::{Builder, Runtime};

/// Thread name prefix for task runtime workers.
pub const TASK_THREAD_NAME: &str = "pq-task";

/// Build the multi-threaded runtime a worker loop drives its task units on.
///
/// The loop thread itself only blocks on the guard; task units are spawned
/// onto these worker threads, so a task that blocks its thread cannot stall
/// the guard's deadline and shutdown handling.
///
/// # Errors
///
/// Returns the I/O error if the runtime threads cannot be created.
pub fn build_task_runtime(worker_threads: usize) -> Result<Runtime, std::io::Error> {
    Builder::new_multi_thread()
        .worker_threads(worker_threads.max(1))
        .thread_name(TASK_THREAD_NAME)
        .enable_all()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_spawns_tasks() {
        let rt = build_task_runtime(2).unwrap();
        let value = rt.block_on(async { tokio::spawn(async { 41 + 1 }).await.unwrap() });
        assert_eq!(value, 42);
        rt.shutdown_background();
    }
}

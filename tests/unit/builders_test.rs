//! Tests for builder modules

use std::time::Duration;

use prometheus_task_queue::builders::WorkerBuilder;
use prometheus_task_queue::config::WorkerConfig;
use prometheus_task_queue::core::{InMemoryLogger, Worker};

#[test]
fn test_worker_builder_settings() {
    let builder = WorkerBuilder::new()
        .with_capacity(32)
        .with_task_threads(3)
        .with_abandon_after(Duration::from_millis(100))
        .with_logger(InMemoryLogger::new(8));

    assert_eq!(builder.config().capacity, 32);
    assert_eq!(builder.config().task_threads, 3);
    assert_eq!(builder.config().abandon_after_ms, Some(100));

    let worker = builder.build().unwrap();
    assert_eq!(worker.capacity(), 32);
}

#[test]
fn test_worker_builder_from_config() {
    let config = WorkerConfig::from_json_str(r#"{"capacity": 5, "task_threads": 1}"#).unwrap();
    let worker = WorkerBuilder::from_config(config).build().unwrap();
    assert_eq!(worker.capacity(), 5);
    assert_eq!(worker.usage(), 0);
    assert!(worker.before_run().is_ok());
    assert!(worker.after_run().is_ok());
}

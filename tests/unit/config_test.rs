//! Tests for configuration validation

use std::env;
use std::time::Duration;

use prometheus_task_queue::config::worker::{ENV_ABANDON_AFTER_MS, ENV_CAPACITY, ENV_TASK_THREADS};
use prometheus_task_queue::config::{WorkerConfig, DEFAULT_QUEUE_CAPACITY};

#[test]
fn test_worker_config_validation() {
    let valid = WorkerConfig {
        capacity: 100,
        task_threads: 2,
        abandon_after_ms: None,
    };
    assert!(valid.validate().is_ok());
}

#[test]
fn test_worker_config_invalid_capacity() {
    let invalid = WorkerConfig {
        capacity: 0,
        task_threads: 2,
        abandon_after_ms: None,
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_worker_config_invalid_task_threads() {
    let invalid = WorkerConfig {
        capacity: 10,
        task_threads: 0,
        abandon_after_ms: Some(500),
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_worker_config_default_capacity() {
    assert_eq!(WorkerConfig::default().capacity, DEFAULT_QUEUE_CAPACITY);
    assert_eq!(DEFAULT_QUEUE_CAPACITY, 4096);
}

#[test]
fn test_worker_config_from_json() {
    let json = r#"{
        "capacity": 64,
        "task_threads": 2,
        "abandon_after_ms": 250
    }"#;

    let config = WorkerConfig::from_json_str(json).unwrap();
    assert_eq!(config.capacity, 64);
    assert_eq!(config.task_threads, 2);
    assert_eq!(config.abandon_after_ms, Some(250));
}

#[test]
fn test_worker_config_from_json_rejects_invalid() {
    assert!(WorkerConfig::from_json_str(r#"{"capacity": 0}"#).is_err());
    assert!(WorkerConfig::from_json_str("capacity=4").is_err());
}

// Every environment case lives in one test: the variables are process-wide
// and tests in this binary run in parallel.
#[test]
fn test_worker_config_from_env() {
    env::remove_var(ENV_TASK_THREADS);
    env::set_var(ENV_CAPACITY, "128");
    env::set_var(ENV_ABANDON_AFTER_MS, " 750 ");

    let config = WorkerConfig::from_env().unwrap();
    assert_eq!(config.capacity, 128);
    assert_eq!(config.abandon_after(), Some(Duration::from_millis(750)));
    assert!(config.task_threads >= 1);

    env::set_var(ENV_CAPACITY, "lots");
    let err = WorkerConfig::from_env().unwrap_err();
    assert!(err.starts_with("QUEUE_CAPACITY:"), "unexpected error: {err}");

    env::set_var(ENV_CAPACITY, "0");
    assert!(WorkerConfig::from_env().is_err());

    env::remove_var(ENV_CAPACITY);
    env::remove_var(ENV_ABANDON_AFTER_MS);
    let config = WorkerConfig::from_env().unwrap();
    assert_eq!(config.capacity, DEFAULT_QUEUE_CAPACITY);
    assert_eq!(config.abandon_after_ms, None);
}

//! Tests for error types

use prometheus_task_queue::core::{CodecError, ContextError, Envelope, QueueError};

#[test]
fn test_queue_shutdown_error() {
    let err = QueueError::QueueShutdown;
    assert_eq!(format!("{}", err), "queue has been closed and released");
}

#[test]
fn test_capacity_exceeded_error() {
    let err = QueueError::CapacityExceeded;
    assert_eq!(format!("{}", err), "max capacity reached");
}

#[test]
fn test_already_started_error() {
    let err = QueueError::AlreadyStarted;
    assert_eq!(format!("{}", err), "worker loop already started");
}

#[test]
fn test_task_panicked_error() {
    let err = QueueError::TaskPanicked("index out of bounds".to_string());
    assert_eq!(format!("{}", err), "task panicked: index out of bounds");
}

#[test]
fn test_invalid_config_error() {
    let err = QueueError::InvalidConfig("capacity must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: capacity must be greater than 0"
    );
}

#[test]
fn test_codec_error_display() {
    let err = CodecError::UnsupportedVersion(7);
    assert_eq!(format!("{}", err), "unsupported envelope version: 7");

    let err = Envelope::decode(b"not json").unwrap_err();
    assert!(format!("{}", err).starts_with("malformed envelope:"));
}

#[test]
fn test_context_error_converts_to_anyhow() {
    let err = anyhow::Error::from(ContextError::DeadlineExceeded);
    assert_eq!(err.to_string(), "context deadline exceeded");
}

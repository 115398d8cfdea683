//! Tests for utility functions

use prometheus_task_queue::util::{init_tracing, now_ms};

#[test]
fn test_now_ms_advances() {
    let first = now_ms();
    std::thread::sleep(std::time::Duration::from_millis(5));
    assert!(now_ms() >= first + 5);
}

#[test]
fn test_init_tracing_is_repeatable() {
    init_tracing();
    init_tracing();
}

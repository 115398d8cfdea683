//! Configuration models for the worker.

pub mod worker;

pub use worker::{WorkerConfig, DEFAULT_QUEUE_CAPACITY};

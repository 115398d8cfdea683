//! Builders to construct workers from configuration.

pub mod worker_builder;

pub use worker_builder::WorkerBuilder;

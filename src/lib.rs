//! # Prometheus Task Queue
//!
//! A bounded, in-process, single-consumer task queue.
//!
//! Producers submit envelopes (a callable task or an opaque payload, plus a
//! timeout and retry metadata). One worker loop drains the mailbox in FIFO
//! order and runs each envelope under a deadline, isolating failures:
//!
//! - an error returned by a task is logged and the loop moves on
//! - a panic inside a task stops the loop and surfaces from `run`
//!
//! ## Key Features
//!
//! - **Backpressure**: `queue` never blocks; a full mailbox rejects with
//!   `CapacityExceeded`
//! - **Deadlines**: every task receives a cancellable [`core::TaskContext`]
//! - **Cooperative shutdown**: one-shot, idempotent, drains buffered work
//! - **Transport**: versioned encoding of an envelope's payload and metadata
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use prometheus_task_queue::core::{Envelope, EnvelopeOptions, SimpleWorker, Worker};
//!
//! let worker = Arc::new(SimpleWorker::builder().with_capacity(256).build()?);
//! let handle = worker.start()?;
//!
//! worker.queue(Envelope::from_task(
//!     |ctx| async move {
//!         tokio::select! {
//!             reason = ctx.done() => Err(reason.into()),
//!             () = tokio::time::sleep(Duration::from_millis(10)) => Ok(()),
//!         }
//!     },
//!     EnvelopeOptions::new().with_timeout(Duration::from_secs(1)),
//! ))?;
//!
//! worker.shutdown()?;
//! handle.join().expect("worker thread")?;
//! ```
//!
//! For complete examples, see `tests/worker_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core queue abstractions: envelope, execution guard, and worker loop.
pub mod core;
/// Configuration models for the worker.
pub mod config;
/// Builders to construct workers from configuration.
pub mod builders;
/// Infrastructure adapters backing the worker.
pub mod infra;
/// Runtime adapters.
pub mod runtime;
/// Shared utilities.
pub mod util;

//! Runtime adapters.

pub mod task_runtime;

pub use task_runtime::build_task_runtime;

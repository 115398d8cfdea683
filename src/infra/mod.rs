//! Infrastructure adapters backing the worker.

pub mod mailbox;

pub use mailbox::BoundedMailbox;

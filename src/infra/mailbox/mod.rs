//! Mailbox backends.

pub mod memory;

pub use memory::BoundedMailbox;

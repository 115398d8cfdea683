//! Unit tests for individual components

mod builders_test;
mod codec_test;
mod config_test;
mod error_test;
mod mailbox_test;
mod util_test;

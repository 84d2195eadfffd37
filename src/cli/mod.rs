//! CLI command handlers
//!
//! Each subcommand is implemented in its own module. Handlers print JSON to
//! stdout; logs go to stderr.

pub mod config;
pub mod event;
pub mod helpers;
pub mod init;
pub mod learn;
pub mod session;
pub mod validate;

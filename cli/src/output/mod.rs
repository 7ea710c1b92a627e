//! CLI-specific host implementation
//!
//! Terminal picker, notifications on stderr, and document opening.

pub mod cli_handler;

pub use cli_handler::CliHost;

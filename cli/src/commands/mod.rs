//! CLI command implementations

pub mod config;
pub mod interactive;
pub mod search;

pub use config::config_command;
pub use interactive::interactive_command;
pub use search::search_command;

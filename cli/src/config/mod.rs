//! CLI configuration discovery

pub mod loader;

pub use loader::{CliConfigLoader, ResolvedCliConfig};

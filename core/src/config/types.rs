//! Picker configuration types
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in CLI layer.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Default search program
pub const DEFAULT_SEARCH_PROGRAM: &str = "rg";

/// Default cap on file candidates taken from one invocation
pub const DEFAULT_MAX_RESULTS_PER_ROOT: usize = 50;

/// Exit status ripgrep uses for "ran fine, matched nothing"
pub const DEFAULT_NO_MATCH_EXIT_CODE: i32 = 1;

/// Default placeholder shown in the empty input field
pub const DEFAULT_PLACEHOLDER: &str = "Type to search for files";

/// A fully resolved picker configuration ready for use by core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Program invoked once per root to list matching files
    pub search_program: String,
    /// Extra arguments appended after the file-listing arguments
    pub search_args: Vec<String>,
    /// Maximum number of file candidates kept per root
    pub max_results_per_root: usize,
    /// Exit status meaning "no matches", treated as an empty result
    pub no_match_exit_code: i32,
    /// Placeholder text for the input field
    pub placeholder: String,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            search_program: DEFAULT_SEARCH_PROGRAM.to_string(),
            search_args: Vec::new(),
            max_results_per_root: DEFAULT_MAX_RESULTS_PER_ROOT,
            no_match_exit_code: DEFAULT_NO_MATCH_EXIT_CODE,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl PickerConfig {
    /// Set the search program
    pub fn with_search_program(mut self, program: impl Into<String>) -> Self {
        self.search_program = program.into();
        self
    }

    /// Append extra search arguments
    pub fn with_search_args(mut self, args: Vec<String>) -> Self {
        self.search_args.extend(args);
        self
    }

    /// Set the per-root result cap
    pub fn with_max_results_per_root(mut self, max: usize) -> Self {
        self.max_results_per_root = max;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.search_program.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "search_program".to_string(),
            }
            .into());
        }

        if self.max_results_per_root == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_results_per_root".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

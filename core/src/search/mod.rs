//! Search invocations
//!
//! One invocation runs the external search tool under one root. Invocations
//! are tagged with the [`RoundId`] of the query that launched them so late
//! completions from a superseded query can be told apart.

pub mod pool;
pub mod ripgrep;

pub use pool::{InvocationHandle, SearchProcessPool};
pub use ripgrep::RipgrepTool;

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

/// Identity of one query round
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RoundId(pub u64);

impl RoundId {
    pub fn next(self) -> Self {
        RoundId(self.0.wrapping_add(1))
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "round-{}", self.0)
    }
}

/// Identity of one invocation within a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvocationId(pub u64);

/// How an invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// Tool exited successfully; newline separated relative paths
    Listed { stdout: String },
    /// Tool could not run or exited with a failure status
    Failed {
        /// Exit status, `None` when the process never started or died by signal
        status: Option<i32>,
        message: String,
    },
    /// The invocation was killed by its owner
    Killed,
}

/// Completion of one invocation, delivered to the controller
#[derive(Debug, Clone)]
pub struct Completion {
    pub round: RoundId,
    pub invocation: InvocationId,
    /// Position of the root in the round's root list
    pub root_index: usize,
    pub root: PathBuf,
    pub outcome: InvocationOutcome,
}

/// External recursive file search tool
///
/// Implementations must be cancel-safe: dropping the returned future has to
/// stop any process it started.
#[async_trait]
pub trait SearchTool: Send + Sync {
    /// Name used in logs and notices
    fn name(&self) -> &str;

    /// List files under `root` whose name matches the glob `pattern`
    async fn search(&self, root: &Path, pattern: &str) -> InvocationOutcome;
}

/// Glob over file names matching any name that contains `query`
pub fn glob_pattern(query: &str) -> String {
    format!("*{}*", query)
}

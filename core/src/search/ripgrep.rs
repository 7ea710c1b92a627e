//! ripgrep-backed search tool

use super::{InvocationOutcome, SearchTool};
use crate::config::PickerConfig;
use crate::error::{Result, SearchError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs `<program> --files -g <pattern>` inside each root
#[derive(Debug, Clone)]
pub struct RipgrepTool {
    program: String,
    extra_args: Vec<String>,
}

impl RipgrepTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn from_config(config: &PickerConfig) -> Self {
        Self {
            program: config.search_program.clone(),
            extra_args: config.search_args.clone(),
        }
    }

    /// Resolve the program on PATH
    pub fn locate(&self) -> Result<PathBuf> {
        which::which(&self.program).map_err(|_| {
            SearchError::ProgramNotFound {
                program: self.program.clone(),
            }
            .into()
        })
    }

    fn command(&self, root: &Path, pattern: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--files")
            .arg("-g")
            .arg(pattern)
            .args(&self.extra_args)
            .current_dir(root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl SearchTool for RipgrepTool {
    fn name(&self) -> &str {
        &self.program
    }

    async fn search(&self, root: &Path, pattern: &str) -> InvocationOutcome {
        debug!("Running {} --files -g {} in {}", self.program, pattern, root.display());

        let output = match self.command(root, pattern).output().await {
            Ok(output) => output,
            Err(e) => {
                let error = SearchError::SpawnFailed {
                    program: self.program.clone(),
                    message: e.to_string(),
                };
                return InvocationOutcome::Failed {
                    status: None,
                    message: error.to_string(),
                };
            }
        };

        if output.status.success() {
            return InvocationOutcome::Listed {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            };
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let message = if stderr.is_empty() {
            format!("{} exited with {}", self.program, output.status)
        } else {
            format!("{} exited with {}: {}", self.program, output.status, stderr)
        };

        InvocationOutcome::Failed {
            status: output.status.code(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_program_is_a_failure() {
        let temp_dir = TempDir::new().unwrap();
        let tool = RipgrepTool::new("quickopen-definitely-not-installed");

        let outcome = tool.search(temp_dir.path(), "*x*").await;
        match outcome {
            InvocationOutcome::Failed { status, message } => {
                assert_eq!(status, None);
                assert!(message.contains("Failed to start quickopen-definitely-not-installed"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_locate_reports_missing_program() {
        let tool = RipgrepTool::new("quickopen-definitely-not-installed");
        let err = tool.locate().unwrap_err();
        assert!(err.to_string().contains("not found on PATH"));
    }

    #[test]
    fn test_from_config_carries_extra_args() {
        let config = PickerConfig::default().with_search_args(vec!["--hidden".to_string()]);
        let tool = RipgrepTool::from_config(&config);
        assert_eq!(tool.name(), "rg");
        assert_eq!(tool.extra_args, vec!["--hidden".to_string()]);
    }
}

//! CLI host implementation
//!
//! Supplies the terminal picker and turns "open document" into either an
//! external command (`open_with`) or the chosen path printed on stdout.

use crate::interactive::picker::TerminalPicker;
use async_trait::async_trait;
use colored::Colorize;
use quickopen_core::error::{HostError, Result};
use quickopen_core::host::DocumentHandle;
use quickopen_core::{EditorHost, PickerWidget, WidgetEvents};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Terminal host for the picker
#[derive(Debug, Clone, Default)]
pub struct CliHost {
    /// Command line the chosen path is appended to, e.g. "code -g"
    open_with: Option<String>,
}

impl CliHost {
    pub fn new(open_with: Option<String>) -> Self {
        Self { open_with }
    }

    async fn run_open_command(&self, command: &str, path: &Path) -> Result<()> {
        let show_failed = |message: String| HostError::ShowFailed {
            path: path.to_path_buf(),
            message,
        };

        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| show_failed("empty open command".to_string()))?;

        debug!("Opening {} with {}", path.display(), command);
        let status = Command::new(program)
            .args(parts)
            .arg(path)
            .status()
            .await
            .map_err(|e| show_failed(format!("failed to run {}: {}", program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(show_failed(format!("{} exited with {}", program, status)).into())
        }
    }
}

#[async_trait]
impl EditorHost for CliHost {
    fn create_picker(&self) -> Result<(Box<dyn PickerWidget>, WidgetEvents)> {
        let (picker, events) = TerminalPicker::new();
        Ok((Box::new(picker), events))
    }

    async fn open_document(&self, path: &Path) -> Result<DocumentHandle> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| HostError::OpenFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if !metadata.is_file() {
            return Err(HostError::OpenFailed {
                path: path.to_path_buf(),
                message: "not a regular file".to_string(),
            }
            .into());
        }

        Ok(DocumentHandle {
            path: path.to_path_buf(),
        })
    }

    async fn show_document(&self, document: DocumentHandle) -> Result<()> {
        match &self.open_with {
            Some(command) => self.run_open_command(command, &document.path).await,
            None => {
                println!("{}", document.path.display());
                Ok(())
            }
        }
    }

    fn show_error(&self, message: &str) {
        eprintln!("{} {}", "error:".red().bold(), message);
    }

    fn show_info(&self, message: &str) {
        eprintln!("{} {}", "info:".green().bold(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.txt");
        std::fs::write(&path, "x").unwrap();

        let document = CliHost::default().open_document(&path).await.unwrap();
        assert_eq!(document.path, path);
    }

    #[tokio::test]
    async fn test_open_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gone.txt");

        let err = CliHost::default().open_document(&path).await.unwrap_err();
        assert!(err.to_string().contains("Cannot open document"));
    }

    #[tokio::test]
    async fn test_open_directory_fails() {
        let temp_dir = TempDir::new().unwrap();

        let err = CliHost::default()
            .open_document(temp_dir.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a regular file"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_open_command_failure_is_reported() {
        let host = CliHost::new(Some("false".to_string()));
        let document = DocumentHandle {
            path: "/tmp/whatever".into(),
        };

        let err = host.show_document(document).await.unwrap_err();
        assert!(err.to_string().contains("false exited with"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_open_command_receives_path() {
        let host = CliHost::new(Some("test -e".to_string()));
        let temp_dir = TempDir::new().unwrap();
        let document = DocumentHandle {
            path: temp_dir.path().to_path_buf(),
        };

        host.show_document(document).await.unwrap();
    }
}

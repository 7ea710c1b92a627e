//! Collaborators provided by the hosting editor
//!
//! The picker core never draws anything or opens documents itself. A host
//! supplies a [`PickerWidget`] plus its event stream, an [`EditorHost`] for
//! documents and notifications, the workspace roots, and a way to create
//! files.

use crate::candidate::Candidate;
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::warn;

/// Events emitted by a picker widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// The input text changed
    ValueChanged(String),
    /// The user accepted one or more items
    SelectionChanged(Vec<Candidate>),
    /// The widget was dismissed
    Hidden,
}

/// Receiving end of a widget's event stream
pub type WidgetEvents = mpsc::UnboundedReceiver<WidgetEvent>;

/// A quick-pick style list widget
pub trait PickerWidget: Send {
    fn set_placeholder(&mut self, text: &str);

    fn items(&self) -> Vec<Candidate>;

    fn set_items(&mut self, items: Vec<Candidate>);

    fn is_busy(&self) -> bool;

    fn set_busy(&mut self, busy: bool);

    fn show(&mut self);

    fn hide(&mut self);

    /// Release everything the widget holds; called exactly once
    fn dispose(&mut self);
}

/// Opaque handle to a document opened by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    pub path: PathBuf,
}

/// Document and notification services of the host editor
#[async_trait]
pub trait EditorHost: Send + Sync {
    /// Create a fresh picker widget and subscribe to its events
    fn create_picker(&self) -> Result<(Box<dyn PickerWidget>, WidgetEvents)>;

    async fn open_document(&self, path: &Path) -> Result<DocumentHandle>;

    async fn show_document(&self, document: DocumentHandle) -> Result<()>;

    fn show_error(&self, message: &str);

    fn show_info(&self, message: &str);
}

/// Source of the directories a query searches
pub trait WorkspaceRoots: Send + Sync {
    fn roots(&self) -> Vec<PathBuf>;
}

/// A fixed list of roots
#[derive(Debug, Clone, Default)]
pub struct StaticRoots(pub Vec<PathBuf>);

impl WorkspaceRoots for StaticRoots {
    fn roots(&self) -> Vec<PathBuf> {
        self.0.clone()
    }
}

/// The provider's roots, or the current directory when it has none
pub fn resolve_roots(provider: &dyn WorkspaceRoots) -> Vec<PathBuf> {
    let roots = provider.roots();
    if !roots.is_empty() {
        return roots;
    }

    match std::env::current_dir() {
        Ok(cwd) => vec![cwd],
        Err(e) => {
            warn!("No workspace roots and no current directory: {}", e);
            Vec::new()
        }
    }
}

/// Creates empty files for the "create new file" entry
#[async_trait]
pub trait FileCreator: Send + Sync {
    async fn create(&self, path: &Path) -> std::io::Result<()>;
}

/// `touch`: create the file if missing, keep existing contents
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchFileCreator;

#[async_trait]
impl FileCreator for TouchFileCreator {
    async fn create(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map(|_| ())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_roots_fall_back_to_cwd() {
        let roots = resolve_roots(&StaticRoots::default());
        assert_eq!(roots, vec![std::env::current_dir().unwrap()]);

        let explicit = StaticRoots(vec![PathBuf::from("/ws")]);
        assert_eq!(resolve_roots(&explicit), vec![PathBuf::from("/ws")]);
    }

    #[tokio::test]
    async fn test_touch_creates_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("new.txt");

        TouchFileCreator.create(&path).await.unwrap();
        assert!(path.is_file());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn test_touch_keeps_existing_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.md");
        std::fs::write(&path, "keep me").unwrap();

        TouchFileCreator.create(&path).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[tokio::test]
    async fn test_touch_does_not_create_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("file.txt");

        assert!(TouchFileCreator.create(&path).await.is_err());
        assert!(!temp_dir.path().join("missing").exists());
    }
}

//! Picker list entries
//!
//! Every row the picker shows is one [`Candidate`]. Selection handling
//! matches on the variant, so the set is closed on purpose.

use std::path::{Component, Path, PathBuf};

/// Description shown next to a create marker
pub const CREATE_DESCRIPTION: &str = "Create new file at this location";

/// One selectable entry in the picker list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// An existing file found by the search tool
    File(FileCandidate),
    /// A message shown in place of results for a root
    Notice(NoticeCandidate),
    /// Offer to create a file at the queried path
    Create(CreateCandidate),
}

/// A file found under a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    /// Root the search ran under
    pub root: PathBuf,
    /// Absolute path of the file
    pub path: PathBuf,
}

/// A reportable search failure scoped to one root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeCandidate {
    pub root: PathBuf,
    pub message: String,
}

/// A path that does not exist yet and may be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCandidate {
    pub path: PathBuf,
}

impl FileCandidate {
    /// Build a candidate from one line of search tool output
    pub fn from_relative(root: &Path, relative: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            path: root.join(relative),
        }
    }

    /// File name of the match
    pub fn label(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory of the match relative to its root, `.` for top-level files
    pub fn description(&self) -> String {
        let relative = self.path.strip_prefix(&self.root).unwrap_or(&self.path);
        match relative.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.display().to_string(),
            _ => ".".to_string(),
        }
    }
}

impl NoticeCandidate {
    pub fn new(root: &Path, message: impl Into<String>) -> Self {
        Self {
            root: root.to_path_buf(),
            message: message.into(),
        }
    }

    /// Message flattened onto a single line
    pub fn label(&self) -> String {
        self.message
            .replace("\r\n", " ")
            .replace('\n', " ")
            .trim()
            .to_string()
    }
}

impl CreateCandidate {
    /// Target `<root>/<query>`, keeping the query under the root
    pub fn for_query(root: &Path, query: &str) -> Self {
        let relative: PathBuf = Path::new(query)
            .components()
            .filter(|component| !matches!(component, Component::RootDir | Component::Prefix(_)))
            .collect();
        Self {
            path: root.join(relative),
        }
    }

    pub fn label(&self) -> String {
        format!("Create \"{}\"", self.path.display())
    }
}

impl Candidate {
    /// Primary text of the row
    pub fn label(&self) -> String {
        match self {
            Candidate::File(file) => file.label(),
            Candidate::Notice(notice) => notice.label(),
            Candidate::Create(create) => create.label(),
        }
    }

    /// Secondary text shown beside the label
    pub fn description(&self) -> String {
        match self {
            Candidate::File(file) => file.description(),
            Candidate::Notice(_) => String::new(),
            Candidate::Create(_) => CREATE_DESCRIPTION.to_string(),
        }
    }

    /// Optional third line of detail
    pub fn detail(&self) -> Option<String> {
        match self {
            Candidate::File(_) => None,
            Candidate::Notice(notice) => Some(notice.root.display().to_string()),
            Candidate::Create(create) => Some(create.path.display().to_string()),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Candidate::File(_))
    }

    pub fn is_notice(&self) -> bool {
        matches!(self, Candidate::Notice(_))
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Candidate::Create(_))
    }
}

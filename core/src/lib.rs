//! # quickopen Core
//!
//! Core library for quickopen - an incremental file picker.
//!
//! As the user types, every workspace root is searched by an external tool
//! (ripgrep by default), results stream into a selectable list, and the
//! session resolves to an existing file, a newly created one, or nothing.
//! Rendering and document handling belong to the host, see [`host`].

// Core modules
pub mod aggregator;
pub mod candidate;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod quick_open;
pub mod search;

// Re-export commonly used types
pub use candidate::Candidate;
pub use config::PickerConfig;
pub use controller::{PickOutcome, PickerPhase, PickerServices, SelectionController};
pub use host::{EditorHost, PickerWidget, WidgetEvent, WidgetEvents, WorkspaceRoots};
pub use quick_open::{collect_round, quick_open};
pub use search::{RipgrepTool, SearchTool};

/// Current version of the quickopen-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

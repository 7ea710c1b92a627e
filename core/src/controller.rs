//! Selection state machine
//!
//! [`SelectionController`] owns one picker session: the widget, the process
//! pool of the active round and the aggregator. Widget events and invocation
//! completions are handled one at a time from a single `select!` loop, so no
//! state is shared with the invocation tasks beyond the completion channel.

use crate::aggregator::ResultAggregator;
use crate::candidate::Candidate;
use crate::config::PickerConfig;
use crate::host::{
    resolve_roots, EditorHost, FileCreator, PickerWidget, TouchFileCreator, WidgetEvent,
    WidgetEvents, WorkspaceRoots,
};
use crate::search::{Completion, RipgrepTool, SearchProcessPool, SearchTool};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Terminal value of a pick session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// An existing file was chosen
    Picked(PathBuf),
    /// A new file was created and chosen
    Created(PathBuf),
    /// The picker closed without a choice
    NoSelection,
}

impl PickOutcome {
    /// The file location this outcome resolved to, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            PickOutcome::Picked(path) | PickOutcome::Created(path) => Some(path),
            PickOutcome::NoSelection => None,
        }
    }
}

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerPhase {
    /// Visible with empty input
    Idle,
    /// A round has invocations outstanding
    Searching,
    /// The round finished; the list is stable until the next input
    Ready,
    /// A selection is being turned into an outcome
    Resolving,
    /// Outcome produced and resources released
    Closed,
}

/// Everything a session needs from the outside world
#[derive(Clone)]
pub struct PickerServices {
    pub config: PickerConfig,
    pub host: Arc<dyn EditorHost>,
    pub roots: Arc<dyn WorkspaceRoots>,
    pub tool: Arc<dyn SearchTool>,
    pub creator: Arc<dyn FileCreator>,
}

impl PickerServices {
    /// Services backed by the configured search program and `touch`
    pub fn new(
        config: PickerConfig,
        host: Arc<dyn EditorHost>,
        roots: Arc<dyn WorkspaceRoots>,
    ) -> Self {
        let tool = Arc::new(RipgrepTool::from_config(&config));
        Self {
            config,
            host,
            roots,
            tool,
            creator: Arc::new(TouchFileCreator),
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn SearchTool>) -> Self {
        self.tool = tool;
        self
    }

    pub fn with_creator(mut self, creator: Arc<dyn FileCreator>) -> Self {
        self.creator = creator;
        self
    }
}

/// Drives one pick session from first keystroke to outcome
pub struct SelectionController {
    services: PickerServices,
    widget: Box<dyn PickerWidget>,
    pool: SearchProcessPool,
    aggregator: ResultAggregator,
    completions: mpsc::UnboundedReceiver<Completion>,
    phase: PickerPhase,
    released: bool,
}

impl SelectionController {
    pub fn new(widget: Box<dyn PickerWidget>, services: PickerServices) -> Self {
        let (completion_sender, completions) = mpsc::unbounded_channel();
        let pool = SearchProcessPool::new(services.tool.clone(), completion_sender);
        let aggregator = ResultAggregator::new(&services.config);
        Self {
            services,
            widget,
            pool,
            aggregator,
            completions,
            phase: PickerPhase::Idle,
            released: false,
        }
    }

    pub fn phase(&self) -> PickerPhase {
        self.phase
    }

    /// Show the widget and process events until an outcome is produced
    ///
    /// A closed event stream counts as a dismissal.
    pub async fn run(mut self, mut events: WidgetEvents) -> PickOutcome {
        self.widget.set_placeholder(&self.services.config.placeholder);
        self.widget.show();
        debug!("Picker shown");

        let outcome = loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        debug!("Picker event stream closed");
                        break self.dismiss();
                    };
                    if let Some(outcome) = self.handle_event(event).await {
                        break outcome;
                    }
                }
                Some(completion) = self.completions.recv() => {
                    self.handle_completion(completion);
                }
            }
        };

        drop(events);
        self.release();
        outcome
    }

    /// Apply one widget event; returns the outcome when the session ends
    pub async fn handle_event(&mut self, event: WidgetEvent) -> Option<PickOutcome> {
        if matches!(self.phase, PickerPhase::Resolving | PickerPhase::Closed) {
            debug!("Ignoring {:?} while {:?}", event, self.phase);
            return None;
        }

        match event {
            WidgetEvent::ValueChanged(value) => {
                self.on_value_changed(&value);
                None
            }
            WidgetEvent::SelectionChanged(items) => self.on_selection(items).await,
            WidgetEvent::Hidden => Some(self.dismiss()),
        }
    }

    fn on_value_changed(&mut self, value: &str) {
        debug!("Value changed to {:?}", value);
        // The previous round dies before the next one starts
        self.pool.kill_all();

        if value.is_empty() {
            self.aggregator.clear();
            self.widget.set_items(Vec::new());
            self.widget.set_busy(false);
            self.phase = PickerPhase::Idle;
            return;
        }

        let roots = resolve_roots(self.services.roots.as_ref());
        let round = self.aggregator.begin_round(value, &roots);
        self.pool.launch(round, value, &roots);
        self.refresh();
        self.phase = if self.aggregator.is_busy() {
            PickerPhase::Searching
        } else {
            PickerPhase::Ready
        };
    }

    fn handle_completion(&mut self, completion: Completion) {
        self.pool.reap(completion.invocation);
        if matches!(self.phase, PickerPhase::Resolving | PickerPhase::Closed) {
            return;
        }
        if !self.aggregator.apply(completion) {
            return;
        }

        self.refresh();
        if self.phase == PickerPhase::Searching && !self.aggregator.is_busy() {
            debug!("{} complete", self.aggregator.current_round());
            self.phase = PickerPhase::Ready;
        }
    }

    fn refresh(&mut self) {
        let candidates = self.aggregator.candidates();
        if candidates.iter().any(Candidate::is_create) {
            debug!(
                "No files found for {:?}, offering to create it",
                self.aggregator.query()
            );
        }
        self.widget.set_items(candidates);
        self.widget.set_busy(self.aggregator.is_busy());
    }

    async fn on_selection(&mut self, items: Vec<Candidate>) -> Option<PickOutcome> {
        match items.into_iter().next()? {
            Candidate::File(file) => {
                debug!("File selected: {}", file.path.display());
                self.phase = PickerPhase::Resolving;
                self.pool.kill_all();
                self.widget.hide();
                Some(PickOutcome::Picked(file.path))
            }
            Candidate::Create(create) => Some(self.create_file(create.path).await),
            Candidate::Notice(notice) => {
                debug!("Notice for {} selected; nothing to do", notice.root.display());
                None
            }
        }
    }

    async fn create_file(&mut self, path: PathBuf) -> PickOutcome {
        self.phase = PickerPhase::Resolving;
        self.pool.kill_all();

        let result = self.services.creator.create(&path).await;
        self.widget.hide();

        match result {
            Ok(()) => {
                info!("File created: {}", path.display());
                self.services
                    .host
                    .show_info(&format!("File created: {}", path.display()));
                PickOutcome::Created(path)
            }
            Err(e) => {
                warn!("Failed to create {}: {}", path.display(), e);
                self.services
                    .host
                    .show_error(&format!("Failed to create file: {}", e));
                PickOutcome::NoSelection
            }
        }
    }

    fn dismiss(&mut self) -> PickOutcome {
        debug!("Picker dismissed");
        self.phase = PickerPhase::Resolving;
        self.pool.kill_all();
        PickOutcome::NoSelection
    }

    /// Kill every invocation and dispose the widget, once
    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.pool.kill_all();
        self.aggregator.clear();
        self.widget.dispose();
        self.phase = PickerPhase::Closed;
        debug!("Picker disposed");
    }
}

impl Drop for SelectionController {
    fn drop(&mut self) {
        self.release();
    }
}

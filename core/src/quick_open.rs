//! Entry points
//!
//! [`quick_open`] runs one interactive pick session and hands the chosen file
//! to the host. [`collect_round`] runs a single query without any widget.

use crate::aggregator::ResultAggregator;
use crate::candidate::Candidate;
use crate::controller::{PickOutcome, PickerServices, SelectionController};
use crate::error::Result;
use crate::host::resolve_roots;
use crate::search::SearchProcessPool;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Let the user pick or create a file, then open it in the host
///
/// Failing to open the chosen file is reported through the host and does not
/// change the returned outcome.
pub async fn quick_open(services: PickerServices) -> Result<PickOutcome> {
    debug!("quick open: start");
    let (widget, events) = services.host.create_picker()?;
    let outcome = SelectionController::new(widget, services.clone())
        .run(events)
        .await;

    if let Some(path) = outcome.path() {
        debug!("quick open: picked {}", path.display());
        match open_and_show(&services, path).await {
            Ok(()) => debug!("quick open: document shown"),
            Err(e) => {
                warn!("Could not open {}: {}", path.display(), e);
                services.host.show_error(&e.to_string());
            }
        }
    }

    debug!("quick open: end");
    Ok(outcome)
}

async fn open_and_show(services: &PickerServices, path: &Path) -> Result<()> {
    let document = services.host.open_document(path).await?;
    services.host.show_document(document).await
}

/// Run one query over every root and return the settled candidate list
///
/// Waits for all invocations of the round; a hung search tool keeps this
/// pending, same as the busy indicator of the interactive picker.
pub async fn collect_round(services: &PickerServices, query: &str) -> Vec<Candidate> {
    let (completion_sender, mut completions) = mpsc::unbounded_channel();
    let mut pool = SearchProcessPool::new(services.tool.clone(), completion_sender);
    let mut aggregator = ResultAggregator::new(&services.config);

    let roots = resolve_roots(services.roots.as_ref());
    let round = aggregator.begin_round(query, &roots);
    if !query.is_empty() {
        pool.launch(round, query, &roots);
    }

    while aggregator.is_busy() {
        let Some(completion) = completions.recv().await else {
            break;
        };
        pool.reap(completion.invocation);
        aggregator.apply(completion);
    }

    aggregator.candidates()
}

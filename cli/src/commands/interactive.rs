//! Interactive pick command

use crate::config::ResolvedCliConfig;
use crate::output::CliHost;
use anyhow::Result;
use quickopen_core::host::StaticRoots;
use quickopen_core::{quick_open, PickOutcome, PickerServices};
use std::sync::Arc;
use tracing::debug;

/// Run one pick session in the terminal
pub async fn interactive_command(config: ResolvedCliConfig) -> Result<PickOutcome> {
    debug!("Search program: {}", config.picker.search_program);
    for root in &config.roots {
        debug!("Root: {}", root.display());
    }

    let host = Arc::new(CliHost::new(config.open_with.clone()));
    let services = PickerServices::new(config.picker, host, Arc::new(StaticRoots(config.roots)));

    let outcome = quick_open(services).await?;
    debug!("Pick outcome: {:?}", outcome);
    Ok(outcome)
}

//! Headless search command

use crate::config::ResolvedCliConfig;
use crate::output::CliHost;
use anyhow::Result;
use colored::Colorize;
use quickopen_core::host::StaticRoots;
use quickopen_core::{collect_round, Candidate, PickerServices};
use std::sync::Arc;

/// Run one query and print the settled list
///
/// Files and create targets go to stdout, one per line; notices go to stderr.
pub async fn search_command(config: ResolvedCliConfig, query: String) -> Result<()> {
    let host = Arc::new(CliHost::new(config.open_with.clone()));
    let services = PickerServices::new(config.picker, host, Arc::new(StaticRoots(config.roots)));

    for candidate in collect_round(&services, &query).await {
        match candidate {
            Candidate::File(file) => println!("{}", file.path.display()),
            Candidate::Create(create) => println!("create: {}", create.path.display()),
            Candidate::Notice(notice) => eprintln!(
                "{} {}: {}",
                "notice:".yellow().bold(),
                notice.root.display(),
                notice.label()
            ),
        }
    }

    Ok(())
}

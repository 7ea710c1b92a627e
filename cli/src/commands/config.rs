//! Config command: show the resolved configuration

use crate::config::ResolvedCliConfig;
use anyhow::Result;
use colored::Colorize;
use quickopen_core::RipgrepTool;

/// Print the resolved configuration and where the search program lives
pub async fn config_command(config: ResolvedCliConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&config)?);

    match RipgrepTool::from_config(&config.picker).locate() {
        Ok(path) => eprintln!("{} {}", "search program:".green().bold(), path.display()),
        Err(e) => eprintln!("{} {}", "warning:".yellow().bold(), e),
    }

    Ok(())
}

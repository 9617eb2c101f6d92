//! Recently viewed repositories.

use clap::{Args, Subcommand};
use colored::Colorize;
use tracing::instrument;

use super::AppContext;
use crate::errors::Error;

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: Option<HistoryCommands>,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List recently viewed repositories (default)
    List,

    /// Forget one repository
    Remove {
        /// Entry to remove, as listed
        repository: String,
    },

    /// Forget all repositories
    Clear,
}

#[instrument(skip(ctx))]
pub async fn execute(ctx: &AppContext, args: &HistoryArgs) -> Result<(), Error> {
    let history = ctx.history();
    match args.command.as_ref().unwrap_or(&HistoryCommands::List) {
        HistoryCommands::List => print!("{}", render_history(&history.entries())),
        HistoryCommands::Remove { repository } => {
            let remaining = history.remove(repository)?;
            println!("Removed {}", repository.bold());
            print!("{}", render_history(&remaining));
        }
        HistoryCommands::Clear => {
            history.clear()?;
            println!("History cleared");
        }
    }
    Ok(())
}

/// Numbered list, most recent first.
pub fn render_history(entries: &[String]) -> String {
    if entries.is_empty() {
        return format!("{}\n", "No recent repositories".dimmed());
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{:>2}. {}\n", i + 1, entry))
        .collect()
}

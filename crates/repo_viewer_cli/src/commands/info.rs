//! Repository overview: metadata, README and license.

use clap::Args;
use colored::Colorize;
use github_client::{RepositorySummary, DEFAULT_BRANCH};
use repo_viewer_core::format_file_size;
use tracing::{instrument, warn};

use super::AppContext;
use crate::errors::Error;

#[cfg(test)]
#[path = "info_tests.rs"]
mod tests;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Repository as `owner/repo` or a GitHub URL
    pub repository: String,

    /// Print the README
    #[arg(long)]
    pub readme: bool,

    /// Print the license text
    #[arg(long)]
    pub license: bool,

    /// Show the latest commit message touching this path
    #[arg(long, value_name = "PATH")]
    pub commit: Option<String>,
}

#[instrument(skip(ctx))]
pub async fn execute(ctx: &AppContext, args: &InfoArgs) -> Result<(), Error> {
    let repo = ctx.open_repository(&args.repository)?;
    let summary = ctx.client.get_repository(&repo.owner, &repo.repo).await?;
    print!("{}", render_summary(&summary));

    if let Some(path) = &args.commit {
        match ctx
            .client
            .latest_commit_message(&repo.owner, &repo.repo, path)
            .await?
        {
            Some(message) => println!("{}: {}", "Latest commit".bold(), first_line(&message)),
            None => println!("{}: {}", "Latest commit".bold(), "(none)".dimmed()),
        }
    }

    if args.readme {
        let readmes = match ctx.client.list_readmes(&repo.owner, &repo.repo).await {
            Ok(readmes) => readmes,
            Err(e) => {
                warn!(error = %e, "Failed to list README files; trying the usual names");
                Vec::new()
            }
        };
        let preferred = readmes
            .first()
            .map(|r| r.path.as_str())
            .unwrap_or("README.md");
        let branch = if summary.default_branch.is_empty() {
            DEFAULT_BRANCH
        } else {
            summary.default_branch.as_str()
        };

        match ctx
            .client
            .get_readme(&repo.owner, &repo.repo, branch, preferred)
            .await
        {
            Ok((path, text)) => {
                if readmes.len() > 1 {
                    let others: Vec<&str> = readmes.iter().map(|r| r.name.as_str()).collect();
                    println!("{}: {}", "README files".bold(), others.join(", "));
                }
                println!("\n{}\n", path.bold().bright_cyan());
                println!("{}", text);
            }
            Err(github_client::Error::NotFound) => {
                println!("\n{}", "No README found".dimmed());
            }
            Err(e) => return Err(e.into()),
        }
    }

    if args.license {
        match ctx.client.get_license_text(&repo.owner, &repo.repo).await {
            Ok(text) => {
                println!("\n{}\n", "License".bold().bright_cyan());
                println!("{}", text);
            }
            Err(github_client::Error::NotFound) => {
                println!("\n{}", "No license detected".dimmed());
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Formats the repository overview block.
pub fn render_summary(summary: &RepositorySummary) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", summary.full_name.bold().bright_cyan()));
    if !summary.description.is_empty() {
        output.push_str(&format!("{}\n", summary.description));
    }
    output.push('\n');

    output.push_str(&format!(
        "{}: {}   {}: {}\n",
        "Stars".bold(),
        summary.stars,
        "Forks".bold(),
        summary.forks
    ));
    output.push_str(&format!(
        "{}: {}\n",
        "Default branch".bold(),
        summary.default_branch.green()
    ));
    if !summary.homepage.is_empty() {
        output.push_str(&format!("{}: {}\n", "Homepage".bold(), summary.homepage));
    }
    match &summary.license {
        Some(license) => output.push_str(&format!("{}: {}\n", "License".bold(), license.name)),
        None => output.push_str(&format!("{}: {}\n", "License".bold(), "(none)".dimmed())),
    }
    output.push_str(&format!("{}: {}\n", "Clone (HTTPS)".bold(), summary.clone_url));
    output.push_str(&format!("{}: {}\n", "Clone (SSH)".bold(), summary.ssh_url));
    if !summary.created_at.is_empty() {
        output.push_str(&format!(
            "{}: {}   {}: {}\n",
            "Created".bold(),
            short_date(&summary.created_at),
            "Updated".bold(),
            short_date(&summary.updated_at)
        ));
    }
    output
}

/// The date part of an RFC 3339 timestamp, or the input when it is not one.
pub fn short_date(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}

/// Formats a byte count for display next to a file.
pub fn size_label(bytes: u64) -> String {
    format!("({})", format_file_size(bytes))
}

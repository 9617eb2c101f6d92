//! Cached release list.

use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use github_client::{build_source_archive_url, ArchiveFormat, Release};
use repo_viewer_core::{format_file_size, ReleaseCache, ReleaseStatus, SystemClock};
use tracing::{debug, instrument};

use super::{info::short_date, AppContext};
use crate::errors::Error;

#[cfg(test)]
#[path = "releases_tests.rs"]
mod tests;

#[derive(Args, Debug)]
pub struct ReleasesArgs {
    /// Repository as `owner/repo` or a GitHub URL
    pub repository: String,

    /// Ignore cached releases and fetch again
    #[arg(long)]
    pub refresh: bool,

    /// Source archive format to link: `zip` or `tar.gz`
    #[arg(long, default_value = "zip")]
    pub format: ArchiveFormat,

    /// Maximum number of releases to show
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,
}

#[instrument(skip(ctx))]
pub async fn execute(ctx: &AppContext, args: &ReleasesArgs) -> Result<(), Error> {
    let repo = ctx.open_repository(&args.repository)?;
    let cache = ReleaseCache::with_ttl(
        ctx.gateway(),
        ctx.store.clone(),
        Arc::new(SystemClock),
        ctx.config.release_ttl(),
    );

    let mut snapshot = if args.refresh {
        cache.refresh(&repo.owner, &repo.repo)
    } else {
        cache.get(&repo.owner, &repo.repo)
    };
    if snapshot.status == ReleaseStatus::Loading {
        println!("{}", "Loading releases...".dimmed());
        snapshot = cache.wait(&repo.owner, &repo.repo).await;
    }

    if snapshot.status == ReleaseStatus::Error {
        return Err(Error::Releases(snapshot.error.unwrap_or_default()));
    }

    print!(
        "{}",
        render_releases(&repo.owner, &repo.repo, &snapshot.releases, args.format, args.limit)
    );

    // Let a background refresh finish so the next run sees its result.
    if snapshot.refreshing {
        let latest = cache.settled(&repo.owner, &repo.repo).await;
        if latest.releases != snapshot.releases {
            debug!(count = latest.releases.len(), "Background refresh found changes");
            println!("{}", "Newer release data was cached for the next run.".dimmed());
        }
    }
    Ok(())
}

/// Formats up to `limit` releases with their source archive links and assets.
pub fn render_releases(
    owner: &str,
    repo: &str,
    releases: &[Release],
    format: ArchiveFormat,
    limit: usize,
) -> String {
    if releases.is_empty() {
        return format!("{}\n", "No releases published".dimmed());
    }

    let mut output = String::new();
    for release in releases.iter().take(limit) {
        let mut title = format!("{}", release.tag_name.bold().bright_cyan());
        if release.name != release.tag_name {
            title.push_str(&format!("  {}", release.name));
        }
        if release.prerelease {
            title.push_str(&format!(" {}", "[pre-release]".yellow()));
        }
        if release.draft {
            title.push_str(&format!(" {}", "[draft]".dimmed()));
        }
        output.push_str(&format!("{}\n", title));

        if !release.published_at.is_empty() {
            output.push_str(&format!("  Published: {}\n", short_date(&release.published_at)));
        }
        output.push_str(&format!(
            "  Source: {}\n",
            build_source_archive_url(owner, repo, &release.tag_name, format)
        ));
        for asset in &release.assets {
            output.push_str(&format!(
                "  - {} ({})\n    {}\n",
                asset.name,
                format_file_size(asset.size),
                asset.browser_download_url
            ));
        }
        output.push('\n');
    }

    if releases.len() > limit {
        output.push_str(&format!(
            "{}\n",
            format!("... and {} more", releases.len() - limit).dimmed()
        ));
    }
    output
}

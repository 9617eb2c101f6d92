//! Selective and whole-repository downloads.

use std::{path::PathBuf, sync::Arc};

use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use repo_viewer_core::{
    format_file_size, DirectoryCache, DirectorySink, DownloadJob, DownloadReport, Downloader,
    JobPhase, ProgressSink, RepositoryDownload, SelectionSet, SystemClock,
};
use tracing::{info, instrument};

use super::{
    tree::{load_ancestors, normalize_path},
    AppContext,
};
use crate::errors::Error;

#[cfg(test)]
#[path = "download_tests.rs"]
mod tests;

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Repository as `owner/repo` or a GitHub URL
    pub repository: String,

    /// Files or directories to include. Downloads the whole repository when
    /// none are given.
    pub paths: Vec<String>,

    /// Directory the archive is written to
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[instrument(skip(ctx))]
pub async fn execute(ctx: &AppContext, args: &DownloadArgs) -> Result<(), Error> {
    let repo = ctx.open_repository(&args.repository)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| ctx.config.download.output_dir.clone());

    let cache = Arc::new(DirectoryCache::new(repo, ctx.gateway()));
    let downloader = Downloader::new(
        ctx.gateway(),
        cache.clone(),
        Arc::new(DirectorySink::new(output)),
        Arc::new(SystemClock),
        ctx.config.download_config(),
    );

    if args.paths.is_empty() {
        println!("Downloading {} ...", cache.repository().to_string().bold());
        let result = downloader.download_repository().await?;
        print!("{}", render_repository_download(&result));
        return Ok(());
    }

    cache.load_root().await?;
    let selection = select_paths(&cache, &args.paths).await?;
    info!(selected = selection.len(), "Selection built");

    let bar = BarProgress::new();
    let result = downloader
        .download_selected(&selection, Arc::new(bar.clone()))
        .await;
    bar.finish();

    print!("{}", render_report(&result?));
    Ok(())
}

/// Builds a selection from path arguments, loading the listings needed to
/// find each one.
pub async fn select_paths(cache: &DirectoryCache, paths: &[String]) -> Result<SelectionSet, Error> {
    let mut selection = SelectionSet::new();
    for path in paths {
        let path = normalize_path(path);
        if path.is_empty() {
            return Err(Error::InvalidArguments(
                "Empty path; omit paths to download the whole repository".to_string(),
            ));
        }
        load_ancestors(cache, &path).await;
        if cache.node(&path).is_none() {
            return Err(Error::InvalidArguments(format!(
                "`{}` was not found in {}",
                path,
                cache.repository()
            )));
        }
        selection.insert(path);
    }
    Ok(selection)
}

/// Progress bar for a running download.
#[derive(Clone)]
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        Self::with_bar(ProgressBar::new(100).with_style(style))
    }

    pub fn with_bar(bar: ProgressBar) -> Self {
        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for BarProgress {
    fn on_progress(&self, job: &DownloadJob) {
        self.bar.set_position(u64::from(job.percent));
        self.bar.set_message(progress_message(job));
    }
}

fn phase_label(phase: JobPhase) -> &'static str {
    match phase {
        JobPhase::Resolving => "Resolving selection",
        JobPhase::Fetching => "Downloading",
        JobPhase::Packaging => "Packaging",
        JobPhase::Saving => "Saving",
        JobPhase::Done => "Done",
        JobPhase::Failed => "Failed",
    }
}

/// One-line status shown next to the bar.
pub fn progress_message(job: &DownloadJob) -> String {
    let label = phase_label(job.phase);
    match job.phase {
        JobPhase::Fetching | JobPhase::Packaging => {
            let mut message = format!("{} {}/{}", label, job.completed_count, job.total_count);
            if let Some(current) = &job.current {
                message.push_str(&format!(" {}", current));
            }
            message
        }
        _ => label.to_string(),
    }
}

/// Summary printed after a selective download.
pub fn render_report(report: &DownloadReport) -> String {
    let mut output = format!(
        "{} {} ({} files, {})\n",
        "Saved".green().bold(),
        report.location.display(),
        report.archived,
        format_file_size(report.archive_size)
    );
    if !report.is_complete() {
        output.push_str(&format!(
            "{} {} item(s) could not be downloaded:\n",
            "Warning:".yellow().bold(),
            report.omitted.len()
        ));
        for path in &report.omitted {
            output.push_str(&format!("  - {}\n", path));
        }
    }
    output
}

/// Summary printed after a whole-repository download.
pub fn render_repository_download(result: &RepositoryDownload) -> String {
    match result {
        RepositoryDownload::Saved { location, size, .. } => format!(
            "{} {} ({})\n",
            "Saved".green().bold(),
            location.display(),
            format_file_size(*size)
        ),
        RepositoryDownload::Fallback { url, reason } => format!(
            "{} {}\nDownload it from: {}\n",
            "Could not download the archive:".yellow().bold(),
            reason,
            url
        ),
    }
}

use std::io::{self, Write};
use std::path::Path;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repo_viewer_cli::commands::{
    self, download::DownloadArgs, history::HistoryArgs, info::InfoArgs, releases::ReleasesArgs,
    tree::TreeArgs, AppContext,
};
use repo_viewer_cli::config::{get_config_path, AppConfig};
use repo_viewer_cli::errors::Error;

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// Repository viewer: browse and download GitHub repositories
#[derive(Parser, Debug)]
#[command(name = "repo-viewer")]
#[command(about = "Browse GitHub repositories and download parts of them", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show repository metadata, README and license
    Info(InfoArgs),

    /// Show the file tree
    Tree(TreeArgs),

    /// Download selected paths, or the whole repository, as a ZIP archive
    Download(DownloadArgs),

    /// List releases with their archive links
    Releases(ReleasesArgs),

    /// Show or edit recently viewed repositories
    History(HistoryArgs),

    /// Show the remaining GitHub API quota
    RateLimit,

    /// Write a configuration file with the default settings
    Init,

    /// Show the CLI version
    Version,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_env("REPO_VIEWER_LOG"))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("Error: {e}");
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    match &cli.command {
        Commands::Init => return init_config(&get_config_path(cli.config.as_deref())),
        Commands::Version => {
            println!(
                "repo-viewer version {}",
                option_env!("REPO_VIEWER_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
            );
            return Ok(());
        }
        _ => {}
    }

    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    let ctx = AppContext::new(config)?;

    match &cli.command {
        Commands::Info(args) => commands::info::execute(&ctx, args).await?,
        Commands::Tree(args) => commands::tree::execute(&ctx, args).await?,
        Commands::Download(args) => commands::download::execute(&ctx, args).await?,
        Commands::Releases(args) => commands::releases::execute(&ctx, args).await?,
        Commands::History(args) => commands::history::execute(&ctx, args).await?,
        Commands::RateLimit => commands::rate_limit::execute(&ctx).await?,
        Commands::Init | Commands::Version => {}
    }

    io::stdout().flush().map_err(|_| Error::StdOutFlushFailed)
}

/// Writes the default configuration, refusing to overwrite an existing file.
fn init_config(path: &Path) -> Result<(), Error> {
    if path.exists() {
        return Err(Error::Config(format!(
            "Configuration file already exists: {:?}",
            path
        )));
    }
    AppConfig::default().save(path)?;
    info!(path = %path.display(), "Configuration initialized");
    println!("Wrote {}", path.display());
    Ok(())
}

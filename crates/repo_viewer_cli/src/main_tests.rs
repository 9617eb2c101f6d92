use super::*;
use clap::CommandFactory;
use github_client::ArchiveFormat;
use repo_viewer_cli::commands::history::HistoryCommands;
use tempfile::TempDir;

#[test]
fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_download_with_paths() {
    let cli = Cli::try_parse_from([
        "repo-viewer",
        "download",
        "octocat/hello",
        "src",
        "README.md",
        "-o",
        "out",
    ])
    .unwrap();

    match cli.command {
        Commands::Download(args) => {
            assert_eq!(args.repository, "octocat/hello");
            assert_eq!(args.paths, vec!["src", "README.md"]);
            assert_eq!(args.output.unwrap(), std::path::PathBuf::from("out"));
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_parse_releases_defaults() {
    let cli = Cli::try_parse_from(["repo-viewer", "releases", "octocat/hello"]).unwrap();

    match cli.command {
        Commands::Releases(args) => {
            assert_eq!(args.format, ArchiveFormat::Zip);
            assert_eq!(args.limit, 10);
            assert!(!args.refresh);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_parse_releases_rejects_unknown_format() {
    let result = Cli::try_parse_from([
        "repo-viewer",
        "releases",
        "octocat/hello",
        "--format",
        "rar",
    ]);

    assert!(result.is_err());
}

#[test]
fn test_global_config_flag_after_subcommand() {
    let cli = Cli::try_parse_from([
        "repo-viewer",
        "tree",
        "octocat/hello",
        "--config",
        "custom.toml",
        "-e",
        "src",
    ])
    .unwrap();

    assert_eq!(cli.config.as_deref(), Some("custom.toml"));
    match cli.command {
        Commands::Tree(args) => assert_eq!(args.expand, vec!["src"]),
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_history_subcommand_is_optional() {
    let cli = Cli::try_parse_from(["repo-viewer", "history"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::History(HistoryArgs { command: None })
    ));

    let cli = Cli::try_parse_from(["repo-viewer", "history", "remove", "octocat/hello"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::History(HistoryArgs {
            command: Some(HistoryCommands::Remove { .. })
        })
    ));
}

#[test]
fn test_init_config_writes_defaults_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("repo-viewer.toml");

    init_config(&path).unwrap();
    let loaded = AppConfig::load(&path).unwrap();
    assert_eq!(loaded, AppConfig::default());

    assert!(matches!(init_config(&path), Err(Error::Config(_))));
}

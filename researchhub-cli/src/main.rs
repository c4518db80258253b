//! ResearchHub CLI: terminal client for the paper-recommendation service.
//!
//! Provides both one-shot search and interactive REPL modes.

mod commands;
mod render;
mod repl;
mod slash;

use clap::Parser;
use researchhub_core::{HttpRecommendationClient, PersistenceBridge, SearchController};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// ResearchHub: find, read, and keep research papers from your terminal
#[derive(Parser, Debug)]
#[command(name = "researchhub", version, about, long_about = None)]
struct Cli {
    /// Topic to search for (starts interactive mode if omitted)
    query: Option<String>,

    /// Number of papers to request
    #[arg(short = 'n', long = "count")]
    count: Option<i64>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List recent searches
    History {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List saved papers
    Saved {
        /// Print as JSON
        #[arg(long)]
        json: bool,
        /// Remove the saved paper with this exact title
        #[arg(long, value_name = "TITLE")]
        remove: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the user configuration file location
    Path,
    /// Write a default configuration file
    Init,
}

fn stderr_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Human-readable layer for stderr (always active)
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(stderr_filter(cli.verbose, cli.quiet)));

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "researchhub", "researchhub")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "researchhub.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    if let Some(command) = cli.command {
        return commands::handle_command(command, cli.config.as_deref()).await;
    }

    let mut config = researchhub_core::load_config(cli.config.as_deref(), None)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    if let Some(count) = cli.count {
        config.search.default_result_count = count;
    }

    let data_dir = config.data_dir();
    tracing::debug!(
        data_dir = %data_dir.display(),
        endpoint = %config.service.endpoint,
        "Starting session"
    );
    let ctl = SearchController::new(
        PersistenceBridge::file(data_dir),
        config.search.default_result_count,
    );
    let client = Arc::new(
        HttpRecommendationClient::new(&config.service)
            .map_err(|e| anyhow::anyhow!("Could not create HTTP client: {}", e))?,
    );

    match cli.query {
        Some(query) => repl::run_single_search(&query, config, ctl, client).await,
        None => repl::run_interactive(config, ctl, client).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_one_shot_query() {
        let cli =
            Cli::try_parse_from(["researchhub", "quantum computing", "-n", "8", "-v"]).unwrap();
        assert_eq!(cli.query.as_deref(), Some("quantum computing"));
        assert_eq!(cli.count, Some(8));
        assert_eq!(cli.verbose, 1);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["researchhub", "saved", "--remove", "Some Title"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Saved { json: false, remove: Some(ref t) }) if t == "Some Title"
        ));

        let cli = Cli::try_parse_from(["researchhub", "config", "path"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config { action: ConfigAction::Path })
        ));
    }

    #[test]
    fn test_stderr_filter_levels() {
        assert_eq!(stderr_filter(0, true), "error");
        assert_eq!(stderr_filter(0, false), "warn");
        assert_eq!(stderr_filter(1, false), "debug");
        assert_eq!(stderr_filter(3, true), "trace");
    }
}

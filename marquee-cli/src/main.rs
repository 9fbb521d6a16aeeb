//! marquee CLI
//!
//! Command-line interface for ingesting movie metadata from TMDB.

mod commands;
mod error;
mod progress;
mod sink;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

#[derive(Parser)]
#[command(name = "marquee")]
#[command(about = "Ingest movie metadata from TMDB", long_about = None)]
struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for `marquee fetch`. Unset flags fall back to the settings file.
#[derive(Args, Clone, Debug)]
pub(crate) struct FetchArgs {
    /// First release year to discover (inclusive)
    #[arg(long)]
    pub from_year: Option<i32>,

    /// Last release year to discover (inclusive, default: current year)
    #[arg(long)]
    pub to_year: Option<i32>,

    /// Number of concurrent workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Maximum discovery pages per year (upstream caps this at 500)
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Where to write the records as JSON
    #[arg(short, long, default_value = "movies.json")]
    pub output: PathBuf,

    /// TMDB API key (overrides env and config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Disable the ingest log file
    #[arg(long)]
    pub no_log: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover and enrich movies, then write them to a JSON file
    Fetch(FetchArgs),

    /// Inspect credentials and settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show resolved credentials (masked) and settings
    Show,
    /// Print the config file paths
    Path,
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    if !verbose {
        builder.format_timestamp(None).format_target(false);
    }
    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let result = match cli.command {
        Commands::Fetch(args) => commands::fetch::run_fetch(args, cli.quiet),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(),
            ConfigAction::Path => commands::config::run_config_path(),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!(
                "{} {}",
                "\u{2718}".if_supports_color(Stderr, |t| t.red()),
                e
            );
            ExitCode::FAILURE
        }
    }
}

//! bughound CLI tool.
//!
//! Usage:
//! ```bash
//! bughound hunt [OPTIONS] [PATH]
//! bughound resume --session <NAME>
//! bughound reports [--target <NAME>]
//! bughound changelog [--rebuild]
//! bughound research [--partner <NAME>]
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Bug hunt automation for JS/TS plugin workspaces
#[derive(Parser)]
#[command(name = "bughound")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new analysis session over discovered plugins
    Hunt {
        /// Workspace root containing the plugins directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Specific plugins to analyze (can be specified multiple times)
        #[arg(short, long)]
        plugins: Vec<String>,

        /// Session name for the checkpoint
        #[arg(short, long, default_value = "bug_hunt_session")]
        session: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Resume a previous analysis session
    Resume {
        /// Session name to resume; omit to list available sessions
        #[arg(short, long)]
        session: Option<String>,

        /// Workspace root containing the plugins directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List saved reports, or print one target's report
    Reports {
        /// Print the report for a specific target
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Fetch new releases and update the changelog
    Changelog {
        /// Repository in owner/repo form (default from config)
        #[arg(long)]
        repo: Option<String>,

        /// Output file path (default from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rebuild the entire changelog instead of appending
        #[arg(long)]
        rebuild: bool,

        /// API token for authenticated requests
        #[arg(long, env = "GITHUB_TOKEN")]
        token: Option<String>,
    },

    /// Enrich partner pages with researched content
    Research {
        /// Directory of partner pages (default from config)
        #[arg(long)]
        partners_dir: Option<PathBuf>,

        /// Only process one partner directory
        #[arg(short, long)]
        partner: Option<String>,
    },
}

/// Output format for analysis results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-diagnostic compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = config_resolver::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Hunt {
            path,
            plugins,
            session,
            format,
        } => commands::hunt::run(&path, &plugins, &session, format, &config),
        Commands::Resume {
            session,
            path,
            format,
        } => commands::resume::run(session.as_deref(), &path, format, &config),
        Commands::Reports { target } => commands::reports::run(target.as_deref(), &config),
        Commands::Changelog {
            repo,
            output,
            rebuild,
            token,
        } => commands::changelog::run(repo.as_deref(), output.as_deref(), rebuild, token, &config),
        Commands::Research {
            partners_dir,
            partner,
        } => commands::research::run(partners_dir.as_deref(), partner.as_deref(), &config),
    }
}

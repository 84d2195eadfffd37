//! Guardian - session health monitor for AI coding assistants
//!
//! Invoked from assistant hooks: each call records an event or answers a
//! query against the nearest `.guardian` directory, prints JSON and exits.

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

use cli::helpers::Context;

#[derive(Parser)]
#[command(name = "guardian")]
#[command(about = "Session health monitoring and suggestion validation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// State directory (defaults to the nearest .guardian)
    #[arg(long, env = "GUARDIAN_DIR", global = true)]
    guardian_dir: Option<PathBuf>,

    /// Knowledge base directory (defaults to the nearest .oracle)
    #[arg(long, env = "ORACLE_DIR", global = true)]
    oracle_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a session event and report triggers
    Event {
        #[command(subcommand)]
        action: cli::event::EventAction,

        /// Session identifier; a new value starts a fresh session
        #[arg(long, env = "GUARDIAN_SESSION_ID", global = true)]
        session: Option<String>,
    },

    /// Show the session health report
    Health,

    /// Evaluate triggers without recording an event
    Triggers,

    /// Start a fresh session
    Reset,

    /// Validate review suggestions
    Validate {
        /// Suggestion text
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        suggestion: Option<String>,

        /// Suggestion category
        #[arg(long, default_value = "general")]
        category: String,

        /// JSON file with an array of {text, category}
        #[arg(long)]
        file: Option<PathBuf>,

        /// Print the user-facing summary instead of JSON
        #[arg(long)]
        text: bool,
    },

    /// Remember a rejected suggestion
    Reject {
        #[arg(long)]
        suggestion: String,

        #[arg(long)]
        reason: String,

        #[arg(long, default_value = "general")]
        category: String,
    },

    /// Record accept/reject feedback for a category
    Feedback {
        #[arg(value_enum)]
        verdict: cli::learn::Verdict,

        #[arg(long, default_value = "general")]
        category: String,
    },

    /// Look up the closest previously rejected suggestion
    CheckRejection {
        text: String,
    },

    /// Adjust thresholds from feedback
    Calibrate {
        /// Report the adjustments without saving them
        #[arg(long)]
        dry_run: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: cli::config::ConfigAction,
    },

    /// Create a .guardian directory with default records
    Init,

    /// Show learning statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::new(format!(
        "guardian={},guardian_core={}",
        level.as_str().to_lowercase(),
        level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // stdout carries JSON
        .init();

    debug!("Guardian v{} starting...", env!("CARGO_PKG_VERSION"));

    let ctx = Context::new(cli.guardian_dir, cli.oracle_dir);

    match cli.command {
        Commands::Event { action, session } => cli::event::handle(&ctx, action, session)?,
        Commands::Health => cli::session::health(&ctx)?,
        Commands::Triggers => cli::session::triggers(&ctx)?,
        Commands::Reset => cli::session::reset(&ctx)?,
        Commands::Validate {
            suggestion,
            category,
            file,
            text,
        } => cli::validate::handle(&ctx, suggestion, category, file, text)?,
        Commands::Reject {
            suggestion,
            reason,
            category,
        } => cli::learn::reject(&ctx, &suggestion, &reason, &category)?,
        Commands::Feedback { verdict, category } => {
            cli::learn::feedback(&ctx, verdict, &category)?
        }
        Commands::CheckRejection { text } => cli::learn::check_rejection(&ctx, &text)?,
        Commands::Calibrate { dry_run } => cli::learn::calibrate(&ctx, dry_run)?,
        Commands::Config { action } => cli::config::handle(&ctx, action)?,
        Commands::Init => cli::init::handle(&ctx)?,
        Commands::Stats => cli::learn::stats(&ctx)?,
    }

    Ok(())
}

//! CLI argument parsing for the course advisor.
//!
//! CLI flags override every other config source.

use clap::{Parser, Subcommand};

/// Course Advisor
///
/// Recommends university courses for a free-text career goal.
#[derive(Parser, Debug)]
#[command(name = "course-advisor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/course-advisor/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Advisor commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP recommendation service
    Start {
        /// Run in foreground (don't daemonize)
        #[arg(short, long)]
        foreground: bool,

        /// Override bind host
        #[arg(long)]
        host: Option<String>,

        /// Override HTTP port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override course data path
        #[arg(long)]
        corpus: Option<String>,

        /// Exit if resources fail to load instead of serving not-ready
        #[arg(long)]
        strict: bool,
    },

    /// Stop the running service
    Stop,

    /// Show service status
    Status,

    /// Recommend courses for a goal without starting the server
    Recommend {
        /// Career goal, e.g. "I want to work on machine learning systems"
        goal: String,

        /// Number of results (default from config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Override course data path
        #[arg(long)]
        corpus: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate course data and print statistics
    Check {
        /// Override course data path
        #[arg(long)]
        corpus: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}

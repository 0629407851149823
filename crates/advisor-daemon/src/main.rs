//! Course Advisor
//!
//! Recommends university courses for a free-text career goal.
//!
//! # Usage
//!
//! ```bash
//! course-advisor start [--foreground] [--host HOST] [--port PORT] [--corpus PATH] [--strict]
//! course-advisor stop
//! course-advisor status
//! course-advisor recommend "I want to learn Artificial Intelligence" [-k 10] [--json]
//! course-advisor check [--corpus PATH]
//! course-advisor config
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/course-advisor/config.toml)
//! 3. Environment variables (ADVISOR_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use advisor_daemon::{
    run_check, run_recommend, show_config, show_status, start_daemon, stop_daemon, Cli, Commands,
    StartOptions,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let log_level = cli.log_level.as_deref();

    match cli.command {
        Commands::Start {
            foreground,
            host,
            port,
            corpus,
            strict,
        } => {
            start_daemon(
                config,
                log_level,
                StartOptions {
                    foreground,
                    host,
                    port,
                    corpus,
                    strict,
                },
            )
            .await?;
        }
        Commands::Stop => {
            stop_daemon()?;
        }
        Commands::Status => {
            show_status()?;
        }
        Commands::Recommend {
            goal,
            top_k,
            corpus,
            json,
        } => {
            tokio::task::block_in_place(|| {
                run_recommend(config, log_level, &goal, top_k, corpus, json)
            })?;
        }
        Commands::Check { corpus } => {
            run_check(config, log_level, corpus)?;
        }
        Commands::Config => {
            show_config(config, log_level)?;
        }
    }

    Ok(())
}

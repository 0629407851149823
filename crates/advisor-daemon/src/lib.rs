//! Course advisor service library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (start, stop, status, recommend, check, config)
//! - `http`: axum router and server

pub mod cli;
pub mod commands;
pub mod http;

pub use cli::{Cli, Commands};
pub use commands::{
    format_recommendation, run_check, run_recommend, show_config, show_status, start_daemon,
    stop_daemon, StartOptions,
};
pub use http::{router, serve};

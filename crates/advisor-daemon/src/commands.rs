//! Command implementations for the course advisor.
//!
//! Handles:
//! - start: Load config, build the engine, serve HTTP
//! - stop: Signal the running service to stop (via PID file)
//! - status: Check if the service is running
//! - recommend / check / config: one-shot local commands

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use advisor_engine::{load_corpus, AdvisorEngine, CorpusStats};
use advisor_types::{Recommendation, Settings};

use crate::http;

/// Overrides accepted by `start`.
#[derive(Debug, Default, Clone)]
pub struct StartOptions {
    pub foreground: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub corpus: Option<String>,
    pub strict: bool,
}

/// Get the PID file path
fn pid_file_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| {
            #[cfg(unix)]
            {
                dirs.runtime_dir()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| dirs.cache_dir().to_path_buf())
            }
            #[cfg(not(unix))]
            {
                dirs.cache_dir().to_path_buf()
            }
        })
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("course-advisor")
        .join("advisor.pid")
}

fn write_pid_file() -> Result<()> {
    let pid_path = pid_file_path();
    if let Some(parent) = pid_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&pid_path, std::process::id().to_string())?;
    info!(path = %pid_path.display(), "Wrote PID file");
    Ok(())
}

fn remove_pid_file() {
    let pid_path = pid_file_path();
    if pid_path.exists() {
        if let Err(e) = fs::remove_file(&pid_path) {
            warn!("Failed to remove PID file: {}", e);
        } else {
            info!("Removed PID file");
        }
    }
}

fn read_pid_file() -> Option<u32> {
    fs::read_to_string(pid_file_path())
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

#[cfg(unix)]
fn is_process_running(pid: u32) -> bool {
    // Signal 0 only checks that the process exists
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

#[cfg(not(unix))]
fn is_process_running(_pid: u32) -> bool {
    true
}

/// Load settings and apply the global log level override.
fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    Ok(settings)
}

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays machine readable.
fn init_tracing(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Start the recommendation service.
///
/// 1. Load configuration (defaults -> file -> env -> CLI)
/// 2. Build the engine and load resources on the blocking pool
/// 3. Serve HTTP until SIGINT/SIGTERM
///
/// A load failure keeps the server up with `/health` reporting the failure,
/// unless `strict` is set.
pub async fn start_daemon(
    config_path: Option<&str>,
    log_level: Option<&str>,
    options: StartOptions,
) -> Result<()> {
    let mut settings = load_settings(config_path, log_level)?;
    if let Some(host) = options.host {
        settings.http_host = host;
    }
    if let Some(port) = options.port {
        settings.http_port = port;
    }
    if let Some(corpus) = options.corpus {
        settings.corpus_path = corpus;
    }
    settings.validate().context("Invalid configuration")?;

    init_tracing(&settings.log_level)?;

    info!("Course advisor starting...");
    info!("Configuration:");
    info!("  Course data: {}", settings.corpus_path);
    info!("  HTTP address: {}", settings.http_addr());
    info!("  Embedding backend: {:?}", settings.embedding.backend);
    info!("  Log level: {}", settings.log_level);

    if !options.foreground {
        warn!("Background mode not implemented, running in foreground");
        warn!("Use a process manager (systemd, launchd) for background operation");
    }

    let addr: SocketAddr = settings
        .http_addr()
        .parse()
        .context("Invalid HTTP address")?;

    let engine = Arc::new(AdvisorEngine::from_settings(&settings));
    let loader = engine.clone();
    let loaded = tokio::task::spawn_blocking(move || loader.load_resources())
        .await
        .context("Resource loading task failed")?;

    if let Err(e) = loaded {
        if options.strict {
            return Err(e).context("Failed to load resources");
        }
        error!(error = %e, "Serving without loaded resources; /recommend will return 503");
    }

    write_pid_file()?;
    let result = http::serve(addr, engine, shutdown_signal()).await;
    remove_pid_file();
    result
}

/// Stop the running service by sending SIGTERM.
pub fn stop_daemon() -> Result<()> {
    let pid = read_pid_file().context("No PID file found - service may not be running")?;

    if !is_process_running(pid) {
        remove_pid_file();
        anyhow::bail!("Service not running (stale PID file removed)");
    }

    #[cfg(unix)]
    {
        unsafe {
            if libc::kill(pid as i32, libc::SIGTERM) != 0 {
                anyhow::bail!("Failed to send SIGTERM to service");
            }
        }
        println!("Sent SIGTERM to course advisor (PID {})", pid);
    }

    #[cfg(not(unix))]
    {
        anyhow::bail!("Stop command not implemented on this platform");
    }

    Ok(())
}

/// Show service status.
pub fn show_status() -> Result<()> {
    let pid_path = pid_file_path();

    match read_pid_file() {
        Some(pid) if is_process_running(pid) => {
            println!("Course advisor is running (PID {})", pid);
            println!("PID file: {:?}", pid_path);
        }
        Some(pid) => {
            println!(
                "Course advisor is NOT running (stale PID {} in {:?})",
                pid, pid_path
            );
        }
        None => {
            println!("Course advisor is NOT running (no PID file)");
        }
    }
    Ok(())
}

/// One line per result: `[score] | CODE       | name`.
pub fn format_recommendation(rec: &Recommendation) -> String {
    format!("[{}] | {:<10} | {}", rec.match_score, rec.code(), rec.name())
}

/// Load the engine locally and print recommendations for `goal`.
pub fn run_recommend(
    config_path: Option<&str>,
    log_level: Option<&str>,
    goal: &str,
    top_k: Option<usize>,
    corpus: Option<String>,
    json: bool,
) -> Result<()> {
    let mut settings = load_settings(config_path, log_level)?;
    if let Some(corpus) = corpus {
        settings.corpus_path = corpus;
    }
    init_tracing(&settings.log_level)?;

    let engine = AdvisorEngine::from_settings(&settings);
    engine
        .load_resources()
        .context("Failed to load resources")?;

    let top_k = top_k.unwrap_or(settings.matcher.default_top_k);
    let results = engine
        .recommend(goal, top_k)
        .context("Recommendation failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for rec in &results {
            println!("{}", format_recommendation(rec));
        }
    }
    Ok(())
}

/// Load the corpus without embedding and print statistics.
pub fn run_check(
    config_path: Option<&str>,
    log_level: Option<&str>,
    corpus: Option<String>,
) -> Result<()> {
    let mut settings = load_settings(config_path, log_level)?;
    if let Some(corpus) = corpus {
        settings.corpus_path = corpus;
    }
    init_tracing(&settings.log_level)?;

    let path = settings.expanded_corpus_path();
    let corpus = load_corpus(&path).context("Course data check failed")?;
    let stats = CorpusStats::from_corpus(&corpus);

    println!("Course data: {}", path.display());
    println!("  Courses:                  {}", stats.courses);
    println!("  Missing description:      {}", stats.missing_description);
    println!("  Without skills:           {}", stats.without_skills);
    println!("  Distinct skills:          {}", stats.distinct_skills);
    println!("  Duplicate skills dropped: {}", stats.duplicate_skills_dropped);
    println!("  Duplicate codes:          {}", stats.duplicate_codes);
    println!("  Levels:");
    for (level, count) in &stats.levels {
        println!("    {:>2}: {}", level, count);
    }
    Ok(())
}

/// Print the effective settings as TOML.
pub fn show_config(config_path: Option<&str>, log_level: Option<&str>) -> Result<()> {
    let settings = load_settings(config_path, log_level)?;
    let rendered = toml::to_string_pretty(&settings).context("Failed to render settings")?;
    print!("{}", rendered);
    Ok(())
}

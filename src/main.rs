//! Rumah Sehat Al-Fatih - back-office console for patients, finances and reports.

mod commands;

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use alfatih_clinic as app;

use app::config::{AppConfig, ConfigLoadResult, LoggingConfig};
use commands::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine config path based on mode
    let config_path = match (&cli.config, cli.dev) {
        (Some(path), _) => path.clone(),
        (None, true) => PathBuf::from("config.toml"),
        (None, false) => AppConfig::default_path(),
    };

    let loaded = AppConfig::try_load(&config_path);
    let logging = match &loaded {
        ConfigLoadResult::Loaded(config) => config.logging.clone(),
        _ => LoggingConfig::default(),
    };
    let _guard = init_logging(&logging);

    tracing::info!("Al-Fatih clinic console starting...");
    tracing::debug!("Config path: {:?}", config_path);

    let config = match loaded {
        ConfigLoadResult::Loaded(config) => config,
        ConfigLoadResult::Missing => {
            tracing::info!("Config missing, using defaults");
            AppConfig::default()
        }
        ConfigLoadResult::Invalid(e) if matches!(cli.command, Command::Init(_)) => {
            tracing::warn!("Config invalid, init will overwrite it: {}", e);
            AppConfig::default()
        }
        ConfigLoadResult::Invalid(e) => {
            bail!("Config file {} is invalid: {e}", config_path.display());
        }
    };
    let config = config.with_overrides(cli.url.clone(), cli.anon_key.clone());

    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(commands::run(cli.command, config, config_path))
}

/// Initialize logging to stderr, plus a daily log file when configured.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &logging.file_prefix);
            let (file, guard) = tracing_appender::non_blocking(appender);
            builder
                .with_ansi(false)
                .with_writer(std::io::stderr.and(file))
                .init();
            Some(guard)
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            None
        }
    }
}

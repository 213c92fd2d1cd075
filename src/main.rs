//! nova - browser interaction recorder
//!
//! Main entry point for the nova CLI.

mod cli;
mod cmd_export;
mod cmd_record;

use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nova_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};

use cli::{Cli, Commands};

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_dir = logging.log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("nova")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer on drop; keep it for the whole run.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console output goes to stderr so stdout stays parseable.
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Load the explicit config file when it exists, otherwise fall back to
/// `~/.nova/config.toml` or defaults.
fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = if path.exists() {
        ConfigLoader::load(path)?
    } else {
        ConfigLoader::load_or_default(None)?
    };
    Ok(config)
}

fn validate_config(config: &Config) -> anyhow::Result<()> {
    let validation = ConfigValidator::validate(config);
    if !validation.is_valid() {
        let errors: Vec<String> = validation.errors.iter().map(|e| e.to_string()).collect();
        bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }
    for warning in &validation.warnings {
        warn!("Config: {}: {}", warning.path, warning.message);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_tracing(&config.logging)?;
    validate_config(&config)?;

    match cli.command {
        Commands::Record {
            url,
            duration,
            output,
        } => cmd_record::run(&config, &url, duration, output).await,
        Commands::Steps { file } => cmd_export::print_steps(&file),
        Commands::Export {
            file,
            project,
            name,
            description,
            tags,
            test_type,
        } => {
            let options = nova_host::SaveOptions {
                name,
                description,
                tags,
                test_type,
                project_id: project,
            };
            cmd_export::print_payload(&file, &options)
        }
    }
}

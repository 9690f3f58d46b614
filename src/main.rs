use std::fs::OpenOptions;
use std::path::PathBuf;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use webrec::cli::{Cli, Commands};
use webrec::error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Dropping the guard flushes the debug log, so it lives until exit.
    let _guard = init_tracing(&cli)?;
    cli.run().await
}

fn init_tracing(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // With a debug log, stderr only carries warnings; the file gets everything.
    let (stderr_filter, file_layer, guard) = match debug_log_path(cli) {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(LevelFilter::DEBUG);
            (EnvFilter::new("warn"), Some(layer), Some(guard))
        }
        None => (env_filter, None, None),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(stderr_filter),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn debug_log_path(cli: &Cli) -> Option<PathBuf> {
    if let Some(path) = &cli.log_file {
        return Some(path.clone());
    }
    match cli.command {
        Commands::Record { .. } => cli
            .load_config()
            .ok()
            .map(|config| config.recorder.debug_log)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from),
        _ => None,
    }
}

mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::path::Path;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // `run` is a long-lived process; its heartbeat lines are info.
    let (floor, log_file) = match &cli.command {
        Command::Run(args) => (1, args.log_file.as_deref()),
        _ => (0, None),
    };
    let log_guard = init_tracing(cli.global.verbose.max(floor), log_file);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        drop(log_guard);
        std::process::exit(code);
    }
}

/// Logs go to stderr so stdout carries only command output. With a log
/// file, a second non-blocking layer writes there; the returned guard
/// flushes it on drop.
fn init_tracing(verbosity: u8, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter());

    let (file, guard) = match log_file.and_then(file_appender) {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(stderr).with(file).init();
    guard
}

fn file_appender(path: &Path) -> Option<tracing_appender::rolling::RollingFileAppender> {
    let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let name = path.file_name()?;
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("cannot create log directory {}: {e}", dir.display());
        return None;
    }
    Some(tracing_appender::rolling::never(dir, name))
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = config::Context::load(&cli.global)?;
    tracing::debug!(
        command = ?cli.command,
        config = %ctx.config_path.display(),
        "dispatching command"
    );
    commands::dispatch(cli.command, &ctx).await
}

use anyhow::Result;
use intake_infrastructure::IntakePaths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber.
///
/// Logs always go to a daily file under `logs/`; `verbose` mirrors them to
/// stderr and lowers the default level. `RUST_LOG` wins over both defaults.
/// The returned guard must live until exit so buffered lines are flushed.
pub fn init(paths: &IntakePaths, verbose: bool) -> Result<WorkerGuard> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let logs_dir = paths.ensure_logs_dir()?;
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "intake.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().with_writer(file_writer).with_ansi(false);
    let stderr_layer = verbose.then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))?;

    tracing::debug!("[Logging] Writing logs to {}", logs_dir.display());
    Ok(guard)
}

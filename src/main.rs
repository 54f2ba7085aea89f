use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use prairie_monitor::config::Config;
use prairie_monitor::monitor::Monitor;

const LOG_FILE: &str = "prairie_monitor.log";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_logging();

    let config = Config::from_env()?;

    if config.criteria.location.is_some()
        && config.criteria.date.is_none()
        && config.criteria.time.is_none()
    {
        warn!(
            "DESIRED_LOCATION is set but neither DESIRED_DATE nor DESIRED_TIME is; \
             the location filter is skipped in this configuration and every slot will match"
        );
    }
    if let Some(date) = &config.criteria.date {
        info!("looking for slots on {date}");
    }
    if let Some(time) = &config.criteria.time {
        info!("looking for slots at {time}");
    }

    let mut monitor = Monitor::new(config);

    tokio::select! {
        _ = monitor.run() => {}
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("received interrupt signal, stopping monitor"),
                Err(e) => error!("failed to listen for interrupt: {e}"),
            }
        }
    }

    monitor.shutdown().await;
    Ok(())
}

/// Console plus persistent file sink. The returned guard must stay alive
/// so buffered log lines are flushed on exit.
fn init_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    guard
}

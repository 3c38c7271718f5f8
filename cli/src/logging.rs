//! Subscriber setup. Logs go to stderr, or to a daily rolling file under
//! `CASTER_LOG_DIR` when that is set.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;

pub const LOG_DIR_ENV: &str = "CASTER_LOG_DIR";

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the program or buffered file output is lost.
pub fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(dir) = std::env::var(LOG_DIR_ENV) {
        let appender = tracing_appender::rolling::daily(dir, "caster.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
            .init();
        return Some(guard);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    None
}

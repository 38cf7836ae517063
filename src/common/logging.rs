use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::config::Config;

/// Environment variable that overrides the log filter
pub const LOG_ENV: &str = "EMUCLEANER_LOG";

/// Install the global subscriber.
///
/// Logs always go to a daily file under `~/.emucleaner/logs`; `verbose` also
/// mirrors them to stderr at debug level. Keep the returned guard alive for
/// the life of the process or buffered file output is lost.
pub fn init(verbose: bool) -> Option<WorkerGuard> {
    let default_directive = if verbose {
        "emucleaner=debug"
    } else {
        "emucleaner=info"
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));

    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    let (file_layer, guard) = match Config::init_dirs() {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(Config::logs_dir(), "emucleaner.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        Err(_) => (None, None),
    };

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    guard
}

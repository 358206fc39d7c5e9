// Logging setup
use tracing::info;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Calling this twice
/// is harmless; the second call is ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    let result = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if result.is_ok() {
        info!(target: "telemetry", format = ?config.format, "Tracing initialized");
    }
}

/// Run `f` under a temporary stderr subscriber.
///
/// Used while loading configuration, before the logging format is known and
/// `init_tracing` can run.
pub fn with_bootstrap_logging<T>(f: impl FnOnce() -> T) -> T {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    with_scoped_writer(env_filter, std::io::stderr, true, f)
}

fn with_scoped_writer<W, T>(
    env_filter: EnvFilter,
    writer: W,
    ansi: bool,
    f: impl FnOnce() -> T,
) -> T
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .finish();
    tracing::subscriber::with_default(subscriber, f)
}

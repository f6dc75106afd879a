use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,twentyone_web=debug";

/// Initialize logging for the application. Honors `RUST_LOG`; defaults to
/// info globally with debug for this crate.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    // a second init (e.g. in tests) keeps the first subscriber
    let _ = tracing::subscriber::set_global_default(subscriber);
}

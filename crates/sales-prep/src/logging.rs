//! Log sink construction.
//!
//! Library code only emits `tracing` events. Where they end up is decided by
//! a [`Dispatch`] the caller hands to [`Preprocessor`](crate::Preprocessor)
//! or wraps around any call with [`with_dispatch`]. The default sink writes
//! level, timestamp and message to stderr at INFO.

use tracing::{Dispatch, Level};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Stderr sink at INFO level.
pub fn default_dispatch() -> Dispatch {
    dispatch_with_level(Level::INFO)
}

/// Stderr sink at the given level.
pub fn dispatch_with_level(level: Level) -> Dispatch {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .finish();
    Dispatch::new(subscriber)
}

/// Sink writing plain (no ANSI) lines to an arbitrary writer.
///
/// Useful for capturing log output in tests.
pub fn dispatch_to_writer<W>(make_writer: W, level: Level) -> Dispatch
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let subscriber = tracing_subscriber::fmt()
        .with_writer(make_writer)
        .with_max_level(level)
        .with_target(false)
        .with_ansi(false)
        .finish();
    Dispatch::new(subscriber)
}

/// Sink that drops every event.
pub fn silent() -> Dispatch {
    Dispatch::none()
}

/// Sink for the CLI: `RUST_LOG` wins over `level`; `quiet` lowers it to WARN.
pub fn cli_dispatch(level: &str, quiet: bool) -> Dispatch {
    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    Dispatch::new(subscriber)
}

/// Run `f` with `dispatch` as the default subscriber for this thread.
pub fn with_dispatch<T>(dispatch: &Dispatch, f: impl FnOnce() -> T) -> T {
    tracing::dispatcher::with_default(dispatch, f)
}

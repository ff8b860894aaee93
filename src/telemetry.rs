//! Process-level tracing setup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "teller=info";

/// Installs the global `tracing` subscriber: `RUST_LOG` filtering and the
/// human-readable fmt layer on stderr.
///
/// Audit lines from [`ConsoleSink`](crate::sink::ConsoleSink) flow through
/// this subscriber on the `teller::access` target.
pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

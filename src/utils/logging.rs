//! Process-wide `tracing` setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter for `nero serve` when `RUST_LOG` is unset.
pub const SERVER_FILTER: &str = "nero=info,tower_http=info";
/// Filter for the interactive client commands, which share the terminal with
/// the conversation.
pub const CLIENT_FILTER: &str = "nero=warn";

/// Installs the fmt subscriber on stderr. `RUST_LOG` wins over
/// `default_filter`. Calling it twice is harmless.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

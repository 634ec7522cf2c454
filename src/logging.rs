//! Logging setup
//!
//! Diagnostics go to stderr through `tracing`; stdout is left to the crew's
//! replies. `RUST_LOG` directives refine the default level.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber
pub fn setup_logging(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // A second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

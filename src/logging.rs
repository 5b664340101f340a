//! Log output for the command-line tool.
//!
//! `RUST_LOG` wins when set. Otherwise the level comes from the number of
//! `-v` flags: none shows warnings, then info, debug, trace.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Level selected by `verbosity` repeated `-v` flags.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn logging_setup(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity).as_str()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

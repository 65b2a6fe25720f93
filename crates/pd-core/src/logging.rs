//! Logging
//!
//! Subscriber setup shared by the command line tools.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber; `RUST_LOG` wins over `level` when set
pub fn init(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

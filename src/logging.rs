//! Tracing subscriber setup shared by both binaries.
//!
//! Logs go to stderr so the stdio transport keeps stdout for protocol
//! messages. `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn init_tracing(log_level: &str, json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }
}

//! Logging setup for the provider process.
//!
//! All logs are written to **stderr**: stdout carries the handshake line the
//! host reads to find the gRPC address.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls log levels (e.g., `info`, `debug`, `doublecloud_provider::api=debug`)
//!
//! # Examples
//!
//! ```bash
//! # Show API requests
//! RUST_LOG=doublecloud_provider::api=debug ./terraform-provider-doublecloud
//!
//! # Show all debug logs
//! RUST_LOG=debug ./terraform-provider-doublecloud
//! ```

use tracing_subscriber::{fmt, prelude::*, registry::Registry, EnvFilter, Layer};

fn stderr_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

// hyper and h2 log every frame of the REST and gRPC connections at debug.
const QUIET_TRANSPORT: &str = "h2=warn,hyper=warn,hyper_util=warn";

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},{}", default_level, QUIET_TRANSPORT)))
}

/// Initialize the default logging subscriber.
///
/// Respects `RUST_LOG`, defaulting to `info` with transport crates at `warn`.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Initialize logging with a custom default level used when `RUST_LOG` is unset.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    Registry::default()
        .with(filter(default_level))
        .with(stderr_layer())
        .init();
}

/// Try to initialize logging, returning false if already initialized.
///
/// Tests call this from every case; only the first one installs the subscriber.
pub fn try_init_logging() -> bool {
    Registry::default()
        .with(filter("info"))
        .with(stderr_layer())
        .try_init()
        .is_ok()
}

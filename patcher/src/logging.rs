//! Diagnostic tracing for the patcher.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: probe and rule diagnostics via `RUST_LOG`,
//!   output to stderr. Not part of the patch report.
//!
//! - **Report (`report`)**: the colored status lines on stdout. Always
//!   printed, unaffected by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber for patcher diagnostics.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=ws_patcher=debug ws-patcher apply --force
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

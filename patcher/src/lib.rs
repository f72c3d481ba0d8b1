//! Postinstall patcher that adds WebSocket frame capture to an installed
//! `playwright-core`.
//!
//! The crate keeps the same split as the rest of the engine:
//!
//! - **[`core`]**: Pure rule logic (markers, replacements, sentinel checks).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Filesystem operations (locating the install, committing
//!   patches, copying the prebuilt viewer, configuration).
//! - **[`targets`]**: The concrete rule sets and paths inside the installation.
//!
//! Orchestration modules ([`apply`], [`status`]) combine them for the CLI and
//! [`report`] renders their results.

pub mod apply;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod report;
pub mod status;
pub mod targets;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

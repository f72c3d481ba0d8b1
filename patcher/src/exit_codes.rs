//! Stable exit codes for `ws-patcher`.
//!
//! Patch failures exit with `OK` unless `--strict` is given, so a failed patch
//! never breaks the surrounding package install.

/// Command succeeded, or a soft failure was reported.
pub const OK: i32 = 0;
/// Invalid arguments or configuration.
pub const INVALID: i32 = 1;
/// `--strict`: the recorder patch failed.
pub const PATCH_FAILED: i32 = 2;
/// `--strict` (or `locate`/`status`): no installation found.
pub const NOT_FOUND: i32 = 3;

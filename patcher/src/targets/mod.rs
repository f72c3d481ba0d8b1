//! Patch targets inside a `playwright-core` installation.

pub mod recorder;
pub mod viewer;

//! Filesystem side of the patch engine.

pub mod bundle;
pub mod config;
pub mod install;
pub mod locate;
pub mod package;
pub mod text_patch;

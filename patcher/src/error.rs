//! Error taxonomy for the patch engine.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while patching a single target.
///
/// "Already patched" and "prebuilt source missing" are normal outcomes and are
/// modelled as values, not as variants here.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The expected text structure of the external file has drifted.
    #[error("could not find {0} marker")]
    MarkerNotFound(String),

    #[error("no asset matching {pattern} in {}", .dir.display())]
    AssetNotFound { dir: PathBuf, pattern: String },

    #[error(
        "{} assets match {pattern} in {}: {}",
        .candidates.len(),
        .dir.display(),
        .candidates.join(", ")
    )]
    AmbiguousAsset {
        dir: PathBuf,
        pattern: String,
        candidates: Vec<String>,
    },

    #[error("invalid pattern for rule {rule}: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl PatchError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

//! Patcher configuration read from `ws-patcher.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "ws-patcher.toml";

/// Patcher configuration (TOML).
///
/// Every field is optional; a missing file yields the defaults that match the
/// layouts npm, pnpm, yarn and bun produce for `@playwright/test`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PatcherConfig {
    /// Package whose files get patched.
    pub package: String,

    /// Test runner that may bundle its own copy of `package`.
    pub test_runner_package: String,

    /// Hoisted dependency cache, relative to the working directory.
    pub hoisted_cache_dir: PathBuf,

    /// How many parent directories to probe for workspace layouts.
    pub parent_levels: usize,

    /// Prebuilt viewer to install instead of patching the bundle.
    pub prebuilt_viewer_dir: Option<PathBuf>,

    /// Shown when the recorder patch fails.
    pub tested_with: String,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            package: "playwright-core".to_string(),
            test_runner_package: "@playwright/test".to_string(),
            hoisted_cache_dir: PathBuf::from("node_modules").join(".bun"),
            parent_levels: 2,
            prebuilt_viewer_dir: None,
            tested_with: "@playwright/test ^1.40.0".to_string(),
        }
    }
}

impl PatcherConfig {
    pub fn validate(&self) -> Result<()> {
        if self.package.trim().is_empty() {
            return Err(anyhow!("package must not be empty"));
        }
        if self.test_runner_package.trim().is_empty() {
            return Err(anyhow!("test_runner_package must not be empty"));
        }
        if self.hoisted_cache_dir.is_absolute() {
            return Err(anyhow!(
                "hoisted_cache_dir must be relative (got {})",
                self.hoisted_cache_dir.display()
            ));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `PatcherConfig::default()`.
pub fn load_config(path: &Path) -> Result<PatcherConfig> {
    if !path.exists() {
        let cfg = PatcherConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PatcherConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

//! Test-only helpers for building fake `playwright-core` installations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::targets::{recorder, viewer};

/// Compiled recorder module trimmed to the lines the patch anchors on.
pub const TRACING_FIXTURE: &str = include_str!("../tests/fixtures/tracing.js");

/// Minified viewer settings bundle with the filter list and predicate table.
pub const BUNDLE_FIXTURE: &str = include_str!("../tests/fixtures/defaultSettingsView.js");

pub const FIXTURE_VERSION: &str = "1.49.1";
pub const BUNDLE_FILE_NAME: &str = "defaultSettingsView-Dk3q9.js";

/// A project directory with `node_modules/playwright-core` inside a tempdir.
pub struct FakeInstall {
    temp: TempDir,
}

impl FakeInstall {
    /// Project with a direct install containing `package.json` and the
    /// recorder fixture. No viewer assets.
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        let install = Self { temp };
        let root = install.root();
        write(
            &root.join("package.json"),
            &format!(r#"{{"name":"playwright-core","version":"{FIXTURE_VERSION}"}}"#),
        )?;
        write(&recorder::tracing_path(&root), TRACING_FIXTURE)?;
        Ok(install)
    }

    /// Add the viewer bundle under `lib/vite/traceViewer/assets`.
    pub fn with_bundle(self, contents: &str) -> Result<Self> {
        write(&self.bundle_path(), contents)?;
        Ok(self)
    }

    /// Add a prebuilt viewer under `<cwd>/dist/traceViewer`.
    pub fn with_prebuilt_viewer(self) -> Result<Self> {
        let dir = self.prebuilt_viewer_dir();
        write(&dir.join("index.html"), "<html>ws viewer</html>")?;
        write(&dir.join("assets/wsPanel-1.js"), "export const ws=1;")?;
        Ok(self)
    }

    /// Working directory of the fake project.
    pub fn cwd(&self) -> PathBuf {
        self.temp.path().to_path_buf()
    }

    /// Installation root.
    pub fn root(&self) -> PathBuf {
        self.temp.path().join("node_modules").join("playwright-core")
    }

    pub fn tracing_path(&self) -> PathBuf {
        recorder::tracing_path(&self.root())
    }

    pub fn bundle_path(&self) -> PathBuf {
        viewer::assets_dir(&self.root()).join(BUNDLE_FILE_NAME)
    }

    pub fn prebuilt_viewer_dir(&self) -> PathBuf {
        self.temp.path().join("dist").join("traceViewer")
    }
}

fn write(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

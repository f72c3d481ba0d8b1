//! Orchestration for `ws-patcher apply`.
//!
//! Locate the installation, patch the tracing recorder, then install the
//! prebuilt viewer or fall back to patching the minified viewer bundle. Every
//! component failure is folded into a [`PatchResult`]; nothing here returns an
//! error to the caller.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::types::{InvocationMode, PatchResult};
use crate::io::bundle::patch_bundle;
use crate::io::config::PatcherConfig;
use crate::io::install::install_directory;
use crate::io::locate::{Installation, Locator};
use crate::io::package::read_version;
use crate::io::text_patch::patch_file;
use crate::targets::{recorder, viewer};

/// Inputs resolved once at the process boundary.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub cwd: PathBuf,
    pub config: PatcherConfig,
    pub mode: InvocationMode,
    /// Prebuilt viewer to copy over the installed one, if it exists.
    pub prebuilt_viewer_dir: PathBuf,
    /// Entries of `NODE_PATH`.
    pub node_path: Vec<PathBuf>,
}

/// Overall classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Manual invocation without override.
    Skipped,
    /// No installation located.
    NotFound,
    /// Recorder patch applied or already present.
    Patched,
    /// Recorder patch failed.
    Failed,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: InvocationMode,
    pub installation: Option<Installation>,
    pub version: Option<String>,
    pub recorder: Option<PatchResult>,
    pub viewer: Option<PatchResult>,
    pub tested_with: String,
}

impl RunReport {
    pub fn status(&self) -> RunStatus {
        if !self.mode.should_patch() {
            return RunStatus::Skipped;
        }
        if self.installation.is_none() {
            return RunStatus::NotFound;
        }
        match &self.recorder {
            Some(result) if result.is_success() => RunStatus::Patched,
            _ => RunStatus::Failed,
        }
    }

    /// Viewer status never affects [`RunReport::status`].
    pub fn viewer_ok(&self) -> bool {
        self.viewer.as_ref().is_some_and(PatchResult::is_success)
    }
}

/// Run the full patch sequence.
pub fn run(options: &RunOptions) -> RunReport {
    let mut report = RunReport {
        mode: options.mode,
        installation: None,
        version: None,
        recorder: None,
        viewer: None,
        tested_with: options.config.tested_with.clone(),
    };
    if !options.mode.should_patch() {
        debug!("manual invocation without --force, skipping");
        return report;
    }

    let locator =
        Locator::new(&options.cwd, &options.config).with_node_path(options.node_path.clone());
    let Some(installation) = locator.locate() else {
        warn!(
            cwd = %options.cwd.display(),
            package = %options.config.package,
            "installation not found"
        );
        return report;
    };
    debug!(
        root = %installation.root.display(),
        layout = ?installation.layout,
        "located installation"
    );

    report.version = match read_version(&installation.root) {
        Ok(version) => version,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "could not read installed version");
            None
        }
    };
    report.recorder = Some(patch_recorder(&installation));
    report.viewer = Some(patch_viewer(&installation, &options.prebuilt_viewer_dir));
    report.installation = Some(installation);
    report
}

/// Inject the WebSocket hooks into the tracing recorder.
pub fn patch_recorder(installation: &Installation) -> PatchResult {
    let path = recorder::tracing_path(&installation.root);
    let outcome = recorder::rule_set().and_then(|rules| patch_file(&path, &rules));
    match outcome {
        Ok(outcome) => PatchResult::from_outcome(recorder::TARGET, &outcome),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "recorder patch failed");
            PatchResult::failed(recorder::TARGET, err.to_string())
        }
    }
}

/// Copy the prebuilt viewer, or patch the installed bundle when no prebuilt
/// viewer is available.
pub fn patch_viewer(installation: &Installation, prebuilt_dir: &Path) -> PatchResult {
    let target = viewer::viewer_dir(&installation.root);
    match install_directory(prebuilt_dir, &target) {
        Ok(true) => {
            return PatchResult {
                target: viewer::INSTALL_TARGET.to_string(),
                applied: true,
                already_patched: false,
                rules_applied: Vec::new(),
                rules_skipped: Vec::new(),
                reason: None,
            };
        }
        Ok(false) => {
            debug!(prebuilt = %prebuilt_dir.display(), "no prebuilt viewer, patching bundle");
        }
        Err(err) => {
            warn!(error = %format!("{err:#}"), "prebuilt viewer install failed");
            return PatchResult::failed(viewer::INSTALL_TARGET, format!("{err:#}"));
        }
    }

    let assets = viewer::assets_dir(&installation.root);
    let outcome = viewer::rule_set().and_then(|rules| {
        patch_bundle(&assets, viewer::BUNDLE_PREFIX, viewer::BUNDLE_SUFFIX, &rules)
    });
    match outcome {
        Ok((path, outcome)) => {
            debug!(path = %path.display(), ?outcome, "bundle patch finished");
            PatchResult::from_outcome(viewer::BUNDLE_TARGET, &outcome)
        }
        Err(err) => {
            warn!(error = %err, "bundle patch failed");
            PatchResult::failed(viewer::BUNDLE_TARGET, err.to_string())
        }
    }
}

//! Read-only inspection for `ws-patcher status`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::rule::RuleSet;
use crate::io::bundle::find_asset;
use crate::targets::{recorder, viewer};

/// Patch state of one target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetState {
    Patched,
    Unpatched,
    Missing(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetStatus {
    pub target: &'static str,
    pub path: Option<PathBuf>,
    pub state: TargetState,
}

/// Report whether each target under `root` already carries its patch.
pub fn inspect(root: &Path) -> Result<Vec<TargetStatus>> {
    let tracing_path = recorder::tracing_path(root);
    let recorder_status = TargetStatus {
        target: recorder::TARGET,
        state: file_state(&tracing_path, &recorder::rule_set()?)?,
        path: Some(tracing_path),
    };

    let bundle_status = match find_asset(
        &viewer::assets_dir(root),
        viewer::BUNDLE_PREFIX,
        viewer::BUNDLE_SUFFIX,
    ) {
        Ok(path) => TargetStatus {
            target: viewer::BUNDLE_TARGET,
            state: file_state(&path, &viewer::rule_set()?)?,
            path: Some(path),
        },
        Err(err) => TargetStatus {
            target: viewer::BUNDLE_TARGET,
            path: None,
            state: TargetState::Missing(err.to_string()),
        },
    };

    Ok(vec![recorder_status, bundle_status])
}

fn file_state(path: &Path, rules: &RuleSet) -> Result<TargetState> {
    if !path.is_file() {
        return Ok(TargetState::Missing(format!(
            "file not found: {}",
            path.display()
        )));
    }
    let content = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    if rules.already_applied(&content) {
        Ok(TargetState::Patched)
    } else {
        Ok(TargetState::Unpatched)
    }
}

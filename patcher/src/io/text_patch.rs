//! Idempotent read-modify-write of a single target file.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::core::rule::{RuleSet, apply_rules, is_patched};
use crate::core::types::PatchOutcome;
use crate::error::PatchError;

/// Patch `path` with `rules`.
///
/// The whole transform is computed in memory; the file is written at most once
/// and only after every required rule matched.
pub fn patch_file(path: &Path, rules: &RuleSet) -> Result<PatchOutcome, PatchError> {
    if !path.is_file() {
        return Err(PatchError::FileNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)
        .map_err(|err| PatchError::io(format!("read {}", path.display()), err))?;

    if is_patched(&content, &rules.sentinel) {
        debug!(path = %path.display(), sentinel = %rules.sentinel, "sentinel present");
        return Ok(PatchOutcome::AlreadyPatched);
    }

    let transform = apply_rules(&content, &rules.rules)?;
    if transform.applied.is_empty() && !transform.present.is_empty() {
        debug!(path = %path.display(), rules = ?transform.present, "rule products present");
        return Ok(PatchOutcome::AlreadyPatched);
    }
    if transform.applied.is_empty() {
        debug!(path = %path.display(), "no rule matched, leaving file untouched");
        return Ok(PatchOutcome::Unchanged {
            skipped: transform.skipped,
        });
    }

    write_atomic(path, &transform.content)?;
    info!(path = %path.display(), rules = ?transform.applied, "patched");
    Ok(PatchOutcome::Applied {
        applied: transform.applied,
        skipped: transform.skipped,
    })
}

/// Temp file + rename in the target's directory.
fn write_atomic(path: &Path, contents: &str) -> Result<(), PatchError> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".ws-patcher.tmp");
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, contents)
        .map_err(|err| PatchError::io(format!("write temp file {}", tmp_path.display()), err))?;
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(PatchError::io(format!("replace {}", path.display()), err));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rule::{Replacement, Rule};

    fn rules() -> RuleSet {
        RuleSet {
            sentinel: "PATCHED".to_string(),
            rules: vec![
                Rule::literal("head", "head", Replacement::Text("head PATCHED".to_string())),
                Rule::literal("tail", "tail", Replacement::Text("tail!".to_string())),
            ],
        }
    }

    #[test]
    fn second_run_is_a_fixed_point() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("target.js");
        fs::write(&path, "head\nbody\ntail\n").expect("write");

        let first = patch_file(&path, &rules()).expect("first");
        assert!(matches!(first, PatchOutcome::Applied { .. }));
        let after_first = fs::read_to_string(&path).expect("read");
        assert_eq!(after_first, "head PATCHED\nbody\ntail!\n");

        let second = patch_file(&path, &rules()).expect("second");
        assert_eq!(second, PatchOutcome::AlreadyPatched);
        assert_eq!(fs::read_to_string(&path).expect("read"), after_first);
    }

    #[test]
    fn missing_required_marker_leaves_bytes_identical() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("target.js");
        let original = "head\nbody without the last marker\n";
        fs::write(&path, original).expect("write");

        let err = patch_file(&path, &rules()).unwrap_err();
        assert!(matches!(err, PatchError::MarkerNotFound(ref id) if id == "tail"));
        assert_eq!(fs::read_to_string(&path).expect("read"), original);
        let leftovers: Vec<_> = fs::read_dir(temp.path()).expect("read dir").collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn missing_file_is_reported() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("absent.js");
        let err = patch_file(&path, &rules()).unwrap_err();
        assert!(matches!(err, PatchError::FileNotFound(p) if p == path));
    }

    #[test]
    fn optional_only_miss_is_unchanged() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bundle.js");
        fs::write(&path, "minified").expect("write");
        let set = RuleSet {
            sentinel: "WS".to_string(),
            rules: vec![Rule::literal("x", "absent", Replacement::Text(String::new())).optional()],
        };
        let outcome = patch_file(&path, &set).expect("patch");
        assert_eq!(
            outcome,
            PatchOutcome::Unchanged {
                skipped: vec!["x".to_string()]
            }
        );
        assert_eq!(fs::read_to_string(&path).expect("read"), "minified");
    }
}

//! Trace viewer bundle discovery and patching.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::text_patch::patch_file;
use crate::core::rule::RuleSet;
use crate::core::types::PatchOutcome;
use crate::error::PatchError;

/// Find the single file in `dir` named `<prefix>*<suffix>`.
///
/// Content-hashed names mean the exact file name is unknown ahead of time.
/// More than one match is an error rather than an arbitrary pick.
pub fn find_asset(dir: &Path, prefix: &str, suffix: &str) -> Result<PathBuf, PatchError> {
    let pattern = format!("{prefix}*{suffix}");
    let not_found = || PatchError::AssetNotFound {
        dir: dir.to_path_buf(),
        pattern: pattern.clone(),
    };
    if !dir.is_dir() {
        return Err(not_found());
    }
    let entries =
        fs::read_dir(dir).map_err(|err| PatchError::io(format!("read {}", dir.display()), err))?;

    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| PatchError::io(format!("read {}", dir.display()), err))?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with(prefix) && name.ends_with(suffix) && entry.path().is_file() {
            matches.push(name);
        }
    }
    matches.sort();
    debug!(dir = %dir.display(), %pattern, ?matches, "asset candidates");

    match matches.len() {
        0 => Err(not_found()),
        1 => Ok(dir.join(&matches[0])),
        _ => Err(PatchError::AmbiguousAsset {
            dir: dir.to_path_buf(),
            pattern: pattern.clone(),
            candidates: matches,
        }),
    }
}

/// Locate the bundle in `assets_dir` and apply `rules` to it.
pub fn patch_bundle(
    assets_dir: &Path,
    prefix: &str,
    suffix: &str,
    rules: &RuleSet,
) -> Result<(PathBuf, PatchOutcome), PatchError> {
    let path = find_asset(assets_dir, prefix, suffix)?;
    let outcome = patch_file(&path, rules)?;
    Ok((path, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::viewer::{
        BUNDLE_PREFIX, BUNDLE_SUFFIX, WS_FILTER_RULE, WS_PREDICATE_RULE, rule_set,
    };

    const BUNDLE: &str = r#"const t=["All","Fetch","HTML","JS","CSS","Font","Image"];"#;

    #[test]
    fn finds_single_hashed_asset() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("defaultSettingsView-a1b2.js"), "x").expect("write");
        fs::write(temp.path().join("defaultSettingsView-a1b2.css"), "x").expect("write");
        fs::write(temp.path().join("index-ffff.js"), "x").expect("write");
        let found = find_asset(temp.path(), BUNDLE_PREFIX, BUNDLE_SUFFIX).expect("asset");
        assert_eq!(found, temp.path().join("defaultSettingsView-a1b2.js"));
    }

    #[test]
    fn multiple_matches_are_ambiguous() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("defaultSettingsView-b.js"), "x").expect("write");
        fs::write(temp.path().join("defaultSettingsView-a.js"), "x").expect("write");
        let err = find_asset(temp.path(), BUNDLE_PREFIX, BUNDLE_SUFFIX).unwrap_err();
        match err {
            PatchError::AmbiguousAsset { candidates, .. } => assert_eq!(
                candidates,
                vec!["defaultSettingsView-a.js", "defaultSettingsView-b.js"]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_dir_is_asset_not_found() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = find_asset(&temp.path().join("assets"), BUNDLE_PREFIX, BUNDLE_SUFFIX)
            .unwrap_err();
        assert!(matches!(err, PatchError::AssetNotFound { .. }));
    }

    #[test]
    fn bundle_patch_is_sentinel_gated() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("defaultSettingsView-c3.js");
        fs::write(&path, BUNDLE).expect("write");
        let rules = rule_set().expect("rules");

        let (found, first) =
            patch_bundle(temp.path(), BUNDLE_PREFIX, BUNDLE_SUFFIX, &rules).expect("first");
        assert_eq!(found, path);
        assert!(matches!(first, PatchOutcome::Applied { .. }));
        let patched = fs::read_to_string(&path).expect("read");
        assert_eq!(
            patched,
            r#"const t=["All","Fetch","HTML","JS","CSS","Font","Image","WS"];"#
        );

        let (_, second) =
            patch_bundle(temp.path(), BUNDLE_PREFIX, BUNDLE_SUFFIX, &rules).expect("second");
        assert_eq!(second, PatchOutcome::AlreadyPatched);
        assert_eq!(fs::read_to_string(&path).expect("read"), patched);
    }

    #[test]
    fn predicate_only_bundle_is_patched_once() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("defaultSettingsView-d4.js");
        fs::write(
            &path,
            r#"const t=["All","Doc"],p={Font:e=>e.includes("font"),Image:e=>e.includes("image")};"#,
        )
        .expect("write");
        let rules = rule_set().expect("rules");

        let (_, first) =
            patch_bundle(temp.path(), BUNDLE_PREFIX, BUNDLE_SUFFIX, &rules).expect("first");
        assert_eq!(
            first,
            PatchOutcome::Applied {
                applied: vec![WS_PREDICATE_RULE.to_string()],
                skipped: vec![WS_FILTER_RULE.to_string()],
            }
        );
        let patched = fs::read_to_string(&path).expect("read");
        assert_eq!(
            patched,
            r#"const t=["All","Doc"],p={Font:e=>e.includes("font"),Image:e=>e.includes("image"),WS:e=>e==="websocket"};"#
        );

        let (_, second) =
            patch_bundle(temp.path(), BUNDLE_PREFIX, BUNDLE_SUFFIX, &rules).expect("second");
        assert_eq!(second, PatchOutcome::AlreadyPatched);
        assert_eq!(fs::read_to_string(&path).expect("read"), patched);
    }
}

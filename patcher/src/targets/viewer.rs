//! Trace viewer targets: the prebuilt viewer directory and the minified
//! settings bundle used as a fallback.

use std::path::{Path, PathBuf};

use crate::core::rule::{Replacement, Rule, RuleSet};
use crate::error::PatchError;

pub const BUNDLE_TARGET: &str = "trace viewer bundle";
pub const INSTALL_TARGET: &str = "trace viewer";

/// Content-hashed build artifact naming: `defaultSettingsView-<hash>.js`.
pub const BUNDLE_PREFIX: &str = "defaultSettingsView-";
pub const BUNDLE_SUFFIX: &str = ".js";

pub const SENTINEL: &str = r#""WS""#;

pub const RESOURCE_TYPES_MARKER: &str = r#""Fetch","HTML","JS","CSS","Font","Image""#;
const PREDICATES_PATTERN: &str =
    r#"(Font:\w+=>\w+\.includes\("font"\),Image:\w+=>\w+\.includes\("image"\))"#;
const WS_PREDICATE: &str = r#"${1},WS:e=>e==="websocket""#;
/// What the predicate rule inserts, checked before it runs again.
pub const WS_PREDICATE_ENTRY: &str = r#"WS:e=>e==="websocket""#;

pub const WS_FILTER_RULE: &str = "WS filter";
pub const WS_PREDICATE_RULE: &str = "WS type predicate";

/// Directory the viewer is served from inside an installation root.
pub fn viewer_dir(root: &Path) -> PathBuf {
    root.join("lib").join("vite").join("traceViewer")
}

pub fn assets_dir(root: &Path) -> PathBuf {
    viewer_dir(root).join("assets")
}

/// Both rules are optional: the minified text drifts between releases. Each
/// rule matches on its own, so each is also skipped when its own product is
/// already there.
pub fn rule_set() -> Result<RuleSet, PatchError> {
    Ok(RuleSet {
        sentinel: SENTINEL.to_string(),
        rules: vec![
            Rule::literal(
                WS_FILTER_RULE,
                RESOURCE_TYPES_MARKER,
                Replacement::Text(format!("{RESOURCE_TYPES_MARKER},\"WS\"")),
            )
            .optional()
            .unless_present(SENTINEL),
            Rule::pattern(
                WS_PREDICATE_RULE,
                PREDICATES_PATTERN,
                Replacement::Template(WS_PREDICATE.to_string()),
            )?
            .optional()
            .unless_present(WS_PREDICATE_ENTRY),
        ],
    })
}

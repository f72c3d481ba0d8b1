//! Reads `package.json` metadata from a located installation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    version: Option<String>,
}

/// Version declared in `<root>/package.json`, if any.
pub fn read_version(root: &Path) -> Result<Option<String>> {
    let path = root.join("package.json");
    if !path.is_file() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let manifest: PackageManifest =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(manifest.version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_declared_version() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(
            temp.path().join("package.json"),
            r#"{"name":"playwright-core","version":"1.49.1"}"#,
        )
        .expect("write");
        assert_eq!(
            read_version(temp.path()).expect("version"),
            Some("1.49.1".to_string())
        );
    }

    #[test]
    fn missing_manifest_is_none() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(read_version(temp.path()).expect("version"), None);
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("package.json"), "{").expect("write");
        assert!(read_version(temp.path()).is_err());
    }
}

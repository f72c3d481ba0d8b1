//! Recursive copy of a prebuilt directory over an installed one.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Mirror every file under `source` into `target`, overwriting same-named
/// files. Files only present in `target` are left alone.
///
/// Returns `Ok(false)` when `source` does not exist. A failure mid-copy leaves
/// already copied files in place; re-running completes the install.
pub fn install_directory(source: &Path, target: &Path) -> Result<bool> {
    if !source.is_dir() {
        debug!(source = %source.display(), "prebuilt directory missing");
        return Ok(false);
    }
    fs::create_dir_all(target)
        .with_context(|| format!("create directory {}", target.display()))?;

    let mut copied = 0usize;
    for entry in WalkDir::new(source).min_depth(1).follow_links(true) {
        let entry = entry.with_context(|| format!("walk {}", source.display()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .with_context(|| format!("relativize {}", entry.path().display()))?;
        let dest = target.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)
                .with_context(|| format!("create directory {}", dest.display()))?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create directory {}", parent.display()))?;
            }
            fs::copy(entry.path(), &dest).with_context(|| {
                format!("copy {} to {}", entry.path().display(), dest.display())
            })?;
            copied += 1;
        }
    }
    info!(
        source = %source.display(),
        target = %target.display(),
        files = copied,
        "installed directory"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_source_returns_false() {
        let temp = tempfile::tempdir().expect("tempdir");
        let installed =
            install_directory(&temp.path().join("absent"), &temp.path().join("target"))
                .expect("install");
        assert!(!installed);
        assert!(!temp.path().join("target").exists());
    }

    #[test]
    fn mirrors_tree_and_keeps_unrelated_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("dist/traceViewer");
        let target = temp.path().join("pw/lib/vite/traceViewer");
        fs::create_dir_all(source.join("assets/nested")).expect("mkdir");
        fs::write(source.join("index.html"), "<html>new</html>").expect("write");
        fs::write(source.join("assets/nested/app.js"), [0u8, 159, 146, 150]).expect("write");
        fs::create_dir_all(&target).expect("mkdir");
        fs::write(target.join("index.html"), "<html>old</html>").expect("write");
        fs::write(target.join("keep.txt"), "untouched").expect("write");

        assert!(install_directory(&source, &target).expect("install"));

        assert_eq!(
            fs::read_to_string(target.join("index.html")).expect("read"),
            "<html>new</html>"
        );
        assert_eq!(
            fs::read(target.join("assets/nested/app.js")).expect("read"),
            vec![0u8, 159, 146, 150]
        );
        assert_eq!(
            fs::read_to_string(target.join("keep.txt")).expect("read"),
            "untouched"
        );
    }
}

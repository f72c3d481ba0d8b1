//! Installation locator.
//!
//! Probes the layouts package managers produce for the target package, in a
//! fixed order, and returns the first directory that exists. Nothing about the
//! installation's internals is validated here.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::config::PatcherConfig;

/// Which probe found the installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `node_modules/<package>` under the working directory or a parent.
    Direct,
    /// Nested under the test runner's own `node_modules`.
    TestRunnerBundled,
    /// Hoisted package-manager cache (`node_modules/.bun/<package>@<version>`).
    Hoisted,
    /// Module-resolution fallback (ancestor walk, then `NODE_PATH`).
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub root: PathBuf,
    pub layout: Layout,
}

#[derive(Debug, Clone)]
pub struct Locator {
    cwd: PathBuf,
    package: String,
    test_runner_package: String,
    hoisted_cache_dir: PathBuf,
    parent_levels: usize,
    node_path: Vec<PathBuf>,
}

impl Locator {
    pub fn new(cwd: impl Into<PathBuf>, config: &PatcherConfig) -> Self {
        Self {
            cwd: cwd.into(),
            package: config.package.clone(),
            test_runner_package: config.test_runner_package.clone(),
            hoisted_cache_dir: config.hoisted_cache_dir.clone(),
            parent_levels: config.parent_levels,
            node_path: Vec::new(),
        }
    }

    /// Extra module-resolution roots (the entries of `NODE_PATH`).
    pub fn with_node_path(mut self, node_path: Vec<PathBuf>) -> Self {
        self.node_path = node_path;
        self
    }

    /// Fixed candidates: direct and test-runner-bundled paths from the working
    /// directory and each probed parent.
    pub fn candidates(&self) -> Vec<(PathBuf, Layout)> {
        let mut out = Vec::new();
        for base in self.cwd.ancestors().take(self.parent_levels + 1) {
            let modules = base.join("node_modules");
            out.push((package_dir(&modules, &self.package), Layout::Direct));
            let nested = package_dir(&modules, &self.test_runner_package).join("node_modules");
            out.push((package_dir(&nested, &self.package), Layout::TestRunnerBundled));
        }
        out
    }

    /// First existing installation, or `None` when every probe fails.
    pub fn locate(&self) -> Option<Installation> {
        for (path, layout) in self.candidates() {
            debug!(path = %path.display(), ?layout, "probing candidate");
            if path.exists() {
                return Some(Installation { root: path, layout });
            }
        }
        if let Some(root) = self.hoisted() {
            return Some(Installation {
                root,
                layout: Layout::Hoisted,
            });
        }
        self.resolve().map(|root| Installation {
            root,
            layout: Layout::Resolved,
        })
    }

    fn hoisted(&self) -> Option<PathBuf> {
        let cache = self.cwd.join(&self.hoisted_cache_dir);
        let entries = match fs::read_dir(&cache) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(cache = %cache.display(), error = %err, "no hoisted cache");
                return None;
            }
        };
        // Scoped packages are flattened as `@scope+name@<version>`.
        let prefix = format!("{}@", self.package.replace('/', "+"));
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(&prefix) && name.len() > prefix.len())
            .collect();
        names.sort();
        names.into_iter().find_map(|name| {
            let candidate = package_dir(&cache.join(&name).join("node_modules"), &self.package);
            debug!(path = %candidate.display(), "probing hoisted entry");
            candidate.exists().then_some(candidate)
        })
    }

    /// Node-style lookup: `node_modules/<package>/package.json` in every
    /// ancestor, then `<dir>/<package>/package.json` for each `NODE_PATH` dir.
    fn resolve(&self) -> Option<PathBuf> {
        let from_ancestors = self
            .cwd
            .ancestors()
            .map(|dir| package_dir(&dir.join("node_modules"), &self.package));
        let from_node_path = self
            .node_path
            .iter()
            .map(|dir| package_dir(dir, &self.package));
        from_ancestors.chain(from_node_path).find(|dir| {
            debug!(path = %dir.display(), "resolving package.json");
            dir.join("package.json").is_file()
        })
    }
}

/// `base/<name>`, splitting scoped names into their path components.
fn package_dir(base: &Path, name: &str) -> PathBuf {
    name.split('/').fold(base.to_path_buf(), |dir, part| dir.join(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mkdir(path: &Path) {
        fs::create_dir_all(path).expect("create dir");
    }

    fn locator(cwd: &Path) -> Locator {
        Locator::new(cwd, &PatcherConfig::default())
    }

    #[test]
    fn finds_direct_install() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("node_modules/playwright-core");
        mkdir(&root);
        let found = locator(temp.path()).locate().expect("found");
        assert_eq!(found, Installation { root, layout: Layout::Direct });
    }

    #[test]
    fn finds_copy_bundled_with_test_runner() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp
            .path()
            .join("node_modules/@playwright/test/node_modules/playwright-core");
        mkdir(&root);
        let found = locator(temp.path()).locate().expect("found");
        assert_eq!(found.root, root);
        assert_eq!(found.layout, Layout::TestRunnerBundled);
    }

    #[test]
    fn finds_install_in_workspace_parent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cwd = temp.path().join("packages/app");
        mkdir(&cwd);
        let root = temp.path().join("node_modules/playwright-core");
        mkdir(&root);
        let found = locator(&cwd).locate().expect("found");
        assert_eq!(found.root, root);
        assert_eq!(found.layout, Layout::Direct);
    }

    #[test]
    fn direct_install_wins_over_parent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cwd = temp.path().join("app");
        let near = cwd.join("node_modules/playwright-core");
        mkdir(&near);
        mkdir(&temp.path().join("node_modules/playwright-core"));
        assert_eq!(locator(&cwd).locate().expect("found").root, near);
    }

    #[test]
    fn finds_hoisted_cache_entry() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cache = temp.path().join("node_modules/.bun");
        mkdir(&cache.join("playwright@1.49.0/node_modules/playwright"));
        let root = cache.join("playwright-core@1.49.0/node_modules/playwright-core");
        mkdir(&root);
        let found = locator(temp.path()).locate().expect("found");
        assert_eq!(found.root, root);
        assert_eq!(found.layout, Layout::Hoisted);
    }

    #[test]
    fn hoisted_entry_without_package_dir_is_ignored() {
        let temp = tempfile::tempdir().expect("tempdir");
        mkdir(&temp.path().join("node_modules/.bun/playwright-core@1.49.0"));
        assert_eq!(locator(temp.path()).locate(), None);
    }

    #[test]
    fn falls_back_to_node_path_resolution() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cwd = temp.path().join("project");
        mkdir(&cwd);
        let global = temp.path().join("global/lib");
        let root = global.join("playwright-core");
        mkdir(&root);
        fs::write(root.join("package.json"), "{}").expect("write package.json");
        let found = locator(&cwd)
            .with_node_path(vec![global])
            .locate()
            .expect("found");
        assert_eq!(found.root, root);
        assert_eq!(found.layout, Layout::Resolved);
    }

    #[test]
    fn resolution_walks_past_probed_parents() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cwd = temp.path().join("a/b/c");
        mkdir(&cwd);
        let root = temp.path().join("node_modules/playwright-core");
        mkdir(&root);
        fs::write(root.join("package.json"), "{}").expect("write package.json");
        let found = locator(&cwd).locate().expect("found");
        assert_eq!(found.root, root);
        assert_eq!(found.layout, Layout::Resolved);
    }

    #[test]
    fn reports_not_found() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cwd = temp.path().join("empty");
        mkdir(&cwd);
        assert_eq!(locator(&cwd).locate(), None);
    }

    #[test]
    fn candidate_order_is_fixed() {
        let cwd = Path::new("/w/a/b");
        let paths: Vec<PathBuf> = locator(cwd)
            .candidates()
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/w/a/b/node_modules/playwright-core"),
                PathBuf::from("/w/a/b/node_modules/@playwright/test/node_modules/playwright-core"),
                PathBuf::from("/w/a/node_modules/playwright-core"),
                PathBuf::from("/w/a/node_modules/@playwright/test/node_modules/playwright-core"),
                PathBuf::from("/w/node_modules/playwright-core"),
                PathBuf::from("/w/node_modules/@playwright/test/node_modules/playwright-core"),
            ]
        );
    }
}

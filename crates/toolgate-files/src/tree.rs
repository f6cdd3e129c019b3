//! Depth-limited directory tree export.

use crate::FilesystemProvider;
use crate::filesystem::{join_error, not_found_or_io};
use crate::types::{EntryKind, StructureResult, TreeNode};
use crate::validator::to_display;
use std::path::Path;
use toolgate_core::{Error, Result, SandboxConfig};

/// Depth used when the caller does not pass one.
pub const DEFAULT_STRUCTURE_DEPTH: usize = 3;

/// Largest accepted depth; larger requests are clamped.
pub const MAX_STRUCTURE_DEPTH: usize = 10;

impl FilesystemProvider {
    /// Exports the directory tree below `path`.
    ///
    /// The root node is always present and its children sit at depth 0.
    /// Nodes at depth `max_depth` or deeper are omitted, so a directory at
    /// the limit is returned with an empty `children` list. Blocked names are
    /// pruned entirely and symbolic links are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] if validation fails,
    /// [`Error::NotFound`] if the path does not exist, or
    /// [`Error::InvalidArgument`] if it is not a directory.
    pub async fn structure(&self, max_depth: usize, path: &str) -> Result<StructureResult> {
        let max_depth = max_depth.min(MAX_STRUCTURE_DEPTH);
        let resolved = self.validator.validate(path)?;
        let metadata = tokio::fs::metadata(resolved.as_path())
            .await
            .map_err(|e| not_found_or_io(&resolved, e))?;
        if !metadata.is_dir() {
            return Err(Error::InvalidArgument(format!(
                "structure path must be a directory: {}",
                resolved.display_relative()
            )));
        }

        let config = self.validator.config().clone();
        let start = resolved.as_path().to_path_buf();
        let relative = resolved.relative().to_path_buf();
        let structure = tokio::task::spawn_blocking(move || {
            let name = relative
                .file_name()
                .map_or_else(|| ".".to_string(), |n| n.to_string_lossy().into_owned());
            TreeNode {
                name,
                kind: EntryKind::Directory,
                path: to_display(&relative),
                size: None,
                children: Some(children(&config, &start, 0, max_depth)),
            }
        })
        .await
        .map_err(|e| join_error(resolved.as_path(), &e))?;

        let nodes = structure.descendant_count();
        tracing::debug!(
            provider = %self.name,
            path = %resolved.display_relative(),
            max_depth,
            nodes,
            "structure exported"
        );

        Ok(StructureResult {
            message: format!(
                "Project structure of {} ({nodes} entries, depth {max_depth})",
                resolved.display_relative()
            ),
            max_depth,
            structure,
        })
    }
}

/// Builds the children of `dir`, which sit at `depth`.
///
/// Unreadable directories yield no children rather than failing the export.
fn children(config: &SandboxConfig, dir: &Path, depth: usize, max_depth: usize) -> Vec<TreeNode> {
    if depth >= max_depth {
        return Vec::new();
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::trace!(path = %dir.display(), error = %e, "skipping unreadable directory");
            return Vec::new();
        }
    };

    let mut nodes: Vec<TreeNode> = entries
        .filter_map(std::result::Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if config.is_blocked(&name) {
                return None;
            }

            let file_type = entry.file_type().ok()?;
            let path = entry.path();
            let relative = path.strip_prefix(config.root()).unwrap_or(&path);

            if file_type.is_dir() {
                Some(TreeNode {
                    path: to_display(relative),
                    name,
                    kind: EntryKind::Directory,
                    size: None,
                    children: Some(children(config, &path, depth + 1, max_depth)),
                })
            } else if file_type.is_file() {
                Some(TreeNode {
                    path: to_display(relative),
                    name,
                    kind: EntryKind::File,
                    size: Some(entry.metadata().map_or(0, |m| m.len())),
                    children: None,
                })
            } else {
                None
            }
        })
        .collect();

    nodes.sort_by(|a, b| {
        let rank = |node: &TreeNode| u8::from(node.kind != EntryKind::Directory);
        rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name))
    });
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn provider(temp: &TempDir) -> FilesystemProvider {
        let config = SandboxConfig::builder().root(temp.path()).build().unwrap();
        FilesystemProvider::new(Arc::new(config))
    }

    fn deep_tree(temp: &TempDir) {
        std::fs::create_dir_all(temp.path().join("a/b/c")).unwrap();
        std::fs::write(temp.path().join("a/b/c/d.txt"), "deep").unwrap();
    }

    #[tokio::test]
    async fn test_depth_limit_omits_deep_nodes() {
        let temp = TempDir::new().unwrap();
        deep_tree(&temp);
        let fs = provider(&temp);

        let result = fs.structure(2, ".").await.unwrap();
        let tree = &result.structure;

        assert_eq!(tree.name, ".");
        assert!(tree.find("a").is_some());
        assert_eq!(tree.find("a/b").unwrap().children, Some(vec![]));
        assert!(tree.find("a/b/c").is_none());
        assert!(tree.find("a/b/c/d.txt").is_none());
        assert_eq!(result.max_depth, 2);
    }

    #[tokio::test]
    async fn test_zero_depth_returns_bare_root() {
        let temp = TempDir::new().unwrap();
        deep_tree(&temp);
        let fs = provider(&temp);

        let result = fs.structure(0, ".").await.unwrap();
        assert_eq!(result.structure.children, Some(vec![]));
    }

    #[tokio::test]
    async fn test_reducing_depth_never_grows_tree() {
        let temp = TempDir::new().unwrap();
        deep_tree(&temp);
        std::fs::write(temp.path().join("a/top.md"), "x").unwrap();
        let fs = provider(&temp);

        let mut previous = usize::MAX;
        for depth in (0..=5).rev() {
            let count = fs.structure(depth, ".").await.unwrap().structure.descendant_count();
            assert!(count <= previous);
            previous = count;
        }
        assert_eq!(fs.structure(4, ".").await.unwrap().structure.descendant_count(), 5);
    }

    #[tokio::test]
    async fn test_directories_first_then_by_name() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("b.md"), "").unwrap();
        std::fs::write(temp.path().join("a.md"), "").unwrap();
        std::fs::create_dir(temp.path().join("zeta")).unwrap();
        std::fs::create_dir(temp.path().join("alpha")).unwrap();
        let fs = provider(&temp);

        let tree = fs.structure(1, ".").await.unwrap().structure;
        let names: Vec<_> = tree
            .children
            .unwrap()
            .into_iter()
            .map(|node| node.name)
            .collect();
        assert_eq!(names, ["alpha", "zeta", "a.md", "b.md"]);
    }

    #[tokio::test]
    async fn test_blocked_directories_are_pruned() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(".git/objects")).unwrap();
        std::fs::create_dir_all(temp.path().join("src/node_modules")).unwrap();
        let fs = provider(&temp);

        let tree = fs.structure(5, ".").await.unwrap().structure;
        assert!(tree.find(".git").is_none());
        assert!(tree.find("src/node_modules").is_none());
        assert_eq!(tree.find("src").unwrap().children, Some(vec![]));
    }

    #[tokio::test]
    async fn test_subtree_export_uses_root_relative_paths() {
        let temp = TempDir::new().unwrap();
        deep_tree(&temp);
        let fs = provider(&temp);

        let tree = fs.structure(DEFAULT_STRUCTURE_DEPTH, "a/b").await.unwrap().structure;
        assert_eq!(tree.name, "b");
        assert_eq!(tree.path, "a/b");
        let file = tree.find("a/b/c/d.txt").unwrap();
        assert_eq!(file.kind, EntryKind::File);
        assert_eq!(file.size, Some(4));
    }

    #[tokio::test]
    async fn test_depth_is_clamped() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);

        let result = fs.structure(500, ".").await.unwrap();
        assert_eq!(result.max_depth, MAX_STRUCTURE_DEPTH);
    }

    #[tokio::test]
    async fn test_structure_of_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.md"), "").unwrap();
        let fs = provider(&temp);

        assert!(fs.structure(2, "a.md").await.unwrap_err().is_invalid_argument());
        assert!(fs.structure(2, "nope").await.unwrap_err().is_not_found());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_are_skipped() {
        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "s").unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("link")).unwrap();
        let fs = provider(&temp);

        let tree = fs.structure(3, ".").await.unwrap().structure;
        assert!(tree.find("link").is_none());
    }
}

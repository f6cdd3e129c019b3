//! Filesystem provider operations.
//!
//! Each operation validates its path first and only then touches storage.
//! `write`, `mkdir` and `delete` mutate the real filesystem; everything else
//! is read-only. No operation takes a lock: concurrent writers to the same
//! path race and the last rename wins.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use toolgate_core::SandboxConfig;
//! use toolgate_files::FilesystemProvider;
//! # use tempfile::TempDir;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> toolgate_core::Result<()> {
//! # let temp = TempDir::new().unwrap();
//! let config = SandboxConfig::builder().root(temp.path()).build()?;
//! let fs = FilesystemProvider::new(Arc::new(config));
//!
//! fs.write("docs/notes.md", "# Notes").await?;
//! let read = fs.read("docs/notes.md").await?;
//! assert_eq!(read.content, "# Notes");
//! # Ok(())
//! # }
//! ```

use crate::types::{
    DirectoryEntry, EntryKind, ListResult, PathResult, ReadResult, StatResult, WriteResult,
    permissions, timestamp,
};
use crate::validator::{PathValidator, ResolvedPath};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use toolgate_core::{Error, ProviderName, Result, SandboxConfig};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Provider for sandboxed local filesystem access.
#[derive(Debug, Clone)]
pub struct FilesystemProvider {
    pub(crate) name: ProviderName,
    pub(crate) validator: PathValidator,
}

impl FilesystemProvider {
    /// Name the provider registers under.
    pub const NAME: &'static str = "filesystem";

    /// Creates a provider over the given sandbox.
    #[must_use]
    pub fn new(config: Arc<SandboxConfig>) -> Self {
        Self {
            name: ProviderName::new(Self::NAME),
            validator: PathValidator::new(config),
        }
    }

    /// Returns the path validator.
    #[must_use]
    pub const fn validator(&self) -> &PathValidator {
        &self.validator
    }

    /// Reads a whole file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] if validation fails, or
    /// [`Error::NotFound`] if the file cannot be read.
    pub async fn read(&self, path: &str) -> Result<ReadResult> {
        let resolved = self.validated_file(path)?;
        let shown = resolved.display_relative();

        let content = tokio::fs::read_to_string(resolved.as_path())
            .await
            .map_err(|e| {
                tracing::debug!(provider = %self.name, path = %shown, error = %e, "read failed");
                Error::NotFound {
                    resource: format!("{shown}: {e}"),
                }
            })?;
        let metadata = metadata(resolved.as_path()).await?;

        tracing::debug!(provider = %self.name, path = %shown, bytes = content.len(), "file read");
        Ok(ReadResult {
            message: format!("Read {shown}"),
            content,
            path: shown,
            size: metadata.len(),
            modified_at: timestamp(metadata.modified()),
        })
    }

    /// Writes a file, creating parent directories as needed.
    ///
    /// Content goes to a sibling temp file which is then renamed over the
    /// target, so a concurrent reader sees either the old or the new content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] if validation fails,
    /// [`Error::PermissionDenied`] if the target is the root or an existing
    /// directory, or [`Error::Io`] if directories or the file cannot be
    /// written.
    pub async fn write(&self, path: &str, content: &str) -> Result<WriteResult> {
        let resolved = self.validated_file(path)?;
        let shown = resolved.display_relative();
        let target = resolved.as_path();

        if resolved.is_root() {
            return Err(Error::PermissionDenied {
                reason: "Cannot write to the project root".to_string(),
            });
        }
        if tokio::fs::metadata(target).await.is_ok_and(|m| m.is_dir()) {
            tracing::warn!(provider = %self.name, path = %shown, "refused write over directory");
            return Err(Error::PermissionDenied {
                reason: format!("Cannot write to a directory: {shown}"),
            });
        }
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }
        write_file_atomic(target, content.as_bytes()).await?;
        let metadata = metadata(target).await?;

        tracing::info!(provider = %self.name, path = %shown, bytes = content.len(), "file written");
        Ok(WriteResult {
            message: format!("Wrote {} bytes to {shown}", content.len()),
            path: shown,
            size: metadata.len(),
            modified_at: timestamp(metadata.modified()),
        })
    }

    /// Lists the immediate children of a directory.
    ///
    /// Blocked names are skipped; files are kept only if they have no
    /// extension or an allowed one. Directories and files are returned as two
    /// groups, each sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] if validation fails,
    /// [`Error::NotFound`] if the directory does not exist, or [`Error::Io`]
    /// if it cannot be enumerated.
    pub async fn list(&self, path: &str) -> Result<ListResult> {
        let resolved = self.validator.validate(path)?;
        let shown = resolved.display_relative();
        let config = self.validator.config();

        let mut entries = tokio::fs::read_dir(resolved.as_path())
            .await
            .map_err(|e| not_found_or_io(&resolved, e))?;

        let mut directories = Vec::new();
        let mut files = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::io(resolved.as_path(), e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if config.is_blocked(&name) {
                continue;
            }

            let entry_path = entry.path();
            let metadata = match tokio::fs::metadata(&entry_path).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::debug!(path = %entry_path.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            let kind = if metadata.is_dir() {
                EntryKind::Directory
            } else if self.validator.is_file_name_allowed(&name) {
                EntryKind::File
            } else {
                continue;
            };

            let item = DirectoryEntry {
                path: child_path(&resolved, &name),
                name,
                size: metadata.len(),
                modified_at: timestamp(metadata.modified()),
                kind,
            };
            match kind {
                EntryKind::Directory => directories.push(item),
                EntryKind::File => files.push(item),
            }
        }

        directories.sort_by(|a, b| a.name.cmp(&b.name));
        files.sort_by(|a, b| a.name.cmp(&b.name));
        let total_items = directories.len() + files.len();

        tracing::debug!(provider = %self.name, path = %shown, total_items, "directory listed");
        Ok(ListResult {
            message: format!("Found {total_items} items in {shown}"),
            path: shown,
            directories,
            files,
            total_items,
        })
    }

    /// Creates a directory and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] if validation fails, or [`Error::Io`]
    /// if creation fails.
    pub async fn mkdir(&self, path: &str) -> Result<PathResult> {
        let resolved = self.validator.validate(path)?;
        let shown = resolved.display_relative();

        tokio::fs::create_dir_all(resolved.as_path())
            .await
            .map_err(|e| Error::io(resolved.as_path(), e))?;

        tracing::info!(provider = %self.name, path = %shown, "directory created");
        Ok(PathResult {
            message: format!("Created directory {shown}"),
            path: shown,
        })
    }

    /// Deletes a single file.
    ///
    /// Directories are never deleted: the call fails before any unlink is
    /// attempted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] if validation fails,
    /// [`Error::PermissionDenied`] if the target is a directory,
    /// [`Error::NotFound`] if it does not exist, or [`Error::Io`] if the
    /// unlink fails.
    pub async fn delete(&self, path: &str) -> Result<PathResult> {
        let resolved = self.validated_file(path)?;
        let shown = resolved.display_relative();

        let metadata = tokio::fs::metadata(resolved.as_path())
            .await
            .map_err(|e| not_found_or_io(&resolved, e))?;
        if metadata.is_dir() {
            tracing::warn!(provider = %self.name, path = %shown, "refused directory delete");
            return Err(Error::PermissionDenied {
                reason: format!("Cannot delete directories: {shown}"),
            });
        }

        tokio::fs::remove_file(resolved.as_path())
            .await
            .map_err(|e| not_found_or_io(&resolved, e))?;

        tracing::info!(provider = %self.name, path = %shown, "file deleted");
        Ok(PathResult {
            message: format!("Deleted {shown}"),
            path: shown,
        })
    }

    /// Returns size, timestamps, type flags and permission bits of a path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] if validation fails, or
    /// [`Error::NotFound`] if the path does not exist.
    pub async fn stat(&self, path: &str) -> Result<StatResult> {
        let resolved = self.validator.validate(path)?;
        let shown = resolved.display_relative();

        let metadata = tokio::fs::metadata(resolved.as_path())
            .await
            .map_err(|e| not_found_or_io(&resolved, e))?;

        Ok(StatResult {
            message: format!("Stat {shown}"),
            path: shown,
            size: metadata.len(),
            created_at: timestamp(metadata.created()),
            modified_at: timestamp(metadata.modified()),
            accessed_at: timestamp(metadata.accessed()),
            is_file: metadata.is_file(),
            is_directory: metadata.is_dir(),
            permissions: permissions(&metadata),
        })
    }

    /// Validates a path that names file content: segments plus extension.
    fn validated_file(&self, path: &str) -> Result<ResolvedPath> {
        let resolved = self.validator.validate(path)?;
        self.validator.validate_extension(&resolved)?;
        Ok(resolved)
    }
}

/// Joins a child name onto a resolved directory's display path.
pub(crate) fn child_path(parent: &ResolvedPath, name: &str) -> String {
    if parent.is_root() {
        name.to_string()
    } else {
        format!("{}/{name}", parent.display_relative())
    }
}

/// Maps a missing path to [`Error::NotFound`], anything else to [`Error::Io`].
pub(crate) fn not_found_or_io(path: &ResolvedPath, error: std::io::Error) -> Error {
    if error.kind() == ErrorKind::NotFound {
        Error::NotFound {
            resource: path.display_relative(),
        }
    } else {
        Error::io(path.as_path(), error)
    }
}

/// Maps a failed blocking task to an I/O error on `path`.
pub(crate) fn join_error(path: &Path, error: &tokio::task::JoinError) -> Error {
    Error::io(path, std::io::Error::other(error.to_string()))
}

async fn metadata(path: &Path) -> Result<std::fs::Metadata> {
    tokio::fs::metadata(path)
        .await
        .map_err(|e| Error::io(path, e))
}

/// Writes `content` to a uniquely named sibling temp file, then renames it
/// over `path`.
async fn write_file_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let temp_path = temp_sibling(path);

    if let Err(e) = tokio::fs::write(&temp_path, content).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(Error::io(&temp_path, e));
    }

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(Error::io(path, e));
    }

    Ok(())
}

/// `.name.<pid>-<n>.tmp` next to `path`; the `.tmp` extension keeps it out of
/// listings while it exists.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "file".into(), |n| n.to_string_lossy());
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}-{n}.tmp", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn provider(temp: &TempDir) -> FilesystemProvider {
        let config = SandboxConfig::builder().root(temp.path()).build().unwrap();
        FilesystemProvider::new(Arc::new(config))
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);

        let content = "line one\nline two\n✓ unicode";
        let written = fs.write("notes.md", content).await.unwrap();
        assert_eq!(written.path, "notes.md");
        assert_eq!(written.size, content.len() as u64);

        let read = fs.read("notes.md").await.unwrap();
        assert_eq!(read.content, content);
        assert_eq!(read.size, content.len() as u64);
        assert!(read.modified_at.is_some());
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);

        fs.write("a/b/c/deep.ts", "export {}").await.unwrap();
        assert!(temp.path().join("a/b/c/deep.ts").is_file());
    }

    #[tokio::test]
    async fn test_write_overwrites_and_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);

        fs.write("config.json", "{}").await.unwrap();
        fs.write("config.json", r#"{"a":1}"#).await.unwrap();

        assert_eq!(fs.read("config.json").await.unwrap().content, r#"{"a":1}"#);
        let names: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["config.json"]);
    }

    #[tokio::test]
    async fn test_write_rejects_disallowed_extension() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);

        let err = fs.write("run.exe", "x").await.unwrap_err();
        assert!(err.is_access_denied());
        assert!(err.to_string().contains(".exe files are not allowed"));
        assert!(!temp.path().join("run.exe").exists());
    }

    #[tokio::test]
    async fn test_write_to_root_touches_nothing_outside() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("proj");
        std::fs::create_dir(&root).unwrap();
        let config = SandboxConfig::builder().root(root.as_path()).build().unwrap();
        let fs = FilesystemProvider::new(Arc::new(config));

        for path in [".", "", "a/.."] {
            let err = fs.write(path, "x").await.unwrap_err();
            assert!(err.is_permission_denied(), "path {path:?}");
            assert!(!err.to_string().contains(&*outer.path().to_string_lossy()));
        }

        let names: Vec<_> = std::fs::read_dir(outer.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["proj"]);
    }

    #[tokio::test]
    async fn test_write_over_directory_is_refused() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("docs")).unwrap();
        let fs = provider(&temp);

        let err = fs.write("docs", "x").await.unwrap_err();
        assert!(err.is_permission_denied());
        assert!(err.to_string().contains("Cannot write to a directory: docs"));
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);

        assert!(fs.read("missing.md").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_read_outside_root_is_denied() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);

        let err = fs.read("../../etc/passwd").await.unwrap_err();
        assert!(err.to_string().contains("Path is outside project root"));
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::write(root.join("zeta.md"), "z").unwrap();
        std::fs::write(root.join("alpha.ts"), "a").unwrap();
        std::fs::write(root.join("Makefile"), "all:").unwrap();
        std::fs::write(root.join("image.png"), [0u8; 4]).unwrap();
        std::fs::create_dir(root.join("src")).unwrap();
        std::fs::create_dir(root.join("docs")).unwrap();
        std::fs::create_dir(root.join("node_modules")).unwrap();
        let fs = provider(&temp);

        let listed = fs.list(".").await.unwrap();
        let dirs: Vec<_> = listed.directories.iter().map(|e| e.name.as_str()).collect();
        let files: Vec<_> = listed.files.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(dirs, vec!["docs", "src"]);
        assert_eq!(files, vec!["Makefile", "alpha.ts", "zeta.md"]);
        assert_eq!(listed.total_items, 5);
        assert_eq!(listed.path, ".");
        assert_eq!(listed.files[1].path, "alpha.ts");
    }

    #[tokio::test]
    async fn test_list_nested_paths() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src/bin")).unwrap();
        std::fs::write(temp.path().join("src/lib.rs"), "").unwrap();
        let fs = provider(&temp);

        let listed = fs.list("src").await.unwrap();
        assert_eq!(listed.files[0].path, "src/lib.rs");
        assert_eq!(listed.directories[0].path, "src/bin");
        assert_eq!(listed.directories[0].kind, EntryKind::Directory);
    }

    #[tokio::test]
    async fn test_list_missing_directory() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);

        assert!(fs.list("nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_mkdir_recursive() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);

        let result = fs.mkdir("x/y/z").await.unwrap();
        assert_eq!(result.path, "x/y/z");
        assert!(temp.path().join("x/y/z").is_dir());

        // Idempotent
        fs.mkdir("x/y/z").await.unwrap();
    }

    #[tokio::test]
    async fn test_mkdir_blocked_is_denied() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);

        assert!(fs.mkdir("src/.git").await.unwrap_err().is_access_denied());
        assert!(!temp.path().join("src").exists());
    }

    #[tokio::test]
    async fn test_delete_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("old.txt"), "bye").unwrap();
        let fs = provider(&temp);

        fs.delete("old.txt").await.unwrap();
        assert!(!temp.path().join("old.txt").exists());
        assert!(fs.delete("old.txt").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_directory_is_permission_denied() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("keep")).unwrap();
        std::fs::write(temp.path().join("keep/file.md"), "x").unwrap();
        let fs = provider(&temp);

        let err = fs.delete("keep").await.unwrap_err();
        assert!(err.is_permission_denied());
        assert!(temp.path().join("keep/file.md").exists());
    }

    #[tokio::test]
    async fn test_stat_file_and_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.md"), "hello").unwrap();
        let fs = provider(&temp);

        let file = fs.stat("a.md").await.unwrap();
        assert!(file.is_file);
        assert!(!file.is_directory);
        assert_eq!(file.size, 5);
        assert!(!file.permissions.is_empty());

        let root = fs.stat(".").await.unwrap();
        assert!(root.is_directory);
        assert_eq!(root.path, ".");
    }

    #[tokio::test]
    async fn test_stat_does_not_check_extension() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("tool.exe"), "MZ").unwrap();
        let fs = provider(&temp);

        assert!(fs.stat("tool.exe").await.unwrap().is_file);
    }

    #[test]
    fn test_temp_sibling_is_unique_and_hidden() {
        let a = temp_sibling(Path::new("/p/notes.md"));
        let b = temp_sibling(Path::new("/p/notes.md"));
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(Path::new("/p")));
        let name = a.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with(".notes.md."));
        assert!(name.ends_with(".tmp"));
    }
}

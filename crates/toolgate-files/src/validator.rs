//! Path validation against the sandbox.
//!
//! Every filesystem operation first turns the caller's path into a
//! [`ResolvedPath`]. Validation is by path *segment*: a blocked name is
//! rejected wherever it appears, without a per-depth blocklist.
//!
//! Checks, in order:
//! 1. The lexically normalized absolute path must lie under the project root.
//! 2. No segment of the root-relative path may be a blocked name.
//! 3. After resolving symbolic links of the deepest existing ancestor, the
//!    real path must still lie under the root and still avoid blocked names.
//!
//! Extension checks are separate ([`PathValidator::validate_extension`]) and
//! only apply to operations that touch file content.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use toolgate_core::{Error, Result, SandboxConfig};

/// An absolute, root-confined, blocklist-clean filesystem path.
///
/// Only [`PathValidator::validate`] creates these; one is built fresh for each
/// call and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    relative: PathBuf,
    real: PathBuf,
}

impl ResolvedPath {
    /// Returns the absolute path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    /// Returns the path relative to the project root (empty for the root).
    #[must_use]
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// Returns the path with symbolic links resolved.
    ///
    /// Components that do not exist yet are appended unresolved.
    #[must_use]
    pub fn real_path(&self) -> &Path {
        &self.real
    }

    /// Returns `true` if this path names the project root itself.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }

    /// Returns the root-relative path with `/` separators, `.` for the root.
    #[must_use]
    pub fn display_relative(&self) -> String {
        to_display(&self.relative)
    }
}

/// Validates caller-supplied paths against a [`SandboxConfig`].
#[derive(Debug, Clone)]
pub struct PathValidator {
    config: Arc<SandboxConfig>,
}

impl PathValidator {
    /// Creates a validator over the given configuration.
    #[must_use]
    pub const fn new(config: Arc<SandboxConfig>) -> Self {
        Self { config }
    }

    /// Returns the shared configuration.
    #[must_use]
    pub const fn config(&self) -> &Arc<SandboxConfig> {
        &self.config
    }

    /// Resolves `path` against the project root.
    ///
    /// Relative paths are joined to the root; absolute paths are accepted
    /// only if they already lie under it. An empty path names the root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] if the path escapes the root, contains
    /// a blocked segment, or resolves through a symlink to somewhere that
    /// does either.
    pub fn validate(&self, path: &str) -> Result<ResolvedPath> {
        let root = self.config.root();
        let candidate = Path::new(path.trim());
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            root.join(candidate)
        };
        let absolute = normalize_lexical(&joined);

        let Ok(relative) = absolute.strip_prefix(root) else {
            tracing::warn!(path, "rejected path outside project root");
            return Err(Error::access_denied("Path is outside project root"));
        };
        let relative = relative.to_path_buf();
        self.reject_blocked(&relative, path)?;

        let real = resolve_real_path(&absolute, &relative)?;
        let Ok(real_relative) = real.strip_prefix(root) else {
            tracing::warn!(path, real = %real.display(), "rejected symlink escape");
            return Err(Error::access_denied("Path resolves outside project root"));
        };
        self.reject_blocked(real_relative, path)?;

        Ok(ResolvedPath {
            absolute,
            relative,
            real,
        })
    }

    /// Checks the extension of a validated path.
    ///
    /// Both the requested name and the symlink target must pass, so a link
    /// cannot expose a file type the sandbox refuses. A name without an
    /// extension always passes. Dotfiles such as `.gitignore` have no
    /// extension in this sense.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] if either extension is not allowed.
    pub fn validate_extension(&self, path: &ResolvedPath) -> Result<()> {
        self.check_extension(path.as_path(), path)?;
        self.check_extension(path.real_path(), path)
    }

    fn check_extension(&self, candidate: &Path, path: &ResolvedPath) -> Result<()> {
        let Some(extension) = candidate.extension() else {
            return Ok(());
        };
        let extension = extension.to_string_lossy();
        if self.config.is_extension_allowed(&extension) {
            Ok(())
        } else {
            tracing::warn!(path = %path.display_relative(), %extension, "rejected extension");
            Err(Error::access_denied(format!(
                ".{} files are not allowed",
                extension.to_ascii_lowercase()
            )))
        }
    }

    /// Returns `true` if a file with this name passes the extension check.
    #[must_use]
    pub fn is_file_name_allowed(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .is_none_or(|ext| self.config.is_extension_allowed(&ext.to_string_lossy()))
    }

    fn reject_blocked(&self, relative: &Path, original: &str) -> Result<()> {
        for component in relative.components() {
            if let Component::Normal(segment) = component {
                let segment = segment.to_string_lossy();
                if self.config.is_blocked(&segment) {
                    tracing::warn!(path = original, %segment, "rejected blocked directory");
                    return Err(Error::access_denied(format!(
                        "{segment} is a blocked directory"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Formats a root-relative path with `/` separators, `.` when empty.
pub(crate) fn to_display(relative: &Path) -> String {
    let joined = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Resolves `.` and `..` without touching the filesystem.
///
/// `..` at the filesystem root stays at the root, mirroring how the OS
/// resolves it.
fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                out.push(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
        }
    }
    out
}

/// Canonicalizes the deepest existing ancestor of `path` and re-appends the
/// components that do not exist yet.
///
/// A dangling symlink is reported as [`Error::NotFound`] under its
/// root-relative name.
fn resolve_real_path(path: &Path, relative: &Path) -> Result<PathBuf> {
    let mut existing = path;
    let mut pending = Vec::new();

    while existing.symlink_metadata().is_err() {
        let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
            break;
        };
        pending.push(name.to_os_string());
        existing = parent;
    }

    let mut real = existing.canonicalize().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound {
                resource: format!("{}: dangling symbolic link", to_display(relative)),
            }
        } else {
            Error::io(existing, e)
        }
    })?;
    for name in pending.into_iter().rev() {
        real.push(name);
    }
    Ok(real)
}

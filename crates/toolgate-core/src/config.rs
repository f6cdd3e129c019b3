//! Sandbox configuration for filesystem access.
//!
//! [`SandboxConfig`] fixes the project root, the blocked directory names and
//! the allowed file extensions for the whole process. It is built once at
//! startup, validated, and then shared read-only (typically behind an `Arc`)
//! by every provider that touches local storage.
//!
//! # Examples
//!
//! ```
//! use toolgate_core::SandboxConfig;
//! # let temp = tempfile::TempDir::new().unwrap();
//!
//! let config = SandboxConfig::builder()
//!     .root(temp.path())
//!     .block_dir("secrets")
//!     .allow_extension("log")
//!     .build()
//!     .unwrap();
//!
//! assert!(config.is_blocked("node_modules"));
//! assert!(config.is_blocked("secrets"));
//! assert!(config.is_extension_allowed(".LOG"));
//! ```

use crate::{Error, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Directory names that are never traversed, listed or exposed.
pub const DEFAULT_BLOCKED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    ".next",
    "dist",
    "build",
    "target",
    ".cache",
    "coverage",
    ".env",
    ".env.local",
];

/// Extensions permitted for read, write and delete.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    ".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs", ".json", ".md", ".mdx", ".txt", ".css", ".scss",
    ".html", ".yml", ".yaml", ".toml", ".py", ".rs", ".go", ".sh", ".svg", ".csv", ".xml",
];

/// Immutable sandbox configuration.
///
/// The root is canonicalized when the configuration is built, so every
/// containment check compares against a symlink-free absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxConfig {
    root: PathBuf,
    blocked_dirs: BTreeSet<String>,
    allowed_extensions: BTreeSet<String>,
}

impl SandboxConfig {
    /// Creates a new configuration builder with the default block/allow lists.
    #[must_use]
    pub fn builder() -> SandboxConfigBuilder {
        SandboxConfigBuilder::new()
    }

    /// Returns the canonical project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the blocked directory names.
    #[must_use]
    pub const fn blocked_dirs(&self) -> &BTreeSet<String> {
        &self.blocked_dirs
    }

    /// Returns the allowed extensions (lower case, with leading dot).
    #[must_use]
    pub const fn allowed_extensions(&self) -> &BTreeSet<String> {
        &self.allowed_extensions
    }

    /// Returns `true` if `name` is a blocked directory name.
    ///
    /// Matching is exact: `node_modules2` is not blocked by `node_modules`.
    #[must_use]
    pub fn is_blocked(&self, name: &str) -> bool {
        self.blocked_dirs.contains(name)
    }

    /// Returns `true` if `extension` is allowed.
    ///
    /// Accepts the extension with or without its leading dot, in any case.
    #[must_use]
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        self.allowed_extensions
            .contains(&normalize_extension(extension))
    }
}

/// Builder for [`SandboxConfig`].
#[derive(Debug, Clone)]
pub struct SandboxConfigBuilder {
    root: Option<PathBuf>,
    blocked_dirs: BTreeSet<String>,
    allowed_extensions: BTreeSet<String>,
}

impl SandboxConfigBuilder {
    /// Creates a builder seeded with [`DEFAULT_BLOCKED_DIRS`] and
    /// [`DEFAULT_ALLOWED_EXTENSIONS`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: None,
            blocked_dirs: DEFAULT_BLOCKED_DIRS.iter().map(ToString::to_string).collect(),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
        }
    }

    /// Sets the project root.
    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Adds a blocked directory name.
    #[must_use]
    pub fn block_dir(mut self, name: impl Into<String>) -> Self {
        self.blocked_dirs.insert(name.into());
        self
    }

    /// Replaces the blocked directory names.
    #[must_use]
    pub fn blocked_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_dirs = names.into_iter().map(Into::into).collect();
        self
    }

    /// Adds an allowed extension (leading dot optional).
    #[must_use]
    pub fn allow_extension(mut self, extension: &str) -> Self {
        self.allowed_extensions.insert(normalize_extension(extension));
        self
    }

    /// Replaces the allowed extensions.
    #[must_use]
    pub fn allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if:
    /// - No root was set
    /// - The root does not exist or is not a directory
    /// - A blocked name is empty or contains a path separator
    pub fn build(self) -> Result<SandboxConfig> {
        let root = self.root.ok_or_else(|| Error::ConfigError {
            message: "project root is not set".to_string(),
        })?;

        let root = root.canonicalize().map_err(|e| Error::ConfigError {
            message: format!("cannot resolve project root {}: {e}", root.display()),
        })?;

        if !root.is_dir() {
            return Err(Error::ConfigError {
                message: format!("project root {} is not a directory", root.display()),
            });
        }

        if let Some(bad) = self
            .blocked_dirs
            .iter()
            .find(|name| name.is_empty() || name.contains(['/', '\\']))
        {
            return Err(Error::ConfigError {
                message: format!("blocked directory '{bad}' must be a single path segment"),
            });
        }

        tracing::debug!(
            root = %root.display(),
            blocked = self.blocked_dirs.len(),
            extensions = self.allowed_extensions.len(),
            "sandbox configured"
        );

        Ok(SandboxConfig {
            root,
            blocked_dirs: self.blocked_dirs,
            allowed_extensions: self.allowed_extensions,
        })
    }
}

impl Default for SandboxConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_extension(extension: &str) -> String {
    let lower = extension.trim().to_ascii_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}

//! Recursive name and content search.
//!
//! The walk prunes blocked names before descending, never follows symbolic
//! links, and swallows per-file read errors so one unreadable file cannot
//! abort the whole search. All matches are collected, then only the first
//! [`SEARCH_RESULT_LIMIT`] are returned alongside the true total.

use crate::FilesystemProvider;
use crate::filesystem::{join_error, not_found_or_io};
use crate::types::{MatchKind, SearchMatch, SearchResult, timestamp};
use crate::validator::to_display;
use std::path::Path;
use toolgate_core::{Error, Result, SandboxConfig};
use walkdir::{DirEntry, WalkDir};

/// Maximum number of matches returned by one search.
pub const SEARCH_RESULT_LIMIT: usize = 50;

/// Extensions whose content is scanned for the query.
pub const SEARCHABLE_EXTENSIONS: &[&str] = &[
    ".js", ".jsx", ".ts", ".tsx", ".json", ".md", ".txt", ".css", ".html", ".yml", ".yaml",
    ".toml", ".py", ".rs",
];

impl FilesystemProvider {
    /// Searches file names and text content below `path`.
    ///
    /// A file whose name contains the query (case-insensitive) yields a
    /// filename match; otherwise, if it has a searchable and allowed
    /// extension, a content match when its text contains the query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty query or a path that
    /// is not a directory, [`Error::AccessDenied`] if validation fails, or
    /// [`Error::NotFound`] if the path does not exist.
    pub async fn search(&self, query: &str, path: &str) -> Result<SearchResult> {
        if query.trim().is_empty() {
            return Err(Error::InvalidArgument("query must not be empty".to_string()));
        }

        let resolved = self.validator.validate(path)?;
        let metadata = tokio::fs::metadata(resolved.as_path())
            .await
            .map_err(|e| not_found_or_io(&resolved, e))?;
        if !metadata.is_dir() {
            return Err(Error::InvalidArgument(format!(
                "search path must be a directory: {}",
                resolved.display_relative()
            )));
        }

        let config = self.validator.config().clone();
        let start = resolved.as_path().to_path_buf();
        let needle = query.to_lowercase();
        let mut matches = tokio::task::spawn_blocking(move || {
            collect_matches(&config, &start, &needle)
        })
        .await
        .map_err(|e| join_error(resolved.as_path(), &e))?;

        let total_found = matches.len();
        matches.truncate(SEARCH_RESULT_LIMIT);

        tracing::debug!(
            provider = %self.name,
            query,
            path = %resolved.display_relative(),
            total_found,
            "search finished"
        );

        Ok(SearchResult {
            message: if total_found > SEARCH_RESULT_LIMIT {
                format!("Found {total_found} matches, showing first {SEARCH_RESULT_LIMIT}")
            } else {
                format!("Found {total_found} matches")
            },
            query: query.to_string(),
            results: matches,
            total_found,
        })
    }
}

/// Walks `start` and returns every match in walk order (sorted by name).
fn collect_matches(config: &SandboxConfig, start: &Path, needle: &str) -> Vec<SearchMatch> {
    WalkDir::new(start)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_blocked(config, entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::trace!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| match_entry(config, &entry, needle))
        .collect()
}

fn is_blocked(config: &SandboxConfig, entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| config.is_blocked(name))
}

fn match_entry(config: &SandboxConfig, entry: &DirEntry, needle: &str) -> Option<SearchMatch> {
    let name = entry.file_name().to_string_lossy().into_owned();

    let match_kind = if name.to_lowercase().contains(needle) {
        MatchKind::Filename
    } else if is_content_searchable(config, entry.path()) && content_contains(entry.path(), needle)
    {
        MatchKind::Content
    } else {
        return None;
    };

    let metadata = entry.metadata().ok();
    let relative = entry
        .path()
        .strip_prefix(config.root())
        .unwrap_or_else(|_| entry.path());

    Some(SearchMatch {
        path: to_display(relative),
        name,
        match_kind,
        size: metadata.as_ref().map_or(0, std::fs::Metadata::len),
        modified_at: metadata.and_then(|m| timestamp(m.modified())),
    })
}

fn is_content_searchable(config: &SandboxConfig, path: &Path) -> bool {
    let Some(extension) = path.extension() else {
        return false;
    };
    let extension = format!(".{}", extension.to_string_lossy().to_ascii_lowercase());
    SEARCHABLE_EXTENSIONS.contains(&extension.as_str()) && config.is_extension_allowed(&extension)
}

fn content_contains(path: &Path, needle: &str) -> bool {
    match std::fs::read_to_string(path) {
        Ok(content) => content.to_lowercase().contains(needle),
        Err(e) => {
            tracing::trace!(path = %path.display(), error = %e, "skipping unreadable file");
            false
        }
    }
}

//! Sandboxed local filesystem provider.
//!
//! Every operation takes a caller-supplied path, validates it against an
//! immutable [`SandboxConfig`](toolgate_core::SandboxConfig) and only then
//! touches storage. Validation confines paths to the project root (through
//! symbolic links too), rejects any blocked directory segment and, for
//! operations on file content, enforces the extension allowlist.
//!
//! # Features
//!
//! - **Path validation**: lexical normalization plus real-path resolution
//! - **CRUD**: read, atomic write, list, mkdir, file-only delete, stat
//! - **Search**: filename and content matches, capped result list
//! - **Structure**: depth-limited tree export
//! - **Routing**: a closed [`FsRoute`] enum behind the `Provider` trait
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use std::sync::Arc;
//! use toolgate_core::traits::Provider;
//! use toolgate_core::{Method, RouteKey, SandboxConfig};
//! use toolgate_files::FilesystemProvider;
//! # use tempfile::TempDir;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> toolgate_core::Result<()> {
//! # let temp = TempDir::new().unwrap();
//! let config = Arc::new(SandboxConfig::builder().root(temp.path()).build()?);
//! let fs = FilesystemProvider::new(config);
//!
//! let route = RouteKey::new(Method::Post, "/write");
//! fs.handle_request(&route, json!({ "path": "notes.md", "content": "hi" }))
//!     .await?;
//!
//! let route = RouteKey::new(Method::Post, "/read");
//! let err = fs
//!     .handle_request(&route, json!({ "path": "../../etc/passwd" }))
//!     .await
//!     .unwrap_err();
//! assert!(err.is_access_denied());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod filesystem;
pub mod routes;
pub mod search;
pub mod tree;
pub mod types;
pub mod validator;

pub use filesystem::FilesystemProvider;
pub use routes::FsRoute;
pub use search::{SEARCH_RESULT_LIMIT, SEARCHABLE_EXTENSIONS};
pub use tree::{DEFAULT_STRUCTURE_DEPTH, MAX_STRUCTURE_DEPTH};
pub use types::{
    DirectoryEntry, EntryKind, ListResult, MatchKind, PathResult, ReadResult, SearchMatch,
    SearchResult, StatResult, StructureResult, TreeNode, WriteResult,
};
pub use validator::{PathValidator, ResolvedPath};

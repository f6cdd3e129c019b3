//! Route table of the filesystem provider.

use crate::FilesystemProvider;
use crate::tree::DEFAULT_STRUCTURE_DEPTH;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolgate_core::traits::{Provider, RouteTable};
use toolgate_core::{Error, Method, ProviderName, Result, RouteKey, parse_args};

/// Operations of the filesystem provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsRoute {
    /// `POST:/read`
    Read,
    /// `POST:/write`
    Write,
    /// `POST:/list`, alias `GET:/list`
    List,
    /// `POST:/mkdir`
    Mkdir,
    /// `POST:/delete`, alias `DELETE:/delete`
    Delete,
    /// `POST:/stat`
    Stat,
    /// `POST:/search`
    Search,
    /// `POST:/structure`, alias `GET:/structure`
    Structure,
}

impl RouteTable for FsRoute {
    const ALL: &'static [Self] = &[
        Self::Read,
        Self::Write,
        Self::List,
        Self::Mkdir,
        Self::Delete,
        Self::Stat,
        Self::Search,
        Self::Structure,
    ];

    fn spec(self) -> &'static [(Method, &'static str)] {
        match self {
            Self::Read => &[(Method::Post, "/read")],
            Self::Write => &[(Method::Post, "/write")],
            Self::List => &[(Method::Post, "/list"), (Method::Get, "/list")],
            Self::Mkdir => &[(Method::Post, "/mkdir")],
            Self::Delete => &[(Method::Post, "/delete"), (Method::Delete, "/delete")],
            Self::Stat => &[(Method::Post, "/stat")],
            Self::Search => &[(Method::Post, "/search")],
            Self::Structure => &[(Method::Post, "/structure"), (Method::Get, "/structure")],
        }
    }
}

#[derive(Debug, Deserialize)]
struct PathArgs {
    path: String,
}

#[derive(Debug, Deserialize)]
struct OptionalPathArgs {
    #[serde(default = "root_path")]
    path: String,
}

#[derive(Debug, Deserialize)]
struct WriteArgs {
    path: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default = "root_path")]
    path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructureArgs {
    #[serde(default = "default_depth", alias = "max_depth")]
    max_depth: usize,
    #[serde(default = "root_path")]
    path: String,
}

fn root_path() -> String {
    ".".to_string()
}

const fn default_depth() -> usize {
    DEFAULT_STRUCTURE_DEPTH
}

fn to_value<T: Serialize>(result: &T) -> Result<Value> {
    Ok(serde_json::to_value(result)?)
}

impl FilesystemProvider {
    async fn dispatch(&self, route: FsRoute, body: Value) -> Result<Value> {
        match route {
            FsRoute::Read => {
                let args: PathArgs = parse_args(body)?;
                to_value(&self.read(&args.path).await?)
            }
            FsRoute::Write => {
                let args: WriteArgs = parse_args(body)?;
                to_value(&self.write(&args.path, &args.content).await?)
            }
            FsRoute::List => {
                let args: OptionalPathArgs = parse_args(body)?;
                to_value(&self.list(&args.path).await?)
            }
            FsRoute::Mkdir => {
                let args: PathArgs = parse_args(body)?;
                to_value(&self.mkdir(&args.path).await?)
            }
            FsRoute::Delete => {
                let args: PathArgs = parse_args(body)?;
                to_value(&self.delete(&args.path).await?)
            }
            FsRoute::Stat => {
                let args: PathArgs = parse_args(body)?;
                to_value(&self.stat(&args.path).await?)
            }
            FsRoute::Search => {
                let args: SearchArgs = parse_args(body)?;
                to_value(&self.search(&args.query, &args.path).await?)
            }
            FsRoute::Structure => {
                let args: StructureArgs = parse_args(body)?;
                to_value(&self.structure(args.max_depth, &args.path).await?)
            }
        }
    }
}

#[async_trait]
impl Provider for FilesystemProvider {
    fn name(&self) -> &ProviderName {
        &self.name
    }

    async fn handle_request(&self, route: &RouteKey, body: Value) -> Result<Value> {
        let resolved =
            FsRoute::resolve(route).ok_or_else(|| route.not_found(self.name.as_str()))?;
        tracing::debug!(provider = %self.name, %route, "handling request");

        let result = self.dispatch(resolved, body).await;
        if let Err(e) = &result {
            match e {
                Error::AccessDenied { .. } | Error::PermissionDenied { .. } => {
                    tracing::warn!(provider = %self.name, %route, error = %e, "request rejected");
                }
                Error::Io { .. } => {
                    tracing::error!(provider = %self.name, %route, error = %e, "request failed");
                }
                _ => tracing::debug!(provider = %self.name, %route, error = %e, "request failed"),
            }
        }
        result
    }

    fn is_healthy(&self) -> bool {
        true
    }

    fn routes(&self) -> Vec<RouteKey> {
        FsRoute::keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;
    use toolgate_core::SandboxConfig;

    fn provider(temp: &TempDir) -> FilesystemProvider {
        let config = SandboxConfig::builder().root(temp.path()).build().unwrap();
        FilesystemProvider::new(Arc::new(config))
    }

    fn key(method: Method, path: &str) -> RouteKey {
        RouteKey::new(method, path)
    }

    #[test]
    fn test_route_resolution() {
        assert_eq!(FsRoute::resolve(&key(Method::Post, "/read")), Some(FsRoute::Read));
        assert_eq!(FsRoute::resolve(&key(Method::Get, "/list")), Some(FsRoute::List));
        assert_eq!(FsRoute::resolve(&key(Method::Delete, "/delete")), Some(FsRoute::Delete));
        assert_eq!(FsRoute::resolve(&key(Method::Get, "/read")), None);
        assert_eq!(FsRoute::resolve(&key(Method::Post, "/chmod")), None);
    }

    #[test]
    fn test_route_keys_include_aliases() {
        let keys: Vec<String> = FsRoute::keys().iter().map(ToString::to_string).collect();
        assert_eq!(keys.len(), 11);
        assert!(keys.contains(&"GET:/structure".to_string()));
        assert!(keys.contains(&"DELETE:/delete".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_route_is_route_not_found() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);

        let err = fs
            .handle_request(&key(Method::Post, "/chmod"), json!({}))
            .await
            .unwrap_err();
        assert!(err.is_route_not_found());
        assert_eq!(
            err.to_string(),
            "Route not found for provider 'filesystem': POST:/chmod"
        );
    }

    #[tokio::test]
    async fn test_write_and_read_through_routes() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);

        let written = fs
            .handle_request(
                &key(Method::Post, "/write"),
                json!({ "path": "a.md", "content": "hello" }),
            )
            .await
            .unwrap();
        assert_eq!(written["path"], "a.md");
        assert_eq!(written["size"], 5);

        let read = fs
            .handle_request(&key(Method::Post, "/read"), json!({ "path": "a.md" }))
            .await
            .unwrap();
        assert_eq!(read["content"], "hello");
        assert!(read["message"].is_string());
    }

    #[tokio::test]
    async fn test_missing_argument_is_invalid_argument() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);

        let err = fs
            .handle_request(&key(Method::Post, "/write"), json!({ "path": "a.md" }))
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("content"));
    }

    #[tokio::test]
    async fn test_optional_arguments_default() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("notes.md"), "").unwrap();
        let fs = provider(&temp);

        let listed = fs
            .handle_request(&key(Method::Get, "/list"), Value::Null)
            .await
            .unwrap();
        assert_eq!(listed["totalItems"], 1);

        let structure = fs
            .handle_request(&key(Method::Get, "/structure"), json!({}))
            .await
            .unwrap();
        assert_eq!(structure["maxDepth"], DEFAULT_STRUCTURE_DEPTH);
        assert_eq!(structure["structure"]["children"][0]["name"], "notes.md");
    }

    #[tokio::test]
    async fn test_structure_accepts_snake_case_depth() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);

        let structure = fs
            .handle_request(&key(Method::Post, "/structure"), json!({ "max_depth": 1 }))
            .await
            .unwrap();
        assert_eq!(structure["maxDepth"], 1);
    }

    #[tokio::test]
    async fn test_errors_propagate_unchanged() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);

        let err = fs
            .handle_request(&key(Method::Post, "/read"), json!({ "path": "../../etc/passwd" }))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Access denied: Path is outside project root");
    }

    #[test]
    fn test_always_healthy() {
        let temp = TempDir::new().unwrap();
        let fs = provider(&temp);
        assert!(fs.is_healthy());
        assert_eq!(fs.name().as_str(), "filesystem");
        assert_eq!(fs.routes().len(), 11);
    }
}

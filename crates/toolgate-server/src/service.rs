//! MCP service exposing the dispatcher as tools.
//!
//! The `ToolgateService` provides two tools:
//! 1. `call_provider` - Forward one request to a named provider
//! 2. `provider_health` - Report which providers hold their credentials

use crate::Dispatcher;
use crate::types::{CallProviderParams, ProviderHealthParams, ProviderHealthResult};
use rmcp::handler::server::ServerHandler;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{ErrorData as McpError, tool, tool_handler, tool_router};
use serde::Serialize;
use serde_json::Value;
use toolgate_core::{Error, Method};

/// MCP server over the provider dispatcher.
///
/// # Examples
///
/// ```no_run
/// use rmcp::ServiceExt;
/// use rmcp::transport::stdio;
/// use toolgate_server::{Dispatcher, ToolgateService};
///
/// # async fn example() -> anyhow::Result<()> {
/// let service = ToolgateService::new(Dispatcher::builder().build())
///     .serve(stdio())
///     .await?;
/// service.waiting().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolgateService {
    /// Provider registry
    dispatcher: Dispatcher,

    /// Tool router for MCP protocol
    tool_router: ToolRouter<Self>,
}

impl ToolgateService {
    /// Creates a service over the given dispatcher.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            tool_router: Self::tool_router(),
        }
    }

    /// Returns the dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

#[tool_router]
impl ToolgateService {
    /// Forward a request to a provider.
    #[tool(
        description = "Call a provider route. Providers: filesystem (POST /read, /write, /list, /mkdir, /delete, /stat, /search, /structure), github (GET /user, /repos; POST /repo, /issues, /issues/create, /pulls, /contents, /commits), figma (GET /me; POST /file, /nodes, /images, /comments, /comments/create, /projects, /components). Arguments go in body."
    )]
    async fn call_provider(
        &self,
        Parameters(params): Parameters<CallProviderParams>,
    ) -> Result<CallToolResult, McpError> {
        let method: Method = params.method.parse().map_err(|e| to_mcp_error(&e))?;
        let body = params.body.unwrap_or(Value::Null);

        let result = self
            .dispatcher
            .handle(&params.provider, method, &params.path, body)
            .await
            .map_err(|e| to_mcp_error(&e))?;

        json_result(&result)
    }

    /// Report provider health.
    #[tool(
        description = "Report which providers are usable. Remote providers are unhealthy when their access token is not configured."
    )]
    async fn provider_health(
        &self,
        Parameters(_params): Parameters<ProviderHealthParams>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&ProviderHealthResult {
            providers: self.dispatcher.health(),
        })
    }
}

#[tool_handler]
impl ServerHandler for ToolgateService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Sandboxed project filesystem plus GitHub and Figma APIs. \
                 Use call_provider with a provider name, method, route path and body; \
                 use provider_health to see which providers are configured."
                    .to_string(),
            ),
        }
    }
}

/// Maps a provider error onto an MCP error, keeping its message verbatim.
fn to_mcp_error(error: &Error) -> McpError {
    let message = error.to_string();
    if error.is_client_error() {
        McpError::invalid_params(message, None)
    } else if error.is_not_found() {
        McpError::resource_not_found(message, None)
    } else {
        tracing::error!(error = %message, "tool call failed");
        McpError::internal_error(message, None)
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(value).map_err(|e| {
            McpError::internal_error(format!("Failed to serialize result: {e}"), None)
        })?,
    )]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;
    use std::sync::Arc;
    use tempfile::TempDir;
    use toolgate_core::SandboxConfig;
    use toolgate_files::FilesystemProvider;
    use toolgate_remote::GithubProvider;

    fn service(temp: &TempDir) -> ToolgateService {
        let config = SandboxConfig::builder().root(temp.path()).build().unwrap();
        let dispatcher = Dispatcher::builder()
            .register(Arc::new(FilesystemProvider::new(Arc::new(config))))
            .register(Arc::new(GithubProvider::new(None).unwrap()))
            .build();
        ToolgateService::new(dispatcher)
    }

    fn params(
        provider: &str,
        method: &str,
        path: &str,
        body: Value,
    ) -> Parameters<CallProviderParams> {
        Parameters(CallProviderParams {
            provider: provider.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            body: Some(body),
        })
    }

    fn text(result: &CallToolResult) -> Value {
        let content = result.content[0].as_text().unwrap();
        serde_json::from_str(&content.text).unwrap()
    }

    #[test]
    fn test_get_info() {
        let temp = TempDir::new().unwrap();
        let info = service(&temp).get_info();

        assert_eq!(info.protocol_version, ProtocolVersion::V_2024_11_05);
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some());
    }

    #[tokio::test]
    async fn test_call_provider_write_and_read() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        service
            .call_provider(params(
                "filesystem",
                "post",
                "/write",
                serde_json::json!({ "path": "a.md", "content": "hi" }),
            ))
            .await
            .unwrap();
        let result = service
            .call_provider(params(
                "filesystem",
                "POST",
                "/read",
                serde_json::json!({ "path": "a.md" }),
            ))
            .await
            .unwrap();

        assert_eq!(text(&result)["content"], "hi");
    }

    #[tokio::test]
    async fn test_access_denied_is_invalid_params_with_raw_message() {
        let temp = TempDir::new().unwrap();
        let err = service(&temp)
            .call_provider(params(
                "filesystem",
                "POST",
                "/read",
                serde_json::json!({ "path": "../../etc/passwd" }),
            ))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, "Access denied: Path is outside project root");
    }

    #[tokio::test]
    async fn test_not_found_maps_to_resource_not_found() {
        let temp = TempDir::new().unwrap();
        let err = service(&temp)
            .call_provider(params(
                "filesystem",
                "POST",
                "/read",
                serde_json::json!({ "path": "missing.md" }),
            ))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_provider_and_method() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        let err = service
            .call_provider(params("slack", "POST", "/post", Value::Null))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

        let err = service
            .call_provider(params("filesystem", "TRACE", "/read", Value::Null))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unavailable_provider_is_internal_error() {
        let temp = TempDir::new().unwrap();
        let err = service(&temp)
            .call_provider(params("github", "GET", "/user", Value::Null))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert!(err.message.contains("GITHUB_TOKEN"));
    }

    #[tokio::test]
    async fn test_provider_health() {
        let temp = TempDir::new().unwrap();
        let result = service(&temp)
            .provider_health(Parameters(ProviderHealthParams::default()))
            .await
            .unwrap();

        let health = text(&result);
        assert_eq!(health["providers"]["filesystem"], true);
        assert_eq!(health["providers"]["github"], false);
    }
}

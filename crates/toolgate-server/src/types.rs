//! Parameter and result types of the MCP tools.
//!
//! - `call_provider`: forward one request to a provider
//! - `provider_health`: report which providers are usable

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parameters for `call_provider`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use toolgate_server::types::CallProviderParams;
///
/// let params: CallProviderParams = serde_json::from_value(json!({
///     "provider": "filesystem",
///     "method": "POST",
///     "path": "/read",
///     "body": { "path": "README.md" }
/// }))
/// .unwrap();
/// assert_eq!(params.path, "/read");
/// ```
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CallProviderParams {
    /// Provider name: "filesystem", "github" or "figma"
    pub provider: String,

    /// Request method, e.g. "GET" or "POST"
    pub method: String,

    /// Logical route within the provider, e.g. "/read" or "/issues/create"
    pub path: String,

    /// Route arguments, e.g. {"path": "src/main.ts"} for filesystem reads
    #[serde(default)]
    pub body: Option<Value>,
}

/// Parameters for `provider_health` (none).
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ProviderHealthParams {}

/// Result of `provider_health`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProviderHealthResult {
    /// Health flag per provider name
    pub providers: BTreeMap<String, bool>,
}

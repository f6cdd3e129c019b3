//! Strong domain types for toolgate.
//!
//! Provider names, HTTP-style methods and route keys are newtypes or enums
//! rather than bare strings so that the dispatcher cannot confuse a logical
//! route with a filesystem path carried in a request body.
//!
//! # Examples
//!
//! ```
//! use toolgate_core::{Method, ProviderName, RouteKey};
//!
//! let provider = ProviderName::new("filesystem");
//! let route = RouteKey::new(Method::Post, "read");
//! assert_eq!(provider.as_str(), "filesystem");
//! assert_eq!(route.to_string(), "POST:/read");
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Provider identifier (newtype over String).
///
/// # Examples
///
/// ```
/// use toolgate_core::ProviderName;
///
/// let name = ProviderName::new("github");
/// assert_eq!(name.to_string(), "github");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderName(String);

impl ProviderName {
    /// Creates a new provider name.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the provider name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ProviderName` and returns the inner `String`.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProviderName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProviderName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for ProviderName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Request method of a tool call.
///
/// Parsed case-insensitively; always displayed in upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(Error::InvalidArgument(format!(
                "unsupported method '{other}'"
            ))),
        }
    }
}

/// A `METHOD:/logical-path` route key.
///
/// The logical path always starts with a single `/`; trailing slashes are
/// dropped, so `"read"`, `"/read"` and `"/read/"` name the same route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    method: Method,
    path: String,
}

impl RouteKey {
    /// Creates a route key, normalizing the logical path.
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        let trimmed = path.trim().trim_matches('/');
        Self {
            method,
            path: format!("/{trimmed}"),
        }
    }

    /// Returns the method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Returns the normalized logical path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Builds the error reported when `provider` has no handler for this key.
    #[must_use]
    pub fn not_found(&self, provider: impl Into<String>) -> Error {
        Error::RouteNotFound {
            provider: provider.into(),
            route: self.to_string(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.method, self.path)
    }
}

/// Inbound tool call as received from a client.
///
/// `path` is the logical route (`/read`, `/list`), distinct from any
/// filesystem path carried inside `body`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Request method
    pub method: Method,
    /// Logical route path
    pub path: String,
    /// Operation arguments
    #[serde(default = "empty_body")]
    pub body: serde_json::Value,
}

impl ToolRequest {
    /// Returns the route key of this request.
    #[must_use]
    pub fn route(&self) -> RouteKey {
        RouteKey::new(self.method, &self.path)
    }
}

fn empty_body() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let name = ProviderName::new("figma");
        assert_eq!(name.as_str(), "figma");
        assert_eq!(name.clone().into_inner(), "figma");
        assert_eq!(ProviderName::from("figma"), name);
    }

    #[test]
    fn test_method_parse_case_insensitive() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("Post".parse::<Method>().unwrap(), Method::Post);
        assert_eq!(" DELETE ".parse::<Method>().unwrap(), Method::Delete);
    }

    #[test]
    fn test_method_parse_rejects_unknown() {
        let err = "TRACE".parse::<Method>().unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_route_key_normalization() {
        assert_eq!(RouteKey::new(Method::Post, "read").path(), "/read");
        assert_eq!(RouteKey::new(Method::Post, "/read/").path(), "/read");
        assert_eq!(RouteKey::new(Method::Post, "/issues/create").path(), "/issues/create");
        assert_eq!(RouteKey::new(Method::Get, "").path(), "/");
    }

    #[test]
    fn test_route_key_display() {
        let key = RouteKey::new(Method::Get, "/list");
        assert_eq!(key.to_string(), "GET:/list");
    }

    #[test]
    fn test_route_key_not_found_error() {
        let err = RouteKey::new(Method::Put, "/nope").not_found("filesystem");
        match err {
            Error::RouteNotFound { provider, route } => {
                assert_eq!(provider, "filesystem");
                assert_eq!(route, "PUT:/nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_tool_request_deserialize_defaults_body() {
        let request: ToolRequest =
            serde_json::from_str(r#"{"method":"POST","path":"/list"}"#).unwrap();
        assert_eq!(request.method, Method::Post);
        assert!(request.body.as_object().unwrap().is_empty());
        assert_eq!(request.route().to_string(), "POST:/list");
    }
}

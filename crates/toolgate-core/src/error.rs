//! Error types for toolgate.
//!
//! Every provider reports failures through [`Error`]. The `Display` text of
//! each variant is the message callers receive; the dispatcher never rewrites
//! it.
//!
//! # Examples
//!
//! ```
//! use toolgate_core::{Error, Result};
//!
//! fn check_depth(depth: usize) -> Result<usize> {
//!     if depth > 10 {
//!         return Err(Error::InvalidArgument("maxDepth must be at most 10".to_string()));
//!     }
//!     Ok(depth)
//! }
//!
//! assert!(check_depth(3).is_ok());
//! assert!(check_depth(11).unwrap_err().is_invalid_argument());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for toolgate.
///
/// All providers and the dispatcher share this type so that a caller sees a
/// consistent taxonomy regardless of which provider served the request.
#[derive(Error, Debug)]
pub enum Error {
    /// Access to a path was refused by the sandbox.
    ///
    /// Raised when a path escapes the project root, touches a blocked
    /// directory, or uses a disallowed extension. Always a client-input
    /// problem; never retried.
    #[error("Access denied: {reason}")]
    AccessDenied {
        /// Why access was refused
        reason: String,
    },

    /// The requested file, directory or remote resource does not exist.
    #[error("Not found: {resource}")]
    NotFound {
        /// Identifier of the missing resource
        resource: String,
    },

    /// The operation is structurally disallowed, regardless of OS permissions.
    ///
    /// Deleting a directory is the canonical example.
    #[error("Permission denied: {reason}")]
    PermissionDenied {
        /// Why the operation is disallowed
        reason: String,
    },

    /// The provider has no handler for the requested `METHOD:/path`.
    #[error("Route not found for provider '{provider}': {route}")]
    RouteNotFound {
        /// Provider that was asked to handle the route
        provider: String,
        /// The unresolved route, formatted as `METHOD:/path`
        route: String,
    },

    /// No provider is registered under the requested name.
    #[error("Provider not found: {provider}")]
    ProviderNotFound {
        /// Requested provider name
        provider: String,
    },

    /// The provider exists but lacks the credentials or state it needs.
    #[error("Provider '{provider}' is unavailable: {reason}")]
    ProviderUnavailable {
        /// Provider name
        provider: String,
        /// What is missing
        reason: String,
    },

    /// A request body field is missing or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An underlying storage operation failed.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// Path the operation was working on
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A remote API call failed.
    #[error("{provider} API error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Remote {
        /// Provider that issued the call
        provider: String,
        /// HTTP status, when a response was received
        status: Option<u16>,
        /// Description of the failure
        message: String,
    },

    /// Configuration is invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// JSON conversion failed.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Description of the serialization failure
        message: String,
        /// Underlying serde error
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl Error {
    /// Creates an [`Error::AccessDenied`] with the given reason.
    #[must_use]
    pub fn access_denied(reason: impl Into<String>) -> Self {
        Self::AccessDenied {
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::Io`] for the given path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this is an access denied error.
    ///
    /// # Examples
    ///
    /// ```
    /// use toolgate_core::Error;
    ///
    /// let err = Error::access_denied("Path is outside project root");
    /// assert!(err.is_access_denied());
    /// ```
    #[must_use]
    pub const fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a permission denied error.
    #[must_use]
    pub const fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Returns `true` if this is a route not found error.
    #[must_use]
    pub const fn is_route_not_found(&self) -> bool {
        matches!(self, Self::RouteNotFound { .. })
    }

    /// Returns `true` if this is a provider not found error.
    #[must_use]
    pub const fn is_provider_not_found(&self) -> bool {
        matches!(self, Self::ProviderNotFound { .. })
    }

    /// Returns `true` if the provider is missing credentials.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable { .. })
    }

    /// Returns `true` if this is an invalid argument error.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Returns `true` if this is an I/O error.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns `true` if this is a remote API error.
    #[must_use]
    pub const fn is_remote_error(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if the failure was caused by the caller's input.
    ///
    /// Client errors are never worth retrying.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied { .. }
                | Self::PermissionDenied { .. }
                | Self::RouteNotFound { .. }
                | Self::ProviderNotFound { .. }
                | Self::InvalidArgument(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::SerializationError {
            message: source.to_string(),
            source: Some(source),
        }
    }
}

/// Result type alias for toolgate operations.
pub type Result<T> = std::result::Result<T, Error>;

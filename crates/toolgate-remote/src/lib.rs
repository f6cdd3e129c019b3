//! Remote API providers for toolgate.
//!
//! [`GithubProvider`] and [`FigmaProvider`] expose a fixed set of REST calls
//! behind the same `Provider` contract as the local filesystem, so the
//! dispatcher treats all three alike. Both share an [`ApiClient`] that
//! attaches the access token, applies a request timeout and maps HTTP
//! failures onto `toolgate_core::Error`.
//!
//! Tokens are held as [`secrecy::SecretString`] and never logged. A provider
//! without a token still registers; it reports unhealthy and answers every
//! call with `ProviderUnavailable`.
//!
//! # Examples
//!
//! ```
//! use toolgate_core::traits::Provider;
//! use toolgate_remote::GithubProvider;
//!
//! let github = GithubProvider::new(None).unwrap();
//! assert!(!github.is_healthy());
//! assert_eq!(github.name().as_str(), "github");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod client;
pub mod figma;
pub mod github;

pub use client::{ApiClient, AuthScheme, REQUEST_TIMEOUT};
pub use figma::{FIGMA_API_URL, FIGMA_TOKEN_ENV, FigmaProvider, FigmaRoute};
pub use github::{GITHUB_API_URL, GITHUB_TOKEN_ENV, GithubProvider, GithubRoute};

use toolgate_core::{Error, Result};

/// Checks that a caller-supplied value can stand as one URL path segment.
pub(crate) fn require_segment<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{field} must not be empty")));
    }
    if value.contains('/') || value == "." || value == ".." {
        return Err(Error::InvalidArgument(format!(
            "{field} must be a single path segment, got '{value}'"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_segment() {
        assert_eq!(require_segment("owner", " octo ").unwrap(), "octo");
        assert!(require_segment("owner", "").unwrap_err().is_invalid_argument());
        assert!(require_segment("owner", "a/b").is_err());
        assert!(require_segment("owner", "..").is_err());
    }
}

//! Provider trait.
//!
//! A provider wraps one capability domain (local files, a version-control
//! API, a design-tool API) behind the same request shape. Providers share
//! nothing else, which keeps the dispatcher agnostic of what they do.

use crate::{Method, ProviderName, Result, RouteKey};
use async_trait::async_trait;
use serde_json::Value;

/// A closed set of routes owned by one provider.
///
/// Implemented by a fieldless enum; [`RouteTable::resolve`] turns a
/// [`RouteKey`] into a variant so handlers can `match` exhaustively instead of
/// looking closures up by string.
///
/// # Examples
///
/// ```
/// use toolgate_core::{Method, RouteKey};
/// use toolgate_core::traits::RouteTable;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum EchoRoute {
///     Echo,
/// }
///
/// impl RouteTable for EchoRoute {
///     const ALL: &'static [Self] = &[Self::Echo];
///
///     fn spec(self) -> &'static [(Method, &'static str)] {
///         match self {
///             Self::Echo => &[(Method::Post, "/echo")],
///         }
///     }
/// }
///
/// let key = RouteKey::new(Method::Post, "echo");
/// assert_eq!(EchoRoute::resolve(&key), Some(EchoRoute::Echo));
/// assert_eq!(EchoRoute::resolve(&RouteKey::new(Method::Get, "echo")), None);
/// ```
pub trait RouteTable: Copy + Sized + 'static {
    /// Every route of the table.
    const ALL: &'static [Self];

    /// Method/path pairs bound to this route. The first pair is canonical.
    fn spec(self) -> &'static [(Method, &'static str)];

    /// Resolves a route key to a route, if any pair of any route matches.
    #[must_use]
    fn resolve(key: &RouteKey) -> Option<Self> {
        Self::ALL.iter().copied().find(|route| {
            route
                .spec()
                .iter()
                .any(|(method, path)| *method == key.method() && *path == key.path())
        })
    }

    /// Lists every registered route key, canonical pairs and aliases alike.
    #[must_use]
    fn keys() -> Vec<RouteKey> {
        Self::ALL
            .iter()
            .flat_map(|route| route.spec().iter())
            .map(|(method, path)| RouteKey::new(*method, path))
            .collect()
    }
}

/// A pluggable backend implementing the uniform tool-call contract.
///
/// # Type Safety
///
/// Implementations must be `Send + Sync` so one instance can serve concurrent
/// calls on the Tokio runtime.
#[async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// Name the dispatcher registers this provider under.
    fn name(&self) -> &ProviderName;

    /// Handles one call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RouteNotFound`](crate::Error::RouteNotFound) when the
    /// route is not registered, or the handler's own error otherwise.
    async fn handle_request(&self, route: &RouteKey, body: Value) -> Result<Value>;

    /// Returns `true` if the provider holds the credentials or state it needs.
    fn is_healthy(&self) -> bool;

    /// Lists the routes this provider answers.
    fn routes(&self) -> Vec<RouteKey>;
}

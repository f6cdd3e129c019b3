//! Provider registry and request dispatch.
//!
//! The dispatcher only selects a provider by name and forwards the call; it
//! performs no validation of its own. Route matching, argument decoding and
//! path sandboxing all live inside the providers.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use toolgate_core::traits::Provider;
use toolgate_core::{Error, Method, ProviderName, Result, RouteKey, ToolRequest};

/// Immutable set of registered providers.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use toolgate_remote::GithubProvider;
/// use toolgate_server::Dispatcher;
///
/// let dispatcher = Dispatcher::builder()
///     .register(Arc::new(GithubProvider::new(None).unwrap()))
///     .build();
///
/// assert_eq!(dispatcher.health().get("github"), Some(&false));
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    providers: Arc<BTreeMap<ProviderName, Arc<dyn Provider>>>,
}

impl Dispatcher {
    /// Creates a builder with no providers.
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Routes one call to the named provider.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProviderNotFound`] for an unknown provider, otherwise
    /// whatever the provider returns, unchanged.
    pub async fn handle(
        &self,
        provider: &str,
        method: Method,
        path: &str,
        body: Value,
    ) -> Result<Value> {
        let target = self
            .providers
            .get(provider)
            .ok_or_else(|| Error::ProviderNotFound {
                provider: provider.to_string(),
            })?;
        let route = RouteKey::new(method, path);

        tracing::debug!(provider, %route, "dispatching");
        target.handle_request(&route, body).await
    }

    /// Routes a [`ToolRequest`] to the named provider.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::handle`].
    pub async fn handle_request(&self, provider: &str, request: ToolRequest) -> Result<Value> {
        self.handle(provider, request.method, &request.path, request.body)
            .await
    }

    /// Reports the health of every provider, keyed by name.
    #[must_use]
    pub fn health(&self) -> BTreeMap<String, bool> {
        self.providers
            .iter()
            .map(|(name, provider)| (name.to_string(), provider.is_healthy()))
            .collect()
    }

    /// Lists the registered provider names in order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<&ProviderName> {
        self.providers.keys().collect()
    }

    /// Lists the routes of one provider, if registered.
    #[must_use]
    pub fn routes(&self, provider: &str) -> Option<Vec<RouteKey>> {
        self.providers.get(provider).map(|p| p.routes())
    }
}

/// Builder for [`Dispatcher`].
#[derive(Debug, Default)]
pub struct DispatcherBuilder {
    providers: BTreeMap<ProviderName, Arc<dyn Provider>>,
}

impl DispatcherBuilder {
    /// Registers a provider under its own name.
    ///
    /// Registering a second provider with the same name replaces the first.
    #[must_use]
    pub fn register(mut self, provider: Arc<dyn Provider>) -> Self {
        let name = provider.name().clone();
        tracing::debug!(provider = %name, healthy = provider.is_healthy(), "registering provider");
        if self.providers.insert(name.clone(), provider).is_some() {
            tracing::warn!(provider = %name, "provider registered twice; keeping the latest");
        }
        self
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            providers: Arc::new(self.providers),
        }
    }
}

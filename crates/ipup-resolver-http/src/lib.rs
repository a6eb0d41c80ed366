// # HTTP IP Resolver
//
// Queries an external "what is my IP" service over HTTP and validates the
// response as an IP address.
//
// ## Behavior
//
// One `HttpResolver` wraps one endpoint. The configured endpoint list is
// expressed as a `FallbackResolver` chain of these, tried in order; a
// malformed or empty body fails that endpoint only, and the chain moves on.
//
// Known-good public endpoints (plain-text body containing the address):
//
// - https://ipinfo.io/ip
// - https://checkip.amazonaws.com
// - https://api.ipify.org

use std::net::IpAddr;
use std::time::Duration;

use ipup_core::config::ResolverConfig;
use ipup_core::traits::{IpResolver, IpResolverFactory};
use ipup_core::{ComponentRegistry, Error, FallbackResolver, Result};

/// Resolver querying a single HTTP detection endpoint
pub struct HttpResolver {
    /// Endpoint URL returning the caller's address as text
    endpoint: String,

    /// HTTP client with a bounded per-request timeout
    client: reqwest::Client,
}

impl HttpResolver {
    /// Create a resolver for one endpoint with the given request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Build the ordered fallback chain for a list of endpoints
    pub fn chain(endpoints: &[String], timeout: Duration) -> Result<FallbackResolver> {
        let resolvers = endpoints
            .iter()
            .map(|endpoint| {
                HttpResolver::new(endpoint.clone(), timeout)
                    .map(|r| Box::new(r) as Box<dyn IpResolver>)
            })
            .collect::<Result<Vec<_>>>()?;

        FallbackResolver::new(resolvers)
    }
}

#[async_trait::async_trait]
impl IpResolver for HttpResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        tracing::debug!(endpoint = %self.endpoint, "querying detection endpoint");

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| Error::resolution(format!("request to {} failed: {}", self.endpoint, e)))?;

        if !response.status().is_success() {
            return Err(Error::resolution(format!(
                "{} returned HTTP {}",
                self.endpoint,
                response.status()
            )));
        }

        let body = response.text().await.map_err(|e| {
            Error::resolution(format!(
                "failed to read response from {}: {}",
                self.endpoint, e
            ))
        })?;

        let text = body.trim();
        if text.is_empty() {
            return Err(Error::resolution(format!(
                "{} returned an empty body",
                self.endpoint
            )));
        }

        text.parse().map_err(|_| {
            Error::resolution(format!(
                "{} returned a malformed address: {:?}",
                self.endpoint, text
            ))
        })
    }

    fn source_name(&self) -> &str {
        &self.endpoint
    }
}

/// Factory for creating HTTP resolver chains
pub struct HttpResolverFactory;

impl IpResolverFactory for HttpResolverFactory {
    fn create(&self, config: &ResolverConfig) -> Result<Box<dyn IpResolver>> {
        match config {
            ResolverConfig::Http {
                endpoints,
                timeout_secs,
            } => {
                let chain =
                    HttpResolver::chain(endpoints, Duration::from_secs(*timeout_secs))?;
                Ok(Box::new(chain))
            }
            _ => Err(Error::config("invalid config for HTTP resolver")),
        }
    }
}

/// Register the HTTP resolver with a registry
pub fn register(registry: &ComponentRegistry) {
    registry.register_resolver("http", Box::new(HttpResolverFactory));
}

//! Ordered fallback over several IP resolvers
//!
//! Detection services come and go, rate-limit, and occasionally return
//! garbage, so a single endpoint is never trusted to be the whole answer.
//! [`FallbackResolver`] tries an ordered list of resolvers and returns the
//! first well-formed result; a per-resolver failure is logged and the next
//! one is tried. Only exhausting the whole list is a resolution error.
//!
//! There is no retry within one call. Retry-across-time belongs to the
//! external scheduler: the next invocation is the retry.

use async_trait::async_trait;
use std::net::IpAddr;

use crate::Error;
use crate::traits::IpResolver;

/// Tries an ordered list of resolvers, first success wins
pub struct FallbackResolver {
    resolvers: Vec<Box<dyn IpResolver>>,
}

impl FallbackResolver {
    /// Create a fallback chain; the list must not be empty
    pub fn new(resolvers: Vec<Box<dyn IpResolver>>) -> Result<Self, Error> {
        if resolvers.is_empty() {
            return Err(Error::config("fallback resolver needs at least one resolver"));
        }
        Ok(Self { resolvers })
    }

    /// Number of resolvers in the chain
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Whether the chain is empty (never true for a constructed instance)
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

#[async_trait]
impl IpResolver for FallbackResolver {
    async fn resolve(&self) -> Result<IpAddr, Error> {
        for resolver in &self.resolvers {
            match resolver.resolve().await {
                Ok(ip) => {
                    tracing::info!(
                        source = resolver.source_name(),
                        %ip,
                        "resolved public IP"
                    );
                    return Ok(ip);
                }
                Err(e) => {
                    tracing::warn!(
                        source = resolver.source_name(),
                        error = %e,
                        "resolver failed, trying next"
                    );
                }
            }
        }

        Err(Error::resolution(format!(
            "all {} resolvers failed to return a valid address",
            self.resolvers.len()
        )))
    }

    fn source_name(&self) -> &str {
        "fallback"
    }
}

// # IP Resolver Trait
//
// Defines the interface for detecting the machine's current public IP
// address.
//
// ## Implementations
//
// - HTTP detection services: `ipup-resolver-http` crate
// - Ordered fallback over several resolvers: `crate::resolver::FallbackResolver`
//
// ## Responsibilities
//
// Resolvers answer exactly one question: "what is the public address right
// now?". They must not:
//
// - retry across time (the scheduler's next invocation is the retry)
// - compare against persisted state (owned by the cycle controller)
// - publish anything (owned by `Publisher`)
//
// A resolver that queries a remote service must bound the request with a
// timeout and treat a malformed or empty response as a resolution failure.

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for IP resolver implementations
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Determine the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: a validated, well-formed address
    /// - `Err(Error)`: if no valid address could be determined
    async fn resolve(&self) -> Result<IpAddr, crate::Error>;

    /// Name of this resolver (for logging/diagnosis)
    fn source_name(&self) -> &str;
}

/// Helper trait for constructing resolvers from configuration
pub trait IpResolverFactory: Send + Sync {
    /// Create an IpResolver instance from configuration
    fn create(
        &self,
        config: &crate::config::ResolverConfig,
    ) -> Result<Box<dyn IpResolver>, crate::Error>;
}

// # Publisher Trait
//
// Defines the interface for sending the current address to the configured
// destination (webhook, DNS update API, status endpoint, ...).
//
// ## Single-shot discipline
//
// Publishers execute ONE publish attempt per call and classify the outcome:
//
// - `Ok(PublishReceipt)` — the destination acknowledged the address
// - `Err(Error::PublishRetryable)` — transient failure (timeout, 5xx, rate
//   limiting); the cycle controller may try again within its retry budget
// - `Err(Error::PublishFatal)` — the destination rejected the request (auth,
//   client error, bad destination config); no further attempts this cycle
//
// Retry and backoff are owned by the cycle controller. A publisher that
// loops internally would take the retry rate out of the operator's hands and
// make the attempt-count properties untestable.

use async_trait::async_trait;
use std::net::IpAddr;

/// Acknowledgment returned by a successful publish
///
/// Exists only within one cycle; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PublishReceipt {
    /// Destination-assigned identifier or confirmation, if any
    pub confirmation: Option<String>,
}

impl PublishReceipt {
    /// Receipt carrying a destination-assigned confirmation
    pub fn with_confirmation(confirmation: impl Into<String>) -> Self {
        Self {
            confirmation: Some(confirmation.into()),
        }
    }
}

/// Trait for publisher implementations
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Send the address to the destination, once
    ///
    /// # Returns
    ///
    /// - `Ok(PublishReceipt)`: acknowledged by the destination
    /// - `Err(Error)`: classified as retryable or fatal (see module docs)
    async fn publish(&self, ip: IpAddr) -> Result<PublishReceipt, crate::Error>;

    /// Name of the destination (for logging/diagnosis)
    fn destination_name(&self) -> &str;
}

/// Helper trait for constructing publishers from configuration
pub trait PublisherFactory: Send + Sync {
    /// Create a Publisher instance from configuration
    fn create(
        &self,
        config: &crate::config::PublisherConfig,
    ) -> Result<Box<dyn Publisher>, crate::Error>;
}

//! Cycle controller
//!
//! One invocation runs exactly one cycle:
//!
//! ```text
//! START -> RESOLVING -> COMPARING -> PUBLISHING -> PERSISTING -> DONE
//!              |            |   \         |             |
//!              v            v    `-> DONE (unchanged)   v
//!           ABORTED      ABORTED          ABORTED    ABORTED
//! ```
//!
//! - Resolve the current public address; a resolution failure aborts with no
//!   state mutation.
//! - Load the persisted record; unreadable state aborts before any publish
//!   (never publish blindly over state that cannot be read).
//! - An unchanged address short-circuits straight to done — the common case
//!   on every scheduled tick, and the reason no redundant network call is
//!   made.
//! - Publish with a bounded retry budget for retryable failures only; a
//!   fatal failure or an exhausted budget aborts with the stored record
//!   untouched, so the next scheduled invocation retries the same target.
//! - Persist only after the destination has acknowledged. A save failure
//!   after a successful publish still aborts non-zero; the next cycle then
//!   re-publishes the same (now current) address, which destinations must
//!   treat as a harmless overwrite.

use std::fmt;
use std::net::IpAddr;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::CycleConfig;
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::traits::{IpResolver, PublishReceipt, Publisher, StateRecord, StateStore};

/// Capacity of the cycle event channel; one cycle emits a handful of events
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Step of the cycle in which an abort happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// Querying detection endpoints
    Resolving,
    /// Loading and comparing persisted state
    Comparing,
    /// Sending the address to the destination
    Publishing,
    /// Durably recording the acknowledged address
    Persisting,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CyclePhase::Resolving => "resolving",
            CyclePhase::Comparing => "comparing",
            CyclePhase::Publishing => "publishing",
            CyclePhase::Persisting => "persisting",
        };
        f.write_str(name)
    }
}

/// Events emitted while a cycle runs, for monitoring and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleEvent {
    /// A public address was resolved
    Resolved { ip: IpAddr },

    /// Address matches the stored record; nothing to publish
    Unchanged { ip: IpAddr },

    /// A publish attempt is starting (1-based attempt number)
    PublishAttempted { ip: IpAddr, attempt: usize },

    /// The destination acknowledged the address
    Published {
        ip: IpAddr,
        previous_ip: Option<IpAddr>,
        confirmation: Option<String>,
    },

    /// The new record is on durable storage
    Persisted { ip: IpAddr },

    /// The cycle aborted
    Aborted { phase: CyclePhase, reason: String },
}

/// Terminal result of a successful cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The address changed (or no prior record existed) and was published
    Published {
        ip: IpAddr,
        previous_ip: Option<IpAddr>,
    },

    /// The address matches the stored record; no publish attempted
    Unchanged { ip: IpAddr },
}

impl CycleOutcome {
    /// The resolved address this cycle observed
    pub fn ip(&self) -> IpAddr {
        match self {
            CycleOutcome::Published { ip, .. } | CycleOutcome::Unchanged { ip } => *ip,
        }
    }
}

/// Orchestrates one resolve → compare → publish → persist cycle
///
/// Prior state is an explicit value loaded from and returned to the
/// [`StateStore`] within `run_once`, never process-global, so the comparison
/// and update steps are testable with injected fakes.
pub struct CycleController {
    /// Resolver for the current public address
    resolver: Box<dyn IpResolver>,

    /// Destination for changed addresses
    publisher: Box<dyn Publisher>,

    /// Durable record of the last successful publish
    state_store: Box<dyn StateStore>,

    /// Publish retry budget and backoff schedule
    retry: RetryPolicy,

    /// Skip the unchanged short-circuit and publish regardless
    force: bool,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<CycleEvent>,
}

impl CycleController {
    /// Create a new cycle controller
    ///
    /// # Returns
    ///
    /// A tuple of (controller, event_receiver) where event_receiver yields
    /// [`CycleEvent`]s as the cycle progresses
    pub fn new(
        resolver: Box<dyn IpResolver>,
        publisher: Box<dyn Publisher>,
        state_store: Box<dyn StateStore>,
        config: &CycleConfig,
    ) -> Result<(Self, mpsc::Receiver<CycleEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let controller = Self {
            resolver,
            publisher,
            state_store,
            retry: config.retry_policy(),
            force: config.force,
            event_tx: tx,
        };

        Ok((controller, rx))
    }

    /// Run one full cycle
    ///
    /// # Returns
    ///
    /// - `Ok(CycleOutcome)`: the cycle reached DONE
    /// - `Err(Error)`: the cycle aborted; the error class identifies the
    ///   failed phase
    pub async fn run_once(&self) -> Result<CycleOutcome> {
        // RESOLVING
        let ip = match self.resolver.resolve().await {
            Ok(ip) => ip,
            Err(e) => return Err(self.abort(CyclePhase::Resolving, e)),
        };
        self.emit_event(CycleEvent::Resolved { ip });

        // COMPARING
        let prior = match self.state_store.load().await {
            Ok(prior) => prior,
            Err(e) => return Err(self.abort(CyclePhase::Comparing, e)),
        };
        let previous_ip = prior.as_ref().map(|r| r.last_published_ip);

        if previous_ip == Some(ip) && !self.force {
            info!(%ip, "address unchanged since last publish, nothing to do");
            self.emit_event(CycleEvent::Unchanged { ip });
            return Ok(CycleOutcome::Unchanged { ip });
        }

        match previous_ip {
            Some(previous) => debug!(%previous, current = %ip, "address changed"),
            None => debug!(current = %ip, "no prior record, first publish"),
        }

        // PUBLISHING
        let receipt = match self.publish_with_retry(ip).await {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.abort(CyclePhase::Publishing, e)),
        };
        self.emit_event(CycleEvent::Published {
            ip,
            previous_ip,
            confirmation: receipt.confirmation.clone(),
        });

        // PERSISTING
        let record = StateRecord::new(ip);
        if let Err(e) = self.state_store.save(&record).await {
            // Publish succeeded but the record did not update: the next cycle
            // re-publishes the same address, a safe redundancy.
            warn!(
                %ip,
                "publish acknowledged but state save failed; next cycle will republish"
            );
            return Err(self.abort(CyclePhase::Persisting, e));
        }
        self.emit_event(CycleEvent::Persisted { ip });

        info!(
            %ip,
            previous = ?previous_ip,
            destination = self.publisher.destination_name(),
            "published and recorded new address"
        );

        Ok(CycleOutcome::Published { ip, previous_ip })
    }

    /// Publish with the configured retry budget
    ///
    /// Only retryable failures consume the budget; a fatal failure returns
    /// immediately.
    async fn publish_with_retry(&self, ip: IpAddr) -> Result<PublishReceipt> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.emit_event(CycleEvent::PublishAttempted { ip, attempt });

            match self.publisher.publish(ip).await {
                Ok(receipt) => {
                    debug!(
                        %ip,
                        attempt,
                        confirmation = ?receipt.confirmation,
                        "destination acknowledged"
                    );
                    return Ok(receipt);
                }
                Err(e) if e.is_retryable() && self.retry.allows_retry_after(attempt) => {
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        %ip,
                        attempt,
                        max_attempts = self.retry.max_attempts(),
                        error = %e,
                        "publish attempt failed, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Log and emit an abort, passing the error back for propagation
    fn abort(&self, phase: CyclePhase, e: Error) -> Error {
        error!(%phase, error = %e, "cycle aborted");
        self.emit_event(CycleEvent::Aborted {
            phase,
            reason: e.to_string(),
        });
        e
    }

    /// Emit a cycle event, dropping it with a warning if the channel is full
    fn emit_event(&self, event: CycleEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("cycle event channel full, dropping event");
        }
    }
}

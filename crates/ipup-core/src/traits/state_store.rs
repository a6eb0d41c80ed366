// # State Store Trait
//
// Defines the interface for persisting the last successfully published
// address.
//
// ## Purpose
//
// The state store is what makes repeated invocations idempotent: the cycle
// controller compares the freshly resolved address against the stored record
// and skips publishing when they match.
//
// The record reflects the address as of the most recent SUCCESSFUL publish.
// It is never written speculatively before the destination has acknowledged,
// and a failed publish leaves it untouched so the next scheduled invocation
// retries against the same target.
//
// ## Implementations
//
// - File-based: `crate::state::FileStateStore` (durable, atomic writes)
// - In-memory: `crate::state::MemoryStateStore` (tests, embedding)

use async_trait::async_trait;
use std::net::IpAddr;

/// Durable record of the last successfully published address
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StateRecord {
    /// The last address the destination acknowledged
    pub last_published_ip: IpAddr,
    /// When that acknowledgment happened
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl StateRecord {
    /// Create a record stamped with the current time
    pub fn new(last_published_ip: IpAddr) -> Self {
        Self {
            last_published_ip,
            published_at: chrono::Utc::now(),
        }
    }
}

/// Trait for state store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks, even
/// though a single cycle only ever touches the store sequentially.
///
/// # Failure semantics
///
/// - `load` maps "no record yet" to `Ok(None)` — a valid first-run state.
///   Any other failure (unreadable file, corruption, permissions) is an
///   `Error::StateStore` and must abort the cycle before publishing.
/// - `save` must be atomic with respect to interruption: after a crash the
///   store holds either the previous record or the new one, never a torn
///   write.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the persisted record, if any
    ///
    /// # Returns
    ///
    /// - `Ok(Some(StateRecord))`: a prior publish is on record
    /// - `Ok(None)`: no record yet (first run)
    /// - `Err(Error)`: storage error other than absence
    async fn load(&self) -> Result<Option<StateRecord>, crate::Error>;

    /// Durably replace the record
    ///
    /// # Returns
    ///
    /// - `Ok(())`: the record is on durable storage
    /// - `Err(Error)`: storage error; the previous record must survive intact
    async fn save(&self, record: &StateRecord) -> Result<(), crate::Error>;
}

/// Helper trait for constructing state stores from configuration
pub trait StateStoreFactory: Send + Sync {
    /// Create a StateStore instance from configuration
    fn create(
        &self,
        config: &crate::config::StateStoreConfig,
    ) -> Result<Box<dyn StateStore>, crate::Error>;
}

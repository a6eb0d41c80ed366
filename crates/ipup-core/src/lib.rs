// # ipup-core
//
// Core library for the ipup public-IP publish tool.
//
// ## Architecture Overview
//
// One invocation runs one detect-compare-publish cycle:
//
// - **IpResolver**: trait for detecting the current public address
// - **Publisher**: trait for sending an address to the configured destination
// - **StateStore**: trait for persisting the last successfully published
//   address (idempotency)
// - **CycleController**: orchestrates resolve → compare → publish → persist
// - **ComponentRegistry**: plugin-based registry for implementations
//
// ## Design Principles
//
// 1. **Separation of Concerns**: core logic is separate from implementations
// 2. **Run-Once**: no long-lived loop; the external scheduler provides the
//    cadence and the retry-across-time
// 3. **Plugin-Based**: resolvers, publishers, and state stores are registered
//    dynamically
// 4. **Idempotency**: state is updated only after the destination
//    acknowledges, so a distinct address is published at most once and an
//    unconfirmed address is retried until it is

pub mod config;
pub mod cycle;
pub mod error;
pub mod lock;
pub mod registry;
pub mod resolver;
pub mod retry;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{IpupConfig, PublisherConfig, ResolverConfig, StateStoreConfig};
pub use cycle::{CycleController, CycleEvent, CycleOutcome, CyclePhase};
pub use error::{Error, Result};
pub use lock::CycleLock;
pub use registry::ComponentRegistry;
pub use resolver::FallbackResolver;
pub use retry::RetryPolicy;
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{IpResolver, PublishReceipt, Publisher, StateRecord, StateStore};

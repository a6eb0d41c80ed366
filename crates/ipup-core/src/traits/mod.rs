//! Core traits for the ipup cycle
//!
//! This module defines the abstract interfaces that all implementations must
//! follow.
//!
//! - [`IpResolver`]: detect the current public IP address
//! - [`Publisher`]: send an address to the configured destination
//! - [`StateStore`]: persist the last successfully published address

pub mod publisher;
pub mod resolver;
pub mod state_store;

pub use publisher::{PublishReceipt, Publisher, PublisherFactory};
pub use resolver::{IpResolver, IpResolverFactory};
pub use state_store::{StateRecord, StateStore, StateStoreFactory};

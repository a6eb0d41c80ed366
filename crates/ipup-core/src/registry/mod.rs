//! Plugin-based component registry
//!
//! The registry allows resolvers, publishers, and state stores to be
//! registered dynamically at runtime, avoiding hardcoded if-else chains in
//! the binary.
//!
//! ## Registration
//!
//! Implementation crates expose a `register()` function called during
//! initialization:
//!
//! ```rust,ignore
//! // In ipup-publisher-http
//! pub fn register(registry: &ComponentRegistry) {
//!     registry.register_publisher("http", Box::new(HttpPublisherFactory));
//! }
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use crate::config::{PublisherConfig, ResolverConfig, StateStoreConfig};
use crate::error::{Error, Result};
use crate::traits::{
    IpResolver, IpResolverFactory, Publisher, PublisherFactory, StateStore, StateStoreFactory,
};

/// Registry mapping component type names to factories
///
/// ## Thread Safety
///
/// Interior mutability with RwLock, allowing concurrent reads and exclusive
/// writes.
#[derive(Default)]
pub struct ComponentRegistry {
    /// Registered resolver factories
    resolvers: RwLock<HashMap<String, Box<dyn IpResolverFactory>>>,

    /// Registered publisher factories
    publishers: RwLock<HashMap<String, Box<dyn PublisherFactory>>>,

    /// Registered state store factories
    state_stores: RwLock<HashMap<String, Box<dyn StateStoreFactory>>>,
}

impl ComponentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver factory under a type name
    pub fn register_resolver(&self, name: impl Into<String>, factory: Box<dyn IpResolverFactory>) {
        let mut resolvers = self.resolvers.write().unwrap();
        resolvers.insert(name.into(), factory);
    }

    /// Register a publisher factory under a type name
    pub fn register_publisher(&self, name: impl Into<String>, factory: Box<dyn PublisherFactory>) {
        let mut publishers = self.publishers.write().unwrap();
        publishers.insert(name.into(), factory);
    }

    /// Register a state store factory under a type name
    pub fn register_state_store(
        &self,
        name: impl Into<String>,
        factory: Box<dyn StateStoreFactory>,
    ) {
        let mut stores = self.state_stores.write().unwrap();
        stores.insert(name.into(), factory);
    }

    /// Create a resolver from configuration
    pub fn create_resolver(&self, config: &ResolverConfig) -> Result<Box<dyn IpResolver>> {
        let resolvers = self.resolvers.read().unwrap();
        let factory = resolvers.get(config.type_name()).ok_or_else(|| {
            Error::config(format!("unknown resolver type: {}", config.type_name()))
        })?;
        factory.create(config)
    }

    /// Create a publisher from configuration
    pub fn create_publisher(&self, config: &PublisherConfig) -> Result<Box<dyn Publisher>> {
        let publishers = self.publishers.read().unwrap();
        let factory = publishers.get(config.type_name()).ok_or_else(|| {
            Error::config(format!("unknown publisher type: {}", config.type_name()))
        })?;
        factory.create(config)
    }

    /// Create a state store from configuration
    pub fn create_state_store(&self, config: &StateStoreConfig) -> Result<Box<dyn StateStore>> {
        let stores = self.state_stores.read().unwrap();
        let factory = stores.get(config.type_name()).ok_or_else(|| {
            Error::config(format!("unknown state store type: {}", config.type_name()))
        })?;
        factory.create(config)
    }

    /// Check if a resolver type is registered
    pub fn has_resolver(&self, name: &str) -> bool {
        self.resolvers.read().unwrap().contains_key(name)
    }

    /// Check if a publisher type is registered
    pub fn has_publisher(&self, name: &str) -> bool {
        self.publishers.read().unwrap().contains_key(name)
    }

    /// Check if a state store type is registered
    pub fn has_state_store(&self, name: &str) -> bool {
        self.state_stores.read().unwrap().contains_key(name)
    }
}

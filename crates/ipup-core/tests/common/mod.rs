//! Test doubles and common utilities for cycle contract tests
//!
//! The mocks are counter-instrumented so tests can assert how often each
//! collaborator was touched, and scriptable so publish attempts can be made
//! to fail in controlled ways.

use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ipup_core::config::CycleConfig;
use ipup_core::error::{Error, Result};
use ipup_core::traits::{IpResolver, PublishReceipt, Publisher, StateRecord, StateStore};

/// Parse a test address
pub fn ip(s: &str) -> IpAddr {
    s.parse().expect("test address must parse")
}

/// Cycle config with no retry delay, so retry tests run instantly
pub fn fast_cycle(max_publish_attempts: usize) -> CycleConfig {
    CycleConfig {
        max_publish_attempts,
        retry_delay_secs: 0,
        lock_path: None,
        force: false,
    }
}

/// A resolver that always returns the same answer and counts calls
#[derive(Clone)]
pub struct ScriptedResolver {
    result: std::result::Result<IpAddr, String>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedResolver {
    /// Resolver that succeeds with the given address
    pub fn returning(address: &str) -> Self {
        Self {
            result: Ok(ip(address)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Resolver that fails every call (e.g. all endpoints returned garbage)
    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of times resolve() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IpResolver for ScriptedResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .clone()
            .map_err(Error::resolution)
    }

    fn source_name(&self) -> &str {
        "scripted"
    }
}

/// Outcome of one scripted publish attempt
#[derive(Debug, Clone, Copy)]
pub enum PublishScript {
    /// Acknowledge without a confirmation
    Ack,
    /// Acknowledge with a destination-assigned confirmation
    AckWith(&'static str),
    /// Fail transiently (timeout, 5xx)
    Retryable,
    /// Fail fatally (auth, client error)
    Fatal,
}

/// A publisher that plays back a script of attempt outcomes
///
/// Once the script is exhausted, further attempts acknowledge. Every call is
/// counted and the published addresses are recorded.
#[derive(Clone)]
pub struct MockPublisher {
    script: Arc<Mutex<VecDeque<PublishScript>>>,
    published: Arc<Mutex<Vec<IpAddr>>>,
    calls: Arc<AtomicUsize>,
}

impl MockPublisher {
    /// Publisher that acknowledges every attempt
    pub fn acknowledging() -> Self {
        Self::answering(vec![])
    }

    /// Publisher playing back the given outcomes in order
    pub fn answering(script: Vec<PublishScript>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            published: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of times publish() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Addresses passed to publish(), in call order
    pub fn published(&self) -> Vec<IpAddr> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, ip: IpAddr) -> Result<PublishReceipt> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.published.lock().unwrap().push(ip);

        let step = self.script.lock().unwrap().pop_front();
        match step {
            None | Some(PublishScript::Ack) => Ok(PublishReceipt::default()),
            Some(PublishScript::AckWith(confirmation)) => {
                Ok(PublishReceipt::with_confirmation(confirmation))
            }
            Some(PublishScript::Retryable) => {
                Err(Error::publish_retryable("scripted transient failure"))
            }
            Some(PublishScript::Fatal) => Err(Error::publish_fatal("scripted rejection")),
        }
    }

    fn destination_name(&self) -> &str {
        "mock"
    }
}

/// A state store with injectable load/save failures and call counters
#[derive(Clone, Default)]
pub struct MockStateStore {
    record: Arc<Mutex<Option<StateRecord>>>,
    fail_loads: Arc<AtomicBool>,
    fail_saves: Arc<AtomicBool>,
    load_calls: Arc<AtomicUsize>,
    save_calls: Arc<AtomicUsize>,
}

impl MockStateStore {
    /// Empty store (first-run state)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store pre-populated with a record for the given address
    pub fn with_record(address: &str) -> Self {
        let store = Self::default();
        *store.record.lock().unwrap() = Some(StateRecord::new(ip(address)));
        store
    }

    /// Make every load() fail with a state store error
    pub fn failing_loads(self) -> Self {
        self.fail_loads.store(true, Ordering::SeqCst);
        self
    }

    /// Make every save() fail with a state store error
    pub fn failing_saves(self) -> Self {
        self.fail_saves.store(true, Ordering::SeqCst);
        self
    }

    /// Address currently on record, if any
    pub fn last_ip(&self) -> Option<IpAddr> {
        self.record.lock().unwrap().as_ref().map(|r| r.last_published_ip)
    }

    /// Number of times save() was called
    pub fn save_count(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// Number of times load() was called
    pub fn load_count(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for MockStateStore {
    async fn load(&self) -> Result<Option<StateRecord>> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(Error::state_store("scripted load failure"));
        }
        Ok(self.record.lock().unwrap().clone())
    }

    async fn save(&self, record: &StateRecord) -> Result<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::state_store("scripted save failure"));
        }
        *self.record.lock().unwrap() = Some(record.clone());
        Ok(())
    }
}

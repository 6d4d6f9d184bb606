//! Test doubles and common utilities for façade contract tests
//!
//! This module provides an in-memory backend that behaves like the cache
//! backend (family-scoped compare, heartbeat on no-op) and counts every
//! call, so tests can assert which tier was consulted.

#![allow(dead_code)]

use dyndns_core::error::{Error, Result};
use dyndns_core::{DynDnsManager, HostManager, HostRecord, parse_ip};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An in-memory HostManager that tracks calls
pub struct MockHostManager {
    /// Backend name
    pub name: &'static str,
    /// Stored hosts
    hosts: Arc<Mutex<HashMap<String, HostRecord>>>,
    /// Call counter for read_host()
    read_call_count: Arc<AtomicUsize>,
    /// Call counter for update_host()
    update_call_count: Arc<AtomicUsize>,
    /// Number of address mutations performed
    write_count: Arc<AtomicUsize>,
    /// Number of heartbeat-only touches performed
    touch_count: Arc<AtomicUsize>,
    /// Recorded (host, ip) pairs from update calls
    updates: Arc<Mutex<Vec<(String, String)>>>,
    /// Time reported by execution_time()
    reported_time: Duration,
}

impl MockHostManager {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            hosts: Arc::new(Mutex::new(HashMap::new())),
            read_call_count: Arc::new(AtomicUsize::new(0)),
            update_call_count: Arc::new(AtomicUsize::new(0)),
            write_count: Arc::new(AtomicUsize::new(0)),
            touch_count: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(Mutex::new(Vec::new())),
            reported_time: Duration::ZERO,
        }
    }

    /// Pre-populate a host with the given addresses
    pub fn with_host(self, name: &str, addresses: &[&str]) -> Self {
        let mut record = HostRecord::new(name, 300);
        for address in addresses {
            record.set_address(address.parse().expect("test address parses"));
        }
        self.hosts.lock().unwrap().insert(name.to_string(), record);
        self
    }

    /// Report a fixed execution time
    pub fn with_reported_time(mut self, time: Duration) -> Self {
        self.reported_time = time;
        self
    }

    /// Create a new MockHostManager that shares state and counters with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            name: other.name,
            hosts: Arc::clone(&other.hosts),
            read_call_count: Arc::clone(&other.read_call_count),
            update_call_count: Arc::clone(&other.update_call_count),
            write_count: Arc::clone(&other.write_count),
            touch_count: Arc::clone(&other.touch_count),
            updates: Arc::clone(&other.updates),
            reported_time: other.reported_time,
        }
    }

    /// Box a handle sharing this mock's state (for handing to the façade)
    pub fn boxed(&self) -> Box<dyn HostManager> {
        Box::new(Self::sharing_state_with(self))
    }

    /// Get the number of times read_host() was called
    pub fn read_call_count(&self) -> usize {
        self.read_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times update_host() was called
    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of address mutations
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Get the number of heartbeat touches
    pub fn touch_count(&self) -> usize {
        self.touch_count.load(Ordering::SeqCst)
    }

    /// Get the list of (host, ip) pairs passed to update_host()
    pub fn updates(&self) -> Vec<(String, String)> {
        self.updates.lock().unwrap().clone()
    }

    /// Current stored state of a host
    pub fn host(&self, name: &str) -> Option<HostRecord> {
        self.hosts.lock().unwrap().get(name).cloned()
    }
}

#[async_trait::async_trait]
impl HostManager for MockHostManager {
    async fn create_host(&mut self, _name: &str, _ip: &str) -> Result<bool> {
        Err(Error::not_implemented("create_host"))
    }

    async fn read_host(&mut self, name: &str) -> Result<Option<HostRecord>> {
        self.read_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .hosts
            .lock()
            .unwrap()
            .get(name)
            .filter(|record| !record.is_empty())
            .cloned())
    }

    async fn update_host(&mut self, name: &str, ip: &str) -> Result<bool> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.updates
            .lock()
            .unwrap()
            .push((name.to_string(), ip.to_string()));

        let mut hosts = self.hosts.lock().unwrap();
        let record = hosts.get_mut(name).ok_or_else(|| Error::invalid_host(name))?;
        let ip = parse_ip(ip)?;

        let now = chrono::Utc::now();
        if record.differs_from(&ip) {
            record.set_address(ip);
            record.last_updated = Some(now);
            record.last_touched = Some(now);
            self.write_count.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        } else {
            record.last_touched = Some(now);
            self.touch_count.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }
    }

    async fn delete_host(&mut self, _name: &str) -> Result<bool> {
        Err(Error::not_implemented("delete_host"))
    }

    fn execution_time(&self) -> Duration {
        self.reported_time
    }

    fn backend_name(&self) -> &'static str {
        self.name
    }
}

/// Helper to build a façade over a provider mock and an optional cache mock
pub fn facade(provider: &MockHostManager, cache: Option<&MockHostManager>) -> DynDnsManager {
    DynDnsManager::new(provider.boxed(), cache.map(MockHostManager::boxed))
}

//! Reconciliation façade
//!
//! The DynDnsManager is responsible for:
//! - Answering reads from the cache when it can, the provider otherwise
//! - Deciding whether an update needs to reach the provider at all
//! - Aggregating execution time across both backends
//!
//! ## Architecture
//!
//! ```text
//!                     ┌────────────────┐
//!   read / update ───▶│ DynDnsManager  │
//!                     └────────────────┘
//!                        │          │
//!            (optional)  │          │  (required)
//!                        ▼          ▼
//!               ┌─────────────┐  ┌──────────────┐
//!               │ cache       │  │ provider     │
//!               │ (SQL, cheap)│  │ (cPanel, $$) │
//!               └─────────────┘  └──────────────┘
//! ```
//!
//! ## Update Flow
//!
//! 1. Cache configured: ask it to apply the update; its answer ("did the
//!    address change?") becomes the propagation flag
//! 2. No cache: the flag is `true`, every update reaches the provider
//! 3. Flag set: forward to the provider and return the provider's answer
//! 4. Flag clear: return `false` without touching the provider
//!
//! A cache no-op is taken as proof that the provider needs no update.
//! If the zone is edited behind the cache's back the two can drift; that
//! is the accepted cost of skipping provider calls.

use crate::error::{Error, Result};
use crate::host::HostRecord;
use crate::traits::HostManager;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Two-tier host manager composing an optional cache and a required provider
///
/// The presence of the cache is decided once at construction. Errors from
/// either backend are returned unchanged; the cache-then-provider sequence
/// is not transactional.
pub struct DynDnsManager {
    /// Authoritative DNS provider
    provider: Box<dyn HostManager>,

    /// Read-first cache, if configured
    cache: Option<Box<dyn HostManager>>,
}

impl DynDnsManager {
    /// Create a new façade
    ///
    /// # Parameters
    ///
    /// - `provider`: Authoritative backend, always consulted on cache misses
    /// - `cache`: Optional read-first backend used to skip redundant provider calls
    pub fn new(provider: Box<dyn HostManager>, cache: Option<Box<dyn HostManager>>) -> Self {
        debug!(
            "Host manager composed: provider={}, cache={}",
            provider.backend_name(),
            cache.as_ref().map(|c| c.backend_name()).unwrap_or("none")
        );

        Self { provider, cache }
    }

    /// Create a façade without a cache tier
    pub fn provider_only(provider: Box<dyn HostManager>) -> Self {
        Self::new(provider, None)
    }

    /// Whether a cache tier is configured
    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }
}

#[async_trait]
impl HostManager for DynDnsManager {
    async fn create_host(&mut self, _name: &str, _ip: &str) -> Result<bool> {
        Err(Error::not_implemented("create_host"))
    }

    async fn read_host(&mut self, name: &str) -> Result<Option<HostRecord>> {
        if let Some(cache) = self.cache.as_mut() {
            if let Some(record) = cache.read_host(name).await? {
                debug!("Cache hit for host {}", name);
                return Ok(Some(record));
            }
            debug!("Cache miss for host {}, falling back to provider", name);
        }

        self.provider.read_host(name).await
    }

    async fn update_host(&mut self, name: &str, ip: &str) -> Result<bool> {
        let needs_propagation = match self.cache.as_mut() {
            Some(cache) => cache.update_host(name, ip).await?,
            None => true,
        };

        if !needs_propagation {
            debug!("Host {} already at {}, skipping provider update", name, ip);
            return Ok(false);
        }

        let written = self.provider.update_host(name, ip).await?;
        if written {
            info!("Propagated {} -> {} to {}", name, ip, self.provider.backend_name());
        } else {
            debug!("Provider reported no change for {} -> {}", name, ip);
        }

        Ok(written)
    }

    async fn delete_host(&mut self, _name: &str) -> Result<bool> {
        Err(Error::not_implemented("delete_host"))
    }

    fn execution_time(&self) -> Duration {
        let cache_time = self
            .cache
            .as_ref()
            .map(|cache| cache.execution_time())
            .unwrap_or_default();

        cache_time + self.provider.execution_time()
    }

    fn backend_name(&self) -> &'static str {
        "dyndns"
    }
}

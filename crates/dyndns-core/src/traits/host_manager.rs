// # Host Manager Trait
//
// Defines the single CRUD contract shared by every backend and by the
// reconciliation façade.
//
// ## Implementations
//
// - cPanel provider: `dyndns-provider-cpanel` crate
// - SQL cache: `dyndns-cache-sql` crate
// - Façade: [`crate::DynDnsManager`], composing the two
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::HostManager;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let mut manager = /* HostManager implementation */;
//
//     if manager.update_host("office", "203.0.113.7").await? {
//         println!("office now points at 203.0.113.7");
//     }
//
//     println!("spent {:?} talking to backends", manager.execution_time());
//     Ok(())
// }
// ```

use crate::error::Result;
use crate::host::HostRecord;
use async_trait::async_trait;
use std::time::Duration;

/// Trait for host record backends
///
/// Hosts are keyed by name within a single zone scope. Only A/AAAA
/// addresses are managed.
///
/// # Concurrency
///
/// Every operation takes `&mut self`: a backend serializes all calls
/// through the one connection handle it owns, so a single instance never
/// has more than one request in flight.
///
/// # Errors
///
/// Backends never recover locally. Input errors (`InvalidHost`,
/// `InvalidIpAddress`), `NotImplemented`, and transport/parse failures are
/// all surfaced to the immediate caller. No retries are performed.
#[async_trait]
pub trait HostManager: Send {
    /// Create a new host with the given address
    ///
    /// Hosts are presumed pre-provisioned; no backend currently supports
    /// creation and all return `Error::NotImplemented`.
    async fn create_host(&mut self, name: &str, ip: &str) -> Result<bool>;

    /// Read the current state of a host
    ///
    /// # Returns
    ///
    /// - `Ok(Some(HostRecord))`: The host exists and has at least one address
    /// - `Ok(None)`: The host is unknown to this backend
    /// - `Err(Error)`: The backend could not be queried
    async fn read_host(&mut self, name: &str) -> Result<Option<HostRecord>>;

    /// Point a host at a new address
    ///
    /// `ip` is classified as IPv4 or IPv6 and only the record/field of that
    /// family is compared and written.
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: An address was actually written
    /// - `Ok(false)`: Nothing needed changing (or no write succeeded)
    /// - `Err(Error::InvalidHost)`: The host has no existing record
    /// - `Err(Error::InvalidIpAddress)`: `ip` is neither IPv4 nor IPv6
    async fn update_host(&mut self, name: &str, ip: &str) -> Result<bool>;

    /// Delete a host
    ///
    /// Not supported by any backend; returns `Error::NotImplemented`.
    async fn delete_host(&mut self, name: &str) -> Result<bool>;

    /// Wall-clock time spent inside this backend since it was constructed
    fn execution_time(&self) -> Duration;

    /// Backend name (for logging/debugging)
    fn backend_name(&self) -> &'static str;
}

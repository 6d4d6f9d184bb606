// # dyndns-core
//
// Core library for cPanel-backed dynamic DNS host synchronization.
//
// ## Architecture Overview
//
// Given a host name and its current address, the system decides whether
// the DNS record needs updating and, if so, pushes the change to the
// authoritative zone:
// - **HostRecord**: Snapshot of a host's A/AAAA addresses, TTL and timestamps
// - **HostManager**: CRUD trait implemented by every backend
// - **DynDnsManager**: Façade composing an optional cache with a required provider
// - **ExecutionTimer**: Per-backend accumulator of time spent in calls
//
// Concrete backends live in their own crates:
// - `dyndns-provider-cpanel`: the authoritative cPanel ZoneEdit API
// - `dyndns-cache-sql`: a relational table used to skip redundant provider calls
//
// ## Design Principles
//
// 1. **Single contract**: Backends and façade share one trait
// 2. **Optional cache**: Decided at construction, checked per call by presence
// 3. **No hidden retries**: Every failure is surfaced to the caller
// 4. **One call in flight**: Operations take `&mut self`

pub mod address;
pub mod config;
pub mod error;
pub mod host;
pub mod manager;
pub mod timing;
pub mod traits;

// Re-export core types for convenience
pub use address::{AddressFamily, parse_ip};
pub use config::{CpanelConfig, DynDnsConfig, SqlCacheConfig};
pub use error::{Error, Result};
pub use host::HostRecord;
pub use manager::DynDnsManager;
pub use timing::ExecutionTimer;
pub use traits::HostManager;

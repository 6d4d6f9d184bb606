// # Host Record
//
// A resolved snapshot of one dynamic host: its name, the current A/AAAA
// addresses, TTL and the cache bookkeeping timestamps.
//
// Records are built per lookup by a backend and handed to the caller; the
// façade never persists them.

use crate::address::AddressFamily;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Snapshot of a dynamic DNS host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRecord {
    /// Host name, unique within the zone scope
    pub name: String,

    /// Current A record address
    pub ipv4_address: Option<Ipv4Addr>,

    /// Current AAAA record address
    pub ipv6_address: Option<Ipv6Addr>,

    /// Time-to-live in seconds
    pub ttl: u32,

    /// Last time the host was confirmed unchanged or updated (cache only)
    pub last_touched: Option<DateTime<Utc>>,

    /// Last time an address value actually changed (cache only)
    pub last_updated: Option<DateTime<Utc>>,
}

impl HostRecord {
    /// Create a record with no addresses and no timestamps
    pub fn new(name: impl Into<String>, ttl: u32) -> Self {
        Self {
            name: name.into(),
            ipv4_address: None,
            ipv6_address: None,
            ttl,
            last_touched: None,
            last_updated: None,
        }
    }

    /// Builder-style address setter
    pub fn with_address(mut self, ip: IpAddr) -> Self {
        self.set_address(ip);
        self
    }

    /// A record without any address is treated as absent by every backend
    pub fn is_empty(&self) -> bool {
        self.ipv4_address.is_none() && self.ipv6_address.is_none()
    }

    /// Stored address of the given family
    pub fn address(&self, family: AddressFamily) -> Option<IpAddr> {
        match family {
            AddressFamily::V4 => self.ipv4_address.map(IpAddr::V4),
            AddressFamily::V6 => self.ipv6_address.map(IpAddr::V6),
        }
    }

    /// Overwrite the address of `ip`'s family, leaving the other family untouched
    pub fn set_address(&mut self, ip: IpAddr) {
        match ip {
            IpAddr::V4(v4) => self.ipv4_address = Some(v4),
            IpAddr::V6(v6) => self.ipv6_address = Some(v6),
        }
    }

    /// Whether writing `ip` would be a real change
    pub fn differs_from(&self, ip: &IpAddr) -> bool {
        self.address(AddressFamily::of(ip)) != Some(*ip)
    }
}

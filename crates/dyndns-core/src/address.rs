//! Address family classification
//!
//! Every update decision is scoped to one address family: an IPv4 address
//! only ever touches A records / the `ipv4Address` field, an IPv6 address
//! only ever touches AAAA records / the `ipv6Address` field.

use crate::error::{Error, Result};
use std::fmt;
use std::net::IpAddr;

/// IP address family (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Family of a parsed address
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }

    /// DNS record type carrying addresses of this family
    pub fn record_type(self) -> &'static str {
        match self {
            AddressFamily::V4 => "A",
            AddressFamily::V6 => "AAAA",
        }
    }

    /// Map a DNS record type back to a family
    ///
    /// Returns `None` for record types that carry no address (CNAME, TXT, MX, ...).
    pub fn from_record_type(record_type: &str) -> Option<Self> {
        match record_type {
            "A" => Some(AddressFamily::V4),
            "AAAA" => Some(AddressFamily::V6),
            _ => None,
        }
    }

    /// Cache column holding addresses of this family
    pub fn column(self) -> &'static str {
        match self {
            AddressFamily::V4 => "ipv4Address",
            AddressFamily::V6 => "ipv6Address",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::V4 => f.write_str("IPv4"),
            AddressFamily::V6 => f.write_str("IPv6"),
        }
    }
}

/// Classify a caller-supplied address
///
/// # Returns
///
/// - `Ok(IpAddr)`: The parsed address; its family selects the record type to touch
/// - `Err(Error::InvalidIpAddress)`: The input is neither IPv4 nor IPv6
pub fn parse_ip(ip: &str) -> Result<IpAddr> {
    ip.parse::<IpAddr>().map_err(|_| Error::invalid_ip(ip))
}

//! cPanel JSON API wire types
//!
//! Responses look like:
//!
//! ```json
//! {
//!   "cpanelresult": {
//!     "event": { "result": 1 },
//!     "data": [
//!       { "line": 23, "ttl": "300", "type": "A", "address": "203.0.113.7" }
//!     ]
//!   }
//! }
//! ```
//!
//! Older servers send `line` and `ttl` as strings, so both are accepted.

use crate::PROVIDER_NAME;
use dyndns_core::{AddressFamily, Error, HostRecord, Result};
use serde::Deserialize;
use serde::de::{self, Deserializer};
use serde_json::Value;
use std::net::IpAddr;

/// Payload found under the `cpanelresult` wrapper key
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CpanelResult {
    #[serde(default)]
    pub data: Option<Value>,

    #[serde(default)]
    pub event: Option<Value>,

    #[serde(default)]
    pub error: Option<Value>,
}

impl CpanelResult {
    /// Unwrap a raw response body
    ///
    /// A body that is not JSON at all is an `Error::Json`; JSON without the
    /// wrapper key is a provider error.
    pub fn from_body(body: &str) -> Result<Self> {
        let mut envelope: Value = serde_json::from_str(body)?;

        let result = envelope
            .get_mut("cpanelresult")
            .map(Value::take)
            .ok_or_else(|| {
                Error::provider(
                    PROVIDER_NAME,
                    "Could not decode JSON response: missing cpanelresult",
                )
            })?;

        serde_json::from_value(result).map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("Could not decode JSON response: {}", e))
        })
    }

    /// Zone records returned by `fetchzone_records`
    pub fn into_zone_records(mut self) -> Result<Vec<ZoneRecord>> {
        let Some(data) = self.data.take().filter(|data| !data.is_null()) else {
            let reason = self
                .error_message()
                .map(|msg| format!("No zone data returned: {}", msg))
                .unwrap_or_else(|| "No zone data returned".to_string());
            return Err(Error::provider(PROVIDER_NAME, reason));
        };

        serde_json::from_value(data)
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("Invalid zone data: {}", e)))
    }

    /// Whether an `edit_zone_record` call reported success
    ///
    /// The per-record `data[0].result.status` wins; otherwise the event
    /// result is used. A well-formed envelope without either counts as success.
    pub fn edit_succeeded(&self) -> bool {
        if let Some(status) = self.edit_result().and_then(|r| r.get("status")) {
            return is_truthy(status);
        }

        if let Some(result) = self.event.as_ref().and_then(|e| e.get("result")) {
            return is_truthy(result);
        }

        true
    }

    /// Human-readable status of an edit, if the server sent one
    pub fn status_message(&self) -> Option<String> {
        self.edit_result()
            .and_then(|r| r.get("statusmsg"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| self.error_message())
    }

    fn edit_result(&self) -> Option<&Value> {
        self.data
            .as_ref()
            .and_then(|d| d.get(0))
            .and_then(|entry| entry.get("result"))
    }

    fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::String(msg) if !msg.is_empty() => Some(msg.clone()),
            Value::Null | Value::String(_) => None,
            other => Some(other.to_string()),
        }
    }
}

/// One record of a zone file as listed by cPanel
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ZoneRecord {
    #[serde(rename = "type", default)]
    pub record_type: String,

    /// Present for A/AAAA records only
    #[serde(default)]
    pub address: Option<String>,

    #[serde(default, deserialize_with = "lenient_u64")]
    pub ttl: Option<u64>,

    /// Position in the zone file; the only edit key cPanel offers
    #[serde(default, deserialize_with = "lenient_u64")]
    pub line: Option<u64>,
}

impl ZoneRecord {
    /// Address family carried by this record, if any
    pub fn family(&self) -> Option<AddressFamily> {
        AddressFamily::from_record_type(&self.record_type)
    }

    /// Parse this record's address as the given family
    pub fn parsed_address(&self, family: AddressFamily) -> Result<IpAddr> {
        let raw = self.address.as_deref().ok_or_else(|| {
            Error::provider(
                PROVIDER_NAME,
                format!("{} record at line {:?} has no address", self.record_type, self.line),
            )
        })?;

        match raw.parse::<IpAddr>() {
            Ok(ip) if AddressFamily::of(&ip) == family => Ok(ip),
            _ => Err(Error::provider(
                PROVIDER_NAME,
                format!("Invalid {} address in zone record: {}", family, raw),
            )),
        }
    }

    fn ttl_secs(&self) -> u32 {
        self.ttl
            .map(|ttl| u32::try_from(ttl).unwrap_or(u32::MAX))
            .unwrap_or_default()
    }
}

/// Fold the records of one name into a host snapshot
///
/// TTL comes from the first record; A and AAAA records fill the matching
/// address, everything else is ignored. Returns `None` when no address
/// record exists.
pub(crate) fn host_from_records(name: &str, records: &[ZoneRecord]) -> Result<Option<HostRecord>> {
    let Some(first) = records.first() else {
        return Ok(None);
    };

    let mut host = HostRecord::new(name, first.ttl_secs());
    for record in records {
        if let Some(family) = record.family() {
            host.set_address(record.parsed_address(family)?);
        }
    }

    Ok((!host.is_empty()).then_some(host))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_u64() == Some(1),
        Value::String(s) => s == "1",
        _ => false,
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected unsigned integer, got {}", n))),
        Some(Value::String(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
        Some(other) => Err(de::Error::custom(format!("expected number, got {}", other))),
    }
}

// # cPanel DNS Provider
//
// This crate provides the authoritative backend of the dynamic DNS system:
// it reads and edits A/AAAA records through cPanel's ZoneEdit JSON API.
//
// ## Behavior
//
// - ✅ Reads every custom record named `<host>.<subdomain>.<zone>.`
// - ✅ Edits only records whose type matches the new address's family
// - ✅ Re-fetches the zone listing before every edit (line numbers shift)
// - ✅ Best-effort across several matching records
// - ✅ Accumulates wall-clock time spent in every call
// - ❌ NO retry logic (owned by the caller)
// - ❌ NO create/delete (hosts are pre-provisioned)
//
// ## Line Numbers
//
// cPanel does not expose stable record IDs. Records are edited by their
// position ("line") in the zone file, which changes whenever the zone is
// edited. A line number is only valid for the listing it came from, so
// `update_host` always works from a listing fetched in the same call.
//
// ## API Calls
//
// ```http
// GET /json-api/cpanel?cpanel_jsonapi_module=ZoneEdit
//     &cpanel_jsonapi_func=fetchzone_records
//     &domain=example.com&name=office.remote.example.com.&customonly=1
//
// GET /json-api/cpanel?cpanel_jsonapi_module=ZoneEdit
//     &cpanel_jsonapi_func=edit_zone_record
//     &domain=example.com&line=23&type=A&address=203.0.113.7
// Authorization: Basic <user:password>
// ```

mod zone;

use async_trait::async_trait;
use dyndns_core::timing::timed;
use dyndns_core::{
    AddressFamily, CpanelConfig, Error, ExecutionTimer, HostManager, HostRecord, Result,
    parse_ip,
};
use std::net::IpAddr;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use zone::{CpanelResult, ZoneRecord, host_from_records};

/// Provider name used in errors and logs
pub(crate) const PROVIDER_NAME: &str = "cpanel";

/// Path of the cPanel JSON API endpoint
const JSON_API_PATH: &str = "/json-api/cpanel";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// cPanel ZoneEdit host manager
///
/// Owns one HTTP client for its whole lifetime; dropping the manager
/// releases it.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the password.
pub struct CpanelDnsManager {
    /// Connection and zone settings
    /// ⚠️ Contains the account password, NEVER log it
    config: CpanelConfig,

    /// `https://host:port`, or an override
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Time spent in this backend
    timer: ExecutionTimer,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for CpanelDnsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpanelDnsManager")
            .field("base_url", &self.base_url)
            .field("username", &self.config.username)
            .field("password", &"<REDACTED>")
            .field("zone", &self.config.zone)
            .field("subdomain", &self.config.subdomain)
            .field("verify_tls", &self.config.verify_tls)
            .field("execution_time", &self.timer.total())
            .finish()
    }
}

impl CpanelDnsManager {
    /// Create a provider talking to `https://{hostname}:{port}`
    ///
    /// # Returns
    ///
    /// - `Ok(CpanelDnsManager)`: Ready to use
    /// - `Err(Error::Config)`: The configuration is invalid
    /// - `Err(Error::Http)`: The HTTP client could not be built
    pub fn new(config: &CpanelConfig) -> Result<Self> {
        let base_url = format!("https://{}:{}", config.hostname, config.port);
        Self::with_base_url(config, base_url)
    }

    /// Create a provider talking to an explicit base URL
    ///
    /// Useful behind a reverse proxy or against a plain-HTTP test server.
    /// Hostname and port from `config` are ignored.
    pub fn with_base_url(config: &CpanelConfig, base_url: impl Into<String>) -> Result<Self> {
        let started = Instant::now();
        config.validate()?;

        if !config.verify_tls {
            warn!("TLS certificate verification disabled for cPanel host {}", config.hostname);
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        let mut timer = ExecutionTimer::new();
        timer.record(started);

        Ok(Self {
            config: config.clone(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            timer,
        })
    }

    /// Zone this provider edits
    pub fn zone(&self) -> &str {
        &self.config.zone
    }

    async fn read_host_inner(&self, name: &str) -> Result<Option<HostRecord>> {
        let records = self.fetch_host_records(name).await?;
        let host = host_from_records(name, &records)?;

        debug!(
            "cPanel lookup for {}: {} record(s), found={}",
            name,
            records.len(),
            host.is_some()
        );
        Ok(host)
    }

    async fn update_host_inner(&self, name: &str, ip: &str) -> Result<bool> {
        // Fresh listing: line numbers from any earlier fetch may be stale
        let records = self.fetch_host_records(name).await?;
        if host_from_records(name, &records)?.is_none() {
            return Err(Error::invalid_host(name));
        }

        let ip = parse_ip(ip)?;
        let family = AddressFamily::of(&ip);
        let mut updated = false;

        for record in records.iter().filter(|r| r.family() == Some(family)) {
            let current = record.parsed_address(family)?;
            if current == ip {
                debug!(
                    "{} record of {} at line {:?} already {}",
                    family.record_type(),
                    name,
                    record.line,
                    ip
                );
                continue;
            }

            let line = record.line.ok_or_else(|| {
                Error::provider(
                    PROVIDER_NAME,
                    format!(
                        "{} record of {} has no line number",
                        family.record_type(),
                        name
                    ),
                )
            })?;

            if self.edit_zone_record(line, family, &ip).await? {
                info!(
                    "Updated {} record of {} at line {}: {} -> {}",
                    family.record_type(),
                    name,
                    line,
                    current,
                    ip
                );
                updated = true;
            }
        }

        Ok(updated)
    }

    /// List the custom records of one host
    async fn fetch_host_records(&self, name: &str) -> Result<Vec<ZoneRecord>> {
        let fqdn = self.config.record_fqdn(name);
        let result = self
            .cpanel_request(
                "fetchzone_records",
                &[("name", fqdn), ("customonly", "1".to_string())],
            )
            .await?;

        result.into_zone_records()
    }

    /// Point the record at `line` to a new address
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: cPanel accepted the edit
    /// - `Ok(false)`: cPanel answered but reported failure (logged)
    /// - `Err(Error)`: Transport or decode failure
    async fn edit_zone_record(
        &self,
        line: u64,
        family: AddressFamily,
        ip: &IpAddr,
    ) -> Result<bool> {
        let result = self
            .cpanel_request(
                "edit_zone_record",
                &[
                    ("line", line.to_string()),
                    ("type", family.record_type().to_string()),
                    ("address", ip.to_string()),
                ],
            )
            .await?;

        let succeeded = result.edit_succeeded();
        if !succeeded {
            warn!(
                "cPanel rejected edit of line {} in {}: {}",
                line,
                self.config.zone,
                result.status_message().unwrap_or_else(|| "no reason given".to_string())
            );
        }

        Ok(succeeded)
    }

    /// Call one ZoneEdit function and unwrap the `cpanelresult` envelope
    async fn cpanel_request(&self, func: &str, params: &[(&str, String)]) -> Result<CpanelResult> {
        let url = format!("{}{}", self.base_url, JSON_API_PATH);

        let mut query: Vec<(&str, String)> = vec![
            ("cpanel_jsonapi_apiversion", "2".to_string()),
            ("cpanel_jsonapi_module", "ZoneEdit".to_string()),
            ("cpanel_jsonapi_func", func.to_string()),
            ("domain", self.config.zone.clone()),
        ];
        query.extend(params.iter().cloned());

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::http(format!("cPanel request {} failed: {}", func, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return match status.as_u16() {
                401 | 403 => Err(Error::auth(format!(
                    "cPanel rejected the account credentials. Status: {}",
                    status
                ))),
                500..=599 => Err(Error::http(format!(
                    "cPanel server error: {} - {}",
                    status, error_text
                ))),
                _ => Err(Error::http(format!(
                    "cPanel request {} failed: {} - {}",
                    func, status, error_text
                ))),
            };
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read cPanel response: {}", e)))?;

        CpanelResult::from_body(&body)
    }
}

#[async_trait]
impl HostManager for CpanelDnsManager {
    async fn create_host(&mut self, _name: &str, _ip: &str) -> Result<bool> {
        Err(Error::not_implemented("create_host"))
    }

    async fn read_host(&mut self, name: &str) -> Result<Option<HostRecord>> {
        let (result, elapsed) = timed(self.read_host_inner(name)).await;
        self.timer.add(elapsed);
        result
    }

    async fn update_host(&mut self, name: &str, ip: &str) -> Result<bool> {
        let (result, elapsed) = timed(self.update_host_inner(name, ip)).await;
        self.timer.add(elapsed);
        result
    }

    async fn delete_host(&mut self, _name: &str) -> Result<bool> {
        Err(Error::not_implemented("delete_host"))
    }

    fn execution_time(&self) -> Duration {
        self.timer.total()
    }

    fn backend_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

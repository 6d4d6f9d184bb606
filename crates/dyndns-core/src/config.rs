//! Configuration types for the dynamic DNS system
//!
//! This module defines all configuration structures used throughout the
//! workspace. Loading them (environment, files) is left to the binary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main configuration: a mandatory provider and an optional cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynDnsConfig {
    /// cPanel provider configuration
    pub provider: CpanelConfig,

    /// SQL cache configuration; `None` disables the cache tier entirely
    #[serde(default)]
    pub cache: Option<SqlCacheConfig>,
}

impl DynDnsConfig {
    /// Create a configuration without a cache
    pub fn new(provider: CpanelConfig) -> Self {
        Self {
            provider,
            cache: None,
        }
    }

    /// Attach a cache configuration
    pub fn with_cache(mut self, cache: SqlCacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;

        if let Some(cache) = &self.cache {
            cache.validate()?;
        }

        Ok(())
    }
}

/// cPanel provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct CpanelConfig {
    /// cPanel server hostname
    pub hostname: String,

    /// cPanel HTTPS port
    #[serde(default = "default_cpanel_port")]
    pub port: u16,

    /// cPanel account user
    pub username: String,

    /// cPanel account password
    /// ⚠️ NEVER log this value
    pub password: String,

    /// Zone the dynamic hosts live in (e.g., "example.com")
    pub zone: String,

    /// Subdomain scope within the zone (e.g., "remote"); may be empty
    #[serde(default)]
    pub subdomain: String,

    /// Set to false to accept self-signed or mismatched certificates
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

impl CpanelConfig {
    /// Create a provider configuration with default port and TLS verification
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        zone: impl Into<String>,
        subdomain: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            port: default_cpanel_port(),
            username: username.into(),
            password: password.into(),
            zone: zone.into(),
            subdomain: subdomain.into(),
            verify_tls: default_verify_tls(),
        }
    }

    /// Fully qualified, dot-terminated record name for a host
    ///
    /// `office` in subdomain `remote` of `example.com` is `office.remote.example.com.`
    pub fn record_fqdn(&self, host: &str) -> String {
        if self.subdomain.is_empty() {
            format!("{}.{}.", host, self.zone)
        } else {
            format!("{}.{}.{}.", host, self.subdomain, self.zone)
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.hostname.is_empty() {
            return Err(crate::Error::config("cPanel hostname cannot be empty"));
        }
        if self.port == 0 {
            return Err(crate::Error::config("cPanel port must be > 0"));
        }
        if self.username.is_empty() {
            return Err(crate::Error::config("cPanel username cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(crate::Error::config("cPanel password cannot be empty"));
        }

        validate_domain_name(&self.zone)?;
        if !self.subdomain.is_empty() {
            validate_domain_name(&self.subdomain)?;
        }

        Ok(())
    }
}

// Custom Debug implementation that hides the password
impl fmt::Debug for CpanelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CpanelConfig")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("zone", &self.zone)
            .field("subdomain", &self.subdomain)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

/// SQL (MySQL) cache configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SqlCacheConfig {
    /// Database server hostname
    pub hostname: String,

    /// Database server port (driver default when absent)
    #[serde(default)]
    pub port: Option<u16>,

    /// Database user
    pub username: String,

    /// Database password
    /// ⚠️ NEVER log this value
    pub password: String,

    /// Database name
    pub database: String,

    /// Table holding one row per host
    #[serde(default = "default_cache_table")]
    pub table: String,
}

impl SqlCacheConfig {
    /// Create a cache configuration using the default table name
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            port: None,
            username: username.into(),
            password: password.into(),
            database: database.into(),
            table: default_cache_table(),
        }
    }

    /// Use a different table
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Validate the cache configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.hostname.is_empty() {
            return Err(crate::Error::config("Cache hostname cannot be empty"));
        }
        if self.username.is_empty() {
            return Err(crate::Error::config("Cache username cannot be empty"));
        }
        if self.database.is_empty() {
            return Err(crate::Error::config("Cache database cannot be empty"));
        }
        validate_sql_identifier(&self.table)
    }
}

// Custom Debug implementation that hides the password
impl fmt::Debug for SqlCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlCacheConfig")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("database", &self.database)
            .field("table", &self.table)
            .finish()
    }
}

/// Validate a DNS name or single label
///
/// This implements basic DNS domain name validation per RFC 1035.
/// It's not comprehensive but catches common errors.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    // Total length limit (RFC 1035: 253 chars max)
    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}

/// Validate a table name before it is interpolated into SQL
pub fn validate_sql_identifier(identifier: &str) -> Result<(), crate::Error> {
    if identifier.is_empty() || identifier.len() > 64 {
        return Err(crate::Error::config(format!(
            "SQL identifier must be 1-64 characters. Got: '{}'",
            identifier
        )));
    }

    if !identifier
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(crate::Error::config(format!(
            "SQL identifier may only contain [A-Za-z0-9_]. Got: '{}'",
            identifier
        )));
    }

    Ok(())
}

fn default_cpanel_port() -> u16 {
    2083
}

fn default_verify_tls() -> bool {
    true
}

fn default_cache_table() -> String {
    "hosts".to_string()
}

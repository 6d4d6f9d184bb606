// # SQL Host Cache
//
// This crate provides the optional cache tier of the dynamic DNS system:
// one table row per host, used to decide whether an update is a real
// change before the provider is contacted.
//
// ## Behavior
//
// - ✅ Reads one row by host name
// - ✅ Writes the changed address with `lastUpdated` and `lastTouched`
// - ✅ Records a `lastTouched` heartbeat when nothing changed
// - ✅ Owns exactly one connection for its whole lifetime
// - ❌ NO schema management (the table is provisioned externally)
// - ❌ NO create/delete (hosts are pre-provisioned)
//
// ## Table
//
// ```sql
// CREATE TABLE hosts (
//     name        VARCHAR(255) PRIMARY KEY,
//     ipv4Address VARCHAR(15),
//     ipv6Address VARCHAR(39),
//     ttl         INT,
//     lastTouched DATETIME,
//     lastUpdated DATETIME
// );
// ```
//
// Timestamps are read through `CAST(... AS CHAR)` and written as UTC
// `YYYY-MM-DD HH:MM:SS` text so the same queries run on MySQL and SQLite.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use dyndns_core::config::validate_sql_identifier;
use dyndns_core::timing::timed;
use dyndns_core::{
    AddressFamily, Error, ExecutionTimer, HostManager, HostRecord, Result, SqlCacheConfig,
    parse_ip,
};
use sqlx::any::AnyRow;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::{AnyConnection, ConnectOptions, Connection, Row};
use std::net::IpAddr;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Backend name used in logs
const BACKEND_NAME: &str = "sql-cache";

/// Timestamp layout written to the table
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Relational host cache over a single connection
pub struct SqlDnsManager {
    conn: AnyConnection,

    /// Validated table identifier
    table: String,

    /// Time spent in this backend
    timer: ExecutionTimer,
}

impl std::fmt::Debug for SqlDnsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlDnsManager")
            .field("table", &self.table)
            .field("execution_time", &self.timer.total())
            .finish_non_exhaustive()
    }
}

impl SqlDnsManager {
    /// Connect to the MySQL server described by `config`
    ///
    /// # Returns
    ///
    /// - `Ok(SqlDnsManager)`: Connected
    /// - `Err(Error::Config)`: The configuration is invalid
    /// - `Err(Error::Cache)`: The connection could not be established
    pub async fn connect(config: &SqlCacheConfig) -> Result<Self> {
        config.validate()?;

        let mut options = MySqlConnectOptions::new()
            .host(&config.hostname)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database);
        if let Some(port) = config.port {
            options = options.port(port);
        }

        debug!(
            "Connecting to cache database {} on {}",
            config.database, config.hostname
        );
        Self::connect_url(options.to_url_lossy().as_str(), &config.table).await
    }

    /// Connect using any URL the enabled sqlx drivers accept
    ///
    /// `sqlite::memory:` gives a private in-memory database.
    pub async fn connect_url(url: &str, table: &str) -> Result<Self> {
        let started = Instant::now();
        validate_sql_identifier(table)?;

        sqlx::any::install_default_drivers();
        let conn = AnyConnection::connect(url)
            .await
            .map_err(|e| Error::cache(format!("Failed to connect to cache database: {}", e)))?;

        let mut timer = ExecutionTimer::new();
        timer.record(started);

        Ok(Self {
            conn,
            table: table.to_string(),
            timer,
        })
    }

    /// Close the connection, reporting any error from the server
    ///
    /// Dropping the manager also releases the connection, without waiting
    /// for a clean shutdown.
    pub async fn close(self) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| Error::cache(format!("Failed to close cache connection: {}", e)))
    }

    /// Table this cache reads and writes
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fetch the row for `name`, including rows without any address
    async fn fetch_row(&mut self, name: &str) -> Result<Option<HostRecord>> {
        let sql = format!(
            "SELECT name, ipv4Address, ipv6Address, ttl, \
             CAST(lastTouched AS CHAR), CAST(lastUpdated AS CHAR) \
             FROM {} WHERE name = ? LIMIT 1",
            self.table
        );

        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&mut self.conn)
            .await
            .map_err(|e| Error::cache(format!("Failed to read host {}: {}", name, e)))?;

        row.map(|row| host_from_row(name, &row)).transpose()
    }

    async fn read_host_inner(&mut self, name: &str) -> Result<Option<HostRecord>> {
        let host = self.fetch_row(name).await?.filter(|host| !host.is_empty());
        debug!("Cache lookup for {}: found={}", name, host.is_some());
        Ok(host)
    }

    async fn update_host_inner(&mut self, name: &str, ip: &str) -> Result<bool> {
        let Some(current) = self.fetch_row(name).await? else {
            return Err(Error::invalid_host(name));
        };
        let ip = parse_ip(ip)?;
        let now = format_timestamp(Utc::now());

        if current.differs_from(&ip) {
            self.write_address(name, &ip, &now).await?;
            info!(
                "Cache updated {} of {}: {:?} -> {}",
                AddressFamily::of(&ip),
                name,
                current.address(AddressFamily::of(&ip)),
                ip
            );
            Ok(true)
        } else {
            self.touch(name, &now).await?;
            debug!("Cache heartbeat for {}: {} unchanged", name, ip);
            Ok(false)
        }
    }

    /// Store a changed address; both timestamps get the same instant
    async fn write_address(&mut self, name: &str, ip: &IpAddr, now: &str) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET {} = ?, lastUpdated = ?, lastTouched = ? WHERE name = ?",
            self.table,
            AddressFamily::of(ip).column()
        );

        sqlx::query(&sql)
            .bind(ip.to_string())
            .bind(now)
            .bind(now)
            .bind(name)
            .execute(&mut self.conn)
            .await
            .map_err(|e| Error::cache(format!("Failed to update host {}: {}", name, e)))?;

        Ok(())
    }

    async fn touch(&mut self, name: &str, now: &str) -> Result<()> {
        let sql = format!("UPDATE {} SET lastTouched = ? WHERE name = ?", self.table);

        sqlx::query(&sql)
            .bind(now)
            .bind(name)
            .execute(&mut self.conn)
            .await
            .map_err(|e| Error::cache(format!("Failed to touch host {}: {}", name, e)))?;

        Ok(())
    }
}

#[async_trait]
impl HostManager for SqlDnsManager {
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
        BACKEND_NAME
    }
}

fn host_from_row(name: &str, row: &AnyRow) -> Result<HostRecord> {
    let ttl: Option<i64> = column(row, 3)?;
    let ttl = u32::try_from(ttl.unwrap_or_default())
        .map_err(|_| Error::cache(format!("Invalid ttl for host {}", name)))?;

    let mut host = HostRecord::new(name, ttl);

    for index in [1, 2] {
        let stored: Option<String> = column(row, index)?;
        if let Some(raw) = stored.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let ip = raw.parse::<IpAddr>().map_err(|_| {
                Error::cache(format!("Invalid address {} stored for host {}", raw, name))
            })?;
            host.set_address(ip);
        }
    }

    host.last_touched = column::<Option<String>>(row, 4)?
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;
    host.last_updated = column::<Option<String>>(row, 5)?
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;

    Ok(host)
}

fn column<'r, T>(row: &'r AnyRow, index: usize) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Any> + sqlx::Type<sqlx::Any>,
{
    row.try_get(index)
        .map_err(|e| Error::cache(format!("Failed to decode column {}: {}", index, e)))
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp; fractional seconds and RFC 3339 are accepted
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|at| at.with_timezone(&Utc)))
        .map_err(|_| Error::cache(format!("Invalid timestamp in cache: {}", raw)))
}

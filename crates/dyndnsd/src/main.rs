// # dyndns - Dynamic DNS command
//
// This binary is a THIN integration layer:
// - DO NOT add reconciliation, DNS or retry logic here
// - All host logic lives in dyndns-core and the backend crates
// - Configuration is via environment variables ONLY
//
// One invocation handles one host:
// 1. Read configuration from environment variables
// 2. Build the cPanel provider and, if configured, the SQL cache
// 3. Run one command through the façade
// 4. Log the time spent in the backends
//
// ## Configuration
//
// ### cPanel Provider
// - `DYNDNS_CPANEL_HOSTNAME`: cPanel server hostname
// - `DYNDNS_CPANEL_PORT`: HTTPS port (default 2083)
// - `DYNDNS_CPANEL_USERNAME`: Account user
// - `DYNDNS_CPANEL_PASSWORD`: Account password
// - `DYNDNS_CPANEL_ZONE`: Zone holding the hosts (e.g., example.com)
// - `DYNDNS_CPANEL_SUBDOMAIN`: Subdomain scope within the zone (optional)
// - `DYNDNS_CPANEL_VERIFY_TLS`: Set to false for self-signed certificates
//
// ### SQL Cache (enabled when DYNDNS_MYSQL_HOSTNAME is set)
// - `DYNDNS_MYSQL_HOSTNAME`, `DYNDNS_MYSQL_PORT`
// - `DYNDNS_MYSQL_USERNAME`, `DYNDNS_MYSQL_PASSWORD`
// - `DYNDNS_MYSQL_DATABASE`, `DYNDNS_MYSQL_TABLE` (default hosts)
//
// ### Logging
// - `DYNDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export DYNDNS_CPANEL_HOSTNAME=cpanel.example.com
// export DYNDNS_CPANEL_USERNAME=example
// export DYNDNS_CPANEL_PASSWORD=secret
// export DYNDNS_CPANEL_ZONE=example.com
// export DYNDNS_CPANEL_SUBDOMAIN=remote
//
// dyndns update office 203.0.113.7
// dyndns read office
// ```

use anyhow::{Context, Result};
use dyndns_core::{CpanelConfig, DynDnsConfig, DynDnsManager, HostManager, SqlCacheConfig};
use dyndns_provider_cpanel::CpanelDnsManager;
use std::env;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the possible outcomes of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DynDnsExitCode {
    /// Command completed
    Success = 0,
    /// Configuration or usage error
    ConfigError = 1,
    /// Backend or runtime failure
    RuntimeError = 2,
    /// `read` found no record for the host
    NotFound = 3,
}

impl From<DynDnsExitCode> for ExitCode {
    fn from(code: DynDnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

const USAGE: &str = "Usage:\n  dyndns read <host>\n  dyndns update <host> <ip>";

/// One command per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Read { host: String },
    Update { host: String, ip: String },
}

impl Command {
    fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["read", host] => Ok(Self::Read {
                host: host.to_string(),
            }),
            ["update", host, ip] => Ok(Self::Update {
                host: host.to_string(),
                ip: ip.to_string(),
            }),
            _ => anyhow::bail!("{}", USAGE),
        }
    }
}

/// Application configuration
struct Config {
    dyndns: DynDnsConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|value| !value.is_empty())
                .with_context(|| format!("{} is required. Set it via: export {}=...", key, key))
        };

        let mut provider = CpanelConfig::new(
            required("DYNDNS_CPANEL_HOSTNAME")?,
            required("DYNDNS_CPANEL_USERNAME")?,
            required("DYNDNS_CPANEL_PASSWORD")?,
            required("DYNDNS_CPANEL_ZONE")?,
            lookup("DYNDNS_CPANEL_SUBDOMAIN").unwrap_or_default(),
        );
        if let Some(port) = lookup("DYNDNS_CPANEL_PORT") {
            provider.port = port
                .parse()
                .with_context(|| format!("DYNDNS_CPANEL_PORT is not a valid port: {}", port))?;
        }
        if let Some(verify) = lookup("DYNDNS_CPANEL_VERIFY_TLS") {
            provider.verify_tls = parse_bool(&verify).with_context(|| {
                format!("DYNDNS_CPANEL_VERIFY_TLS must be true or false. Got: {}", verify)
            })?;
        }

        let mut dyndns = DynDnsConfig::new(provider);

        if let Some(hostname) = lookup("DYNDNS_MYSQL_HOSTNAME").filter(|h| !h.is_empty()) {
            let mut cache = SqlCacheConfig::new(
                hostname,
                required("DYNDNS_MYSQL_USERNAME")?,
                lookup("DYNDNS_MYSQL_PASSWORD").unwrap_or_default(),
                required("DYNDNS_MYSQL_DATABASE")?,
            );
            if let Some(port) = lookup("DYNDNS_MYSQL_PORT") {
                cache.port = Some(port.parse().with_context(|| {
                    format!("DYNDNS_MYSQL_PORT is not a valid port: {}", port)
                })?);
            }
            if let Some(table) = lookup("DYNDNS_MYSQL_TABLE") {
                cache = cache.with_table(table);
            }
            dyndns = dyndns.with_cache(cache);
        }

        Ok(Self {
            dyndns,
            log_level: lookup("DYNDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.dyndns.validate()?;

        if cfg!(not(feature = "mysql")) && self.dyndns.cache.is_some() {
            anyhow::bail!(
                "DYNDNS_MYSQL_HOSTNAME is set but this build has no SQL cache support. \
                Rebuild with the mysql feature or unset it."
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DYNDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn main() -> ExitCode {
    let command = match Command::from_args(env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            return DynDnsExitCode::ConfigError.into();
        }
    };

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DynDnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DynDnsExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DynDnsExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DynDnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(config, command).await {
            Ok(code) => code,
            Err(e) => {
                error!("{:#}", e);
                DynDnsExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Build the façade and run one command
async fn run(config: Config, command: Command) -> Result<DynDnsExitCode> {
    let mut manager = build_manager(&config.dyndns).await?;
    let outcome = execute(&mut manager, &command).await;

    info!(
        "Execution time: {:.3}s",
        manager.execution_time().as_secs_f64()
    );

    outcome
}

async fn build_manager(config: &DynDnsConfig) -> Result<DynDnsManager> {
    let provider = CpanelDnsManager::new(&config.provider)
        .context("Failed to initialize cPanel provider")?;
    debug!("cPanel provider ready for zone {}", provider.zone());

    let cache: Option<Box<dyn HostManager>> = match &config.cache {
        #[cfg(feature = "mysql")]
        Some(cache) => Some(Box::new(
            dyndns_cache_sql::SqlDnsManager::connect(cache)
                .await
                .context("Failed to connect to SQL cache")?,
        )),
        #[cfg(not(feature = "mysql"))]
        Some(_) => anyhow::bail!("SQL cache support is not compiled in"),
        None => None,
    };

    Ok(DynDnsManager::new(Box::new(provider), cache))
}

async fn execute(manager: &mut DynDnsManager, command: &Command) -> Result<DynDnsExitCode> {
    match command {
        Command::Read { host } => match manager.read_host(host).await? {
            Some(record) => {
                println!("{}", serde_json::to_string_pretty(&record)?);
                Ok(DynDnsExitCode::Success)
            }
            None => {
                info!("No record found for {}", host);
                Ok(DynDnsExitCode::NotFound)
            }
        },
        Command::Update { host, ip } => match manager.update_host(host, ip).await {
            Ok(updated) => {
                println!("{}", if updated { "updated" } else { "unchanged" });
                Ok(DynDnsExitCode::Success)
            }
            Err(e) if e.is_input_error() => {
                error!("Rejected update of {} to {}: {}", host, ip, e);
                Ok(DynDnsExitCode::RuntimeError)
            }
            Err(e) => Err(e.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const PROVIDER_VARS: &[(&str, &str)] = &[
        ("DYNDNS_CPANEL_HOSTNAME", "cpanel.example.com"),
        ("DYNDNS_CPANEL_USERNAME", "example"),
        ("DYNDNS_CPANEL_PASSWORD", "secret"),
        ("DYNDNS_CPANEL_ZONE", "example.com"),
        ("DYNDNS_CPANEL_SUBDOMAIN", "remote"),
    ];

    #[test]
    fn test_command_parsing() {
        assert_eq!(
            Command::from_args(args(&["read", "office"])).unwrap(),
            Command::Read {
                host: "office".to_string()
            }
        );
        assert_eq!(
            Command::from_args(args(&["update", "office", "10.0.0.5"])).unwrap(),
            Command::Update {
                host: "office".to_string(),
                ip: "10.0.0.5".to_string()
            }
        );
        assert!(Command::from_args(args(&[])).is_err());
        assert!(Command::from_args(args(&["update", "office"])).is_err());
        assert!(Command::from_args(args(&["delete", "office"])).is_err());
    }

    #[test]
    fn test_provider_only_config() {
        let config = load(PROVIDER_VARS).unwrap();
        config.validate().unwrap();

        assert_eq!(config.dyndns.provider.port, 2083);
        assert!(config.dyndns.provider.verify_tls);
        assert_eq!(config.dyndns.provider.subdomain, "remote");
        assert!(config.dyndns.cache.is_none());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_cache_enabled_by_hostname() {
        let mut vars = PROVIDER_VARS.to_vec();
        vars.extend([
            ("DYNDNS_MYSQL_HOSTNAME", "db.internal"),
            ("DYNDNS_MYSQL_PORT", "3307"),
            ("DYNDNS_MYSQL_USERNAME", "dyndns"),
            ("DYNDNS_MYSQL_PASSWORD", "pw"),
            ("DYNDNS_MYSQL_DATABASE", "dns"),
            ("DYNDNS_MYSQL_TABLE", "dynamic_hosts"),
        ]);

        let config = load(&vars).unwrap();
        let cache = config.dyndns.cache.unwrap();
        assert_eq!(cache.hostname, "db.internal");
        assert_eq!(cache.port, Some(3307));
        assert_eq!(cache.table, "dynamic_hosts");
    }

    #[test]
    fn test_missing_or_malformed_values_rejected() {
        assert!(load(&PROVIDER_VARS[1..]).is_err(), "Hostname is required");

        let mut vars = PROVIDER_VARS.to_vec();
        vars.push(("DYNDNS_CPANEL_PORT", "https"));
        assert!(load(&vars).is_err());

        let mut vars = PROVIDER_VARS.to_vec();
        vars.push(("DYNDNS_CPANEL_VERIFY_TLS", "maybe"));
        assert!(load(&vars).is_err());

        let mut vars = PROVIDER_VARS.to_vec();
        vars.push(("DYNDNS_LOG_LEVEL", "chatty"));
        assert!(load(&vars).unwrap().validate().is_err());
    }

    #[test]
    fn test_verify_tls_toggle() {
        let mut vars = PROVIDER_VARS.to_vec();
        vars.push(("DYNDNS_CPANEL_VERIFY_TLS", "false"));
        assert!(!load(&vars).unwrap().dyndns.provider.verify_tls);
    }
}

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::verifier::verdict::VerdictPolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Process settings, read from the environment (and `.env` via `dotenv`).
///
/// | Variable                   | Default      |
/// |----------------------------|--------------|
/// | `BIND_ADDRESS`             | `0.0.0.0`    |
/// | `PORT`                     | `3000`       |
/// | `HELO_NAME`                | `localhost`  |
/// | `SMTP_TIMEOUT_SECS`        | `10`         |
/// | `DNS_TIMEOUT_SECS`         | `3`          |
/// | `CACHE_TTL_SECS`           | `3600`       |
/// | `CACHE_CAPACITY`           | `10000`      |
/// | `VERDICT_POLICY`           | `optimistic` |
/// | `TLS_ACCEPT_INVALID_CERTS` | `true`       |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,
    pub helo_name: String,
    pub smtp_timeout: Duration,
    pub dns_timeout: Duration,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub verdict_policy: VerdictPolicy,
    pub tls_accept_invalid_certs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            helo_name: "localhost".to_string(),
            smtp_timeout: Duration::from_secs(10),
            dns_timeout: Duration::from_secs(3),
            cache_ttl: Duration::from_secs(3600),
            cache_capacity: 10_000,
            verdict_policy: VerdictPolicy::Optimistic,
            tls_accept_invalid_certs: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source; unset or blank
    /// variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            bind_address: get("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parse_or("PORT", get("PORT"), defaults.port)?,
            helo_name: get("HELO_NAME")
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.helo_name),
            smtp_timeout: seconds("SMTP_TIMEOUT_SECS", get("SMTP_TIMEOUT_SECS"), defaults.smtp_timeout)?,
            dns_timeout: seconds("DNS_TIMEOUT_SECS", get("DNS_TIMEOUT_SECS"), defaults.dns_timeout)?,
            cache_ttl: seconds("CACHE_TTL_SECS", get("CACHE_TTL_SECS"), defaults.cache_ttl)?,
            cache_capacity: positive(
                "CACHE_CAPACITY",
                get("CACHE_CAPACITY"),
                defaults.cache_capacity as u64,
            )? as usize,
            verdict_policy: parse_or("VERDICT_POLICY", get("VERDICT_POLICY"), defaults.verdict_policy)?,
            tls_accept_invalid_certs: parse_or(
                "TLS_ACCEPT_INVALID_CERTS",
                get("TLS_ACCEPT_INVALID_CERTS").map(|v| v.to_ascii_lowercase()),
                defaults.tls_accept_invalid_certs,
            )?,
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(err) => Err(ConfigError::Invalid {
                name,
                reason: err.to_string(),
                value,
            }),
        },
    }
}

fn positive(name: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let value = parse_or(name, raw, default)?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

fn seconds(name: &'static str, raw: Option<String>, default: Duration) -> Result<Duration, ConfigError> {
    positive(name, raw, default.as_secs()).map(Duration::from_secs)
}

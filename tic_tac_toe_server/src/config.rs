use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{anyhow, Result};

use crate::game::DisconnectReport;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_PROBE_URL: &str = "https://example.com";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub reap_interval: Duration,
    /// `None` turns the liveness probe off.
    pub probe_url: Option<String>,
    pub probe_timeout: Duration,
    pub disconnect_report: DisconnectReport,
    /// `None` allows any origin.
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
            reap_interval: DEFAULT_REAP_INTERVAL,
            probe_url: Some(DEFAULT_PROBE_URL.to_string()),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            disconnect_report: DisconnectReport::default(),
            cors_origin: Some(DEFAULT_CORS_ORIGIN.to_string()),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();

        let port = parse_or(&lookup, "PORT", defaults.port)?;
        let reap_secs = parse_or(&lookup, "REAP_INTERVAL_SECS", defaults.reap_interval.as_secs())?;
        if reap_secs == 0 {
            return Err(anyhow!("REAP_INTERVAL_SECS must be greater than zero"));
        }
        let probe_timeout_secs = parse_or(
            &lookup,
            "LIVENESS_PROBE_TIMEOUT_SECS",
            defaults.probe_timeout.as_secs(),
        )?;
        let disconnect_report =
            parse_or(&lookup, "DISCONNECT_REPORT", defaults.disconnect_report)?;

        let probe_url = match lookup("LIVENESS_PROBE_URL") {
            Some(url) if url.trim().is_empty() => None,
            Some(url) => Some(url.trim().to_string()),
            None => defaults.probe_url,
        };
        let cors_origin = match lookup("CORS_ORIGIN") {
            Some(origin) if origin.trim() == "*" => None,
            Some(origin) => Some(origin.trim().to_string()),
            None => defaults.cors_origin,
        };

        Ok(ServerConfig {
            port,
            reap_interval: Duration::from_secs(reap_secs),
            probe_url,
            probe_timeout: Duration::from_secs(probe_timeout_secs),
            disconnect_report,
            cors_origin,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err| anyhow!("invalid {} `{}`: {}", key, raw, err)),
        None => Ok(default),
    }
}

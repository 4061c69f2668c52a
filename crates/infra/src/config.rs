//! Configuration loading from the environment.
//!
//! Both services read their settings once at start-up. Values are parsed
//! into typed structs; anything malformed fails fast with [`ConfigError`].
//! `from_lookup` takes the variable source explicitly so tests never touch
//! the process environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::dispatch::UnreachablePolicy;

pub const DEFAULT_API_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_WORKER_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/1";
pub const DEFAULT_WORKER_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            other => Err(format!("expected 'memory' or 'redis', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub redis_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            redis_url: DEFAULT_REDIS_URL.to_string(),
        }
    }
}

/// Settings for the client-facing API service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
    pub worker_base_url: String,
    pub dispatch_timeout: Duration,
    pub unreachable_policy: UnreachablePolicy,
    pub job_ttl: Option<Duration>,
    /// Serve the worker router from the API process as well.
    pub embedded_worker: Option<WorkerConfig>,
}

/// Settings for the worker service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
    pub processing_delay: Duration,
    pub job_ttl: Option<Duration>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dispatch_timeout =
            parse_millis(&lookup, "DISPATCH_TIMEOUT_MS", DEFAULT_DISPATCH_TIMEOUT)?;
        if dispatch_timeout.is_zero() {
            return Err(ConfigError::invalid("DISPATCH_TIMEOUT_MS", "must be > 0"));
        }

        let embedded_worker = if parse_or(&lookup, "EMBEDDED_WORKER", false)? {
            Some(WorkerConfig::from_lookup(&lookup)?)
        } else {
            None
        };

        Ok(Self {
            bind_addr: parse_or(&lookup, "API_BIND_ADDR", default_addr(DEFAULT_API_BIND_ADDR))?,
            store: store_config(&lookup)?,
            worker_base_url: lookup("WORKER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_WORKER_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            dispatch_timeout,
            unreachable_policy: parse_or(
                &lookup,
                "DISPATCH_UNREACHABLE",
                UnreachablePolicy::default(),
            )?,
            job_ttl: job_ttl(&lookup)?,
            embedded_worker,
        })
    }
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_bind = default_addr(DEFAULT_WORKER_BIND_ADDR);
        Ok(Self {
            bind_addr: parse_or(&lookup, "WORKER_BIND_ADDR", default_bind)?,
            store: store_config(&lookup)?,
            processing_delay: parse_millis(
                &lookup,
                "PROCESSING_DELAY_MS",
                DEFAULT_PROCESSING_DELAY,
            )?,
            job_ttl: job_ttl(&lookup)?,
        })
    }
}

fn default_addr(raw: &str) -> SocketAddr {
    raw.parse()
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 0)))
}

fn store_config<F>(lookup: &F) -> Result<StoreConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(StoreConfig {
        backend: parse_or(lookup, "STORE_BACKEND", StoreBackend::Redis)?,
        redis_url: lookup("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
    })
}

fn job_ttl<F>(lookup: &F) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("JOB_TTL_SECS") {
        None => Ok(None),
        Some(raw) => {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("JOB_TTL_SECS", format!("{e}")))?;
            if secs == 0 {
                return Err(ConfigError::invalid("JOB_TTL_SECS", "must be > 0 when set"));
            }
            Ok(Some(Duration::from_secs(secs)))
        }
    }
}

fn parse_millis<F>(
    lookup: &F,
    var: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let ms: Option<u64> = lookup(var)
        .map(|raw| raw.trim().parse().map_err(|e| ConfigError::invalid(var, format!("{e}"))))
        .transpose()?;
    Ok(ms.map(Duration::from_millis).unwrap_or(default))
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: core::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(var, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn api_defaults() {
        let cfg = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.store, StoreConfig::default());
        assert_eq!(cfg.worker_base_url, DEFAULT_WORKER_BASE_URL);
        assert_eq!(cfg.dispatch_timeout, Duration::from_secs(3));
        assert_eq!(cfg.unreachable_policy, UnreachablePolicy::KeepPending);
        assert_eq!(cfg.job_ttl, None);
        assert!(cfg.embedded_worker.is_none());
    }

    #[test]
    fn worker_defaults() {
        let cfg = WorkerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:5000");
        assert_eq!(cfg.processing_delay, Duration::from_secs(1));
    }

    #[test]
    fn api_overrides() {
        let cfg = ApiConfig::from_lookup(lookup(&[
            ("API_BIND_ADDR", "127.0.0.1:9000"),
            ("STORE_BACKEND", "memory"),
            ("WORKER_BASE_URL", "http://worker:5000/"),
            ("DISPATCH_TIMEOUT_MS", "250"),
            ("DISPATCH_UNREACHABLE", "mark_failed"),
            ("JOB_TTL_SECS", "60"),
            ("EMBEDDED_WORKER", "true"),
            ("PROCESSING_DELAY_MS", "0"),
        ]))
        .unwrap();

        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.worker_base_url, "http://worker:5000");
        assert_eq!(cfg.dispatch_timeout, Duration::from_millis(250));
        assert_eq!(cfg.unreachable_policy, UnreachablePolicy::MarkFailed);
        assert_eq!(cfg.job_ttl, Some(Duration::from_secs(60)));

        let worker = cfg.embedded_worker.unwrap();
        assert_eq!(worker.processing_delay, Duration::ZERO);
        assert_eq!(worker.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn rejects_zero_dispatch_timeout() {
        let err = ApiConfig::from_lookup(lookup(&[("DISPATCH_TIMEOUT_MS", "0")])).unwrap_err();
        assert!(err.to_string().contains("DISPATCH_TIMEOUT_MS"));
    }

    #[test]
    fn rejects_unknown_backend_and_policy() {
        assert!(ApiConfig::from_lookup(lookup(&[("STORE_BACKEND", "postgres")])).is_err());
        assert!(ApiConfig::from_lookup(lookup(&[("DISPATCH_UNREACHABLE", "retry")])).is_err());
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(WorkerConfig::from_lookup(lookup(&[("PROCESSING_DELAY_MS", "soon")])).is_err());
        assert!(WorkerConfig::from_lookup(lookup(&[("JOB_TTL_SECS", "0")])).is_err());
    }
}

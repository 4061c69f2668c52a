//! Tracing/logging initialization.
//!
//! Output is JSON by default (one object per line); `LOG_FORMAT=pretty`
//! switches to human-readable lines for local runs. Filtering follows
//! `RUST_LOG`, falling back to `info` for the courier crates.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

fn default_filter() -> EnvFilter {
    EnvFilter::new("warn,courier_api=info,courier_worker=info,courier_infra=info")
}

/// Install the global subscriber for `service`.
///
/// Safe to call multiple times (subsequent calls are no-ops). An unknown
/// `LOG_FORMAT` falls back to JSON.
pub fn init(service: &'static str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());
    let format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default();

    let installed = match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .with_target(false)
            .try_init()
            .is_ok(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok(),
    };

    if installed {
        ::tracing::info!(service, format = ?format, "logging initialized");
    }
}

//! Daemon configuration from `DESKOPS_*` environment variables
//!
//! Every setting has a default; a value that does not parse is logged and
//! replaced by its default rather than aborting startup.

use deskops_api_rpc::RpcServerConfig;
use deskops_core::application::constants::DEFAULT_TELEMETRY_HISTORY;
use deskops_core::application::SampleWindow;
use deskops_core::domain::Platform;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const ENV_RPC_HOST: &str = "DESKOPS_RPC_HOST";
pub const ENV_RPC_PORT: &str = "DESKOPS_RPC_PORT";
pub const ENV_LOG_FORMAT: &str = "DESKOPS_LOG_FORMAT";
pub const ENV_SAMPLE_COUNT: &str = "DESKOPS_SAMPLE_COUNT";
pub const ENV_SAMPLE_WINDOW_MS: &str = "DESKOPS_SAMPLE_WINDOW_MS";
pub const ENV_TELEMETRY_HISTORY: &str = "DESKOPS_TELEMETRY_HISTORY";
pub const ENV_PLATFORM: &str = "DESKOPS_PLATFORM";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaemonConfig {
    pub rpc: RpcServerConfig,
    pub log_format: LogFormat,
    pub sample_window: SampleWindow,
    pub telemetry_history: usize,
    pub platform: Platform,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            rpc: RpcServerConfig::default(),
            log_format: LogFormat::default(),
            sample_window: SampleWindow::default(),
            telemetry_history: DEFAULT_TELEMETRY_HISTORY,
            platform: Platform::current(),
        }
    }
}

impl DaemonConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup(ENV_RPC_HOST)
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or(defaults.rpc.host);
        let port = parse_or(&lookup, ENV_RPC_PORT, defaults.rpc.port);

        let count = parse_positive(&lookup, ENV_SAMPLE_COUNT, defaults.sample_window.count);
        let window_ms = parse_positive(
            &lookup,
            ENV_SAMPLE_WINDOW_MS,
            defaults.sample_window.window.as_millis() as u64,
        );

        Self {
            rpc: RpcServerConfig { host, port },
            log_format: parse_or(&lookup, ENV_LOG_FORMAT, defaults.log_format),
            sample_window: SampleWindow {
                count,
                window: Duration::from_millis(window_ms),
                sample_timeout: defaults.sample_window.sample_timeout,
            },
            telemetry_history: parse_positive(
                &lookup,
                ENV_TELEMETRY_HISTORY,
                defaults.telemetry_history,
            ),
            platform: parse_or(&lookup, ENV_PLATFORM, defaults.platform),
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(key = %key, value = %raw, "Invalid value, using default");
                default
            }
        },
    }
}

fn parse_positive<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + PartialOrd + Default + Copy,
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default);
    if value > T::default() {
        return value;
    }
    warn!(key = %key, "Value must be positive, using default");
    default
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> DaemonConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DaemonConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.rpc.host, "127.0.0.1");
        assert_eq!(config.rpc.port, 9531);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.sample_window.count, 8);
        assert_eq!(config.sample_window.window, Duration::from_millis(2000));
        assert_eq!(config.telemetry_history, 32);
        assert_eq!(config.platform, Platform::current());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            (ENV_RPC_PORT, "7000"),
            (ENV_LOG_FORMAT, "JSON"),
            (ENV_SAMPLE_COUNT, "4"),
            (ENV_SAMPLE_WINDOW_MS, "500"),
            (ENV_TELEMETRY_HISTORY, "5"),
            (ENV_PLATFORM, "darwin"),
        ]);
        assert_eq!(config.rpc.port, 7000);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.sample_window.interval(), Duration::from_millis(125));
        assert_eq!(config.telemetry_history, 5);
        assert_eq!(config.platform, Platform::Macos);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config(&[
            (ENV_RPC_PORT, "not-a-port"),
            (ENV_SAMPLE_COUNT, "0"),
            (ENV_TELEMETRY_HISTORY, "-3"),
            (ENV_PLATFORM, "beos"),
            (ENV_RPC_HOST, "  "),
        ]);
        assert_eq!(config.rpc.port, 9531);
        assert_eq!(config.rpc.host, "127.0.0.1");
        assert_eq!(config.sample_window.count, 8);
        assert_eq!(config.telemetry_history, 32);
        assert_eq!(config.platform, Platform::current());
    }
}

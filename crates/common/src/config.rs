use std::time::Duration;

use crate::SourceMode;

pub const DEFAULT_FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";

/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Indicator source
    pub source_mode: SourceMode,
    /// Only `Some` in live mode.
    pub finnhub_api_key: Option<String>,
    pub finnhub_base_url: String,
    pub fetch_timeout: Duration,

    // Scheduler
    pub cycle_interval: Duration,

    // Signal config file path
    pub signal_config_path: String,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let source_mode = match lookup("INDICATOR_SOURCE")
            .unwrap_or_else(|| "live".to_string())
            .to_lowercase()
            .as_str()
        {
            "live" => SourceMode::Live,
            "simulated" => SourceMode::Simulated,
            other => panic!(
                "ERROR: INDICATOR_SOURCE must be 'live' or 'simulated', got: '{other}'"
            ),
        };

        let finnhub_api_key = match source_mode {
            SourceMode::Live => Some(lookup("FINNHUB_API_KEY").unwrap_or_else(|| {
                panic!(
                    "Required environment variable 'FINNHUB_API_KEY' is not set. Check your .env file."
                )
            })),
            SourceMode::Simulated => lookup("FINNHUB_API_KEY"),
        };

        Config {
            source_mode,
            finnhub_api_key,
            finnhub_base_url: lookup("FINNHUB_BASE_URL")
                .unwrap_or_else(|| DEFAULT_FINNHUB_BASE_URL.to_string()),
            fetch_timeout: Duration::from_secs(secs(&lookup, "FETCH_TIMEOUT_SECS", 10)),
            cycle_interval: Duration::from_secs(secs(&lookup, "CYCLE_INTERVAL_SECS", 60)),
            signal_config_path: lookup("SIGNAL_CONFIG_PATH")
                .unwrap_or_else(|| "config/signals.toml".to_string()),
        }
    }
}

fn secs<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(0) | Err(_) => panic!("{key} must be a positive whole number of seconds, got: '{raw}'"),
            Ok(v) => v,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn live_defaults() {
        let cfg = Config::from_lookup(lookup(&[("FINNHUB_API_KEY", "abc")]));
        assert_eq!(cfg.source_mode, SourceMode::Live);
        assert_eq!(cfg.finnhub_api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.finnhub_base_url, DEFAULT_FINNHUB_BASE_URL);
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(10));
        assert_eq!(cfg.cycle_interval, Duration::from_secs(60));
        assert_eq!(cfg.signal_config_path, "config/signals.toml");
    }

    #[test]
    fn simulated_mode_does_not_need_api_key() {
        let cfg = Config::from_lookup(lookup(&[
            ("INDICATOR_SOURCE", "Simulated"),
            ("CYCLE_INTERVAL_SECS", "5"),
        ]));
        assert_eq!(cfg.source_mode, SourceMode::Simulated);
        assert!(cfg.finnhub_api_key.is_none());
        assert_eq!(cfg.cycle_interval, Duration::from_secs(5));
    }

    #[test]
    #[should_panic(expected = "FINNHUB_API_KEY")]
    fn live_mode_requires_api_key() {
        Config::from_lookup(lookup(&[]));
    }

    #[test]
    #[should_panic(expected = "INDICATOR_SOURCE")]
    fn unknown_source_mode_panics() {
        Config::from_lookup(lookup(&[("INDICATOR_SOURCE", "paper")]));
    }

    #[test]
    #[should_panic(expected = "CYCLE_INTERVAL_SECS")]
    fn zero_interval_panics() {
        Config::from_lookup(lookup(&[
            ("INDICATOR_SOURCE", "simulated"),
            ("CYCLE_INTERVAL_SECS", "0"),
        ]));
    }
}

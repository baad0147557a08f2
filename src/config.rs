//! Configuration module

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants;
use crate::error::ConfigError;
use crate::feed::{EngineSettings, RiskThresholds};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream traffic feed endpoint
    pub source_url: String,

    /// Poll period
    pub poll_interval: Duration,

    /// Upper bound for one fetch
    pub fetch_timeout: Duration,

    /// Longest delay between polls while the source keeps failing
    pub max_backoff: Duration,

    /// Packet-count risk tiers
    pub risk: RiskThresholds,

    /// Consecutive failures before reporting degraded service
    pub degraded_after: u32,

    /// Page size when a query omits `limit`
    pub default_page_size: usize,

    /// Largest accepted `limit`
    pub max_page_size: usize,

    /// Server bind address
    pub host: String,

    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let poll_interval_ms: u64 =
            parse_var(&lookup, "FEED_POLL_INTERVAL_MS", constants::DEFAULT_POLL_INTERVAL_MS)?;
        let fetch_timeout_ms: u64 =
            parse_var(&lookup, "FEED_FETCH_TIMEOUT_MS", constants::DEFAULT_FETCH_TIMEOUT_MS)?;
        let max_backoff_ms: u64 = parse_var(&lookup, "FEED_MAX_BACKOFF_MS", poll_interval_ms)?;

        non_zero("FEED_POLL_INTERVAL_MS", poll_interval_ms)?;
        non_zero("FEED_FETCH_TIMEOUT_MS", fetch_timeout_ms)?;

        if max_backoff_ms < poll_interval_ms {
            return Err(ConfigError::Backoff {
                backoff_ms: max_backoff_ms,
                interval_ms: poll_interval_ms,
            });
        }

        // Explicit packet thresholds override the preset
        let preset = match lookup("FEED_RISK_PRESET") {
            None => RiskThresholds::default(),
            Some(name) => RiskThresholds::preset(&name).ok_or(ConfigError::Invalid {
                key: "FEED_RISK_PRESET",
                value: name,
            })?,
        };
        let risk = RiskThresholds {
            high_above: parse_var(&lookup, "FEED_RISK_HIGH_PACKETS", preset.high_above)?,
            moderate_above: parse_var(&lookup, "FEED_RISK_MODERATE_PACKETS", preset.moderate_above)?,
        };
        risk.validate()?;

        let default_page_size: usize =
            parse_var(&lookup, "FEED_DEFAULT_PAGE_SIZE", constants::DEFAULT_PAGE_SIZE)?;
        let max_page_size: usize =
            parse_var(&lookup, "FEED_MAX_PAGE_SIZE", constants::DEFAULT_MAX_PAGE_SIZE)?;
        non_zero("FEED_DEFAULT_PAGE_SIZE", default_page_size as u64)?;
        if default_page_size > max_page_size {
            return Err(ConfigError::PageSize {
                default: default_page_size,
                max: max_page_size,
            });
        }

        Ok(Self {
            source_url: lookup("FEED_SOURCE_URL")
                .unwrap_or_else(|| constants::DEFAULT_SOURCE_URL.to_string()),
            poll_interval: Duration::from_millis(poll_interval_ms),
            fetch_timeout: Duration::from_millis(fetch_timeout_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
            risk,
            degraded_after: parse_var(&lookup, "FEED_DEGRADED_AFTER", constants::DEFAULT_DEGRADED_AFTER)?,
            default_page_size,
            max_page_size,
            host: lookup("HOST").unwrap_or_else(|| constants::DEFAULT_HOST.to_string()),
            port: parse_var(&lookup, "PORT", constants::DEFAULT_PORT)?,
        })
    }

    /// Settings handed to the feed engine
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            poll_interval: self.poll_interval,
            fetch_timeout: self.fetch_timeout,
            max_backoff: self.max_backoff,
            risk: self.risk.clone(),
            max_page_size: self.max_page_size,
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn non_zero(key: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::Zero { key })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.source_url, "http://127.0.0.1:8000/traffic");
        assert_eq!(config.poll_interval, Duration::from_millis(2000));
        assert_eq!(config.max_backoff, config.poll_interval);
        assert_eq!(config.risk.high_above, 1000);
        assert_eq!(config.risk.moderate_above, 500);
        assert_eq!(config.degraded_after, 1);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("FEED_SOURCE_URL", "http://feed.local/flows"),
            ("FEED_POLL_INTERVAL_MS", "500"),
            ("FEED_MAX_BACKOFF_MS", "8000"),
            ("FEED_DEGRADED_AFTER", "5"),
        ])
        .unwrap();
        assert_eq!(config.source_url, "http://feed.local/flows");
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.max_backoff, Duration::from_millis(8000));
        assert_eq!(config.degraded_after, 5);
    }

    #[test]
    fn test_unparsable_interval_is_fatal() {
        let err = config_from(&[("FEED_POLL_INTERVAL_MS", "two seconds")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "FEED_POLL_INTERVAL_MS",
                value: "two seconds".to_string()
            }
        );
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = config_from(&[("FEED_POLL_INTERVAL_MS", "0")]).unwrap_err();
        assert_eq!(err, ConfigError::Zero { key: "FEED_POLL_INTERVAL_MS" });
    }

    #[test]
    fn test_inverted_risk_thresholds_rejected() {
        let err = config_from(&[
            ("FEED_RISK_HIGH_PACKETS", "100"),
            ("FEED_RISK_MODERATE_PACKETS", "200"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::RiskThresholds { moderate: 200, high: 100 });
    }

    #[test]
    fn test_backoff_below_interval_rejected() {
        let err = config_from(&[
            ("FEED_POLL_INTERVAL_MS", "2000"),
            ("FEED_MAX_BACKOFF_MS", "500"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::Backoff { backoff_ms: 500, interval_ms: 2000 });
    }

    #[test]
    fn test_risk_preset() {
        let config = config_from(&[("FEED_RISK_PRESET", "high")]).unwrap();
        assert_eq!(config.risk, RiskThresholds::high_sensitivity());

        // Explicit threshold wins over the preset value
        let config = config_from(&[
            ("FEED_RISK_PRESET", "low"),
            ("FEED_RISK_MODERATE_PACKETS", "100"),
        ])
        .unwrap();
        assert_eq!(config.risk.high_above, 5_000);
        assert_eq!(config.risk.moderate_above, 100);

        let err = config_from(&[("FEED_RISK_PRESET", "extreme")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "FEED_RISK_PRESET",
                value: "extreme".to_string()
            }
        );
    }

    #[test]
    fn test_page_size_above_max_rejected() {
        let err = config_from(&[
            ("FEED_DEFAULT_PAGE_SIZE", "50"),
            ("FEED_MAX_PAGE_SIZE", "20"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::PageSize { default: 50, max: 20 });
    }
}

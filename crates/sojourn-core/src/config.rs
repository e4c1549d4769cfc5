//! Config - engine settings per deployment mode
//!
//! `Config::for_mode` gives the defaults; a YAML file only needs the keys it
//! wants to change. Durations are written in milliseconds:
//!
//! ```yaml
//! mode: development
//! poll_interval_ms: 250
//! batch_size: 10
//! rng_seed: 42
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::domain::outcome::duration_ms;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentMode {
    #[default]
    Production,
    Development,
}

impl std::str::FromStr for DeploymentMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" | "prod" => Ok(DeploymentMode::Production),
            "development" | "dev" => Ok(DeploymentMode::Development),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unknown deployment mode '{0}'")]
    UnknownMode(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub mode: DeploymentMode,

    /// Delay between the end of one poll and the start of the next.
    #[serde(rename = "poll_interval_ms", with = "duration_ms")]
    pub poll_interval: Duration,
    #[serde(rename = "poll_startup_delay_ms", with = "duration_ms")]
    pub poll_startup_delay: Duration,
    pub batch_size: usize,

    /// Handlers taking longer than this are logged as slow.
    #[serde(rename = "handler_budget_ms", with = "duration_ms")]
    pub handler_budget: Duration,
    #[serde(rename = "ticker_slow_threshold_ms", with = "duration_ms")]
    pub ticker_slow_threshold: Duration,

    #[serde(rename = "collector_ttl_ms", with = "duration_ms")]
    pub collector_ttl: Duration,
    #[serde(rename = "collector_sweep_interval_ms", with = "duration_ms")]
    pub collector_sweep_interval: Duration,

    pub rng_seed: Option<u64>,
}

impl Config {
    pub fn for_mode(mode: DeploymentMode) -> Self {
        match mode {
            DeploymentMode::Production => Self {
                mode,
                poll_interval: Duration::from_secs(5),
                poll_startup_delay: Duration::from_secs(10),
                batch_size: 5,
                handler_budget: Duration::from_millis(500),
                ticker_slow_threshold: Duration::from_millis(100),
                collector_ttl: Duration::from_secs(5 * 60),
                collector_sweep_interval: Duration::from_secs(30),
                rng_seed: None,
            },
            DeploymentMode::Development => Self {
                mode,
                poll_interval: Duration::from_millis(500),
                poll_startup_delay: Duration::from_secs(1),
                batch_size: 5,
                handler_budget: Duration::from_millis(500),
                ticker_slow_threshold: Duration::from_millis(100),
                collector_ttl: Duration::from_secs(30),
                collector_sweep_interval: Duration::from_secs(5),
                rng_seed: None,
            },
        }
    }

    /// Parse YAML on top of the defaults of the mode it names (production
    /// when absent).
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(yaml)?;
        let mode = raw.mode.unwrap_or_default();
        raw.overlay(Config::for_mode(mode)).validate()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn with_rng_seed(mut self, seed: Option<u64>) -> Self {
        self.rng_seed = seed;
        self
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Zero("batch_size"));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Zero("poll_interval_ms"));
        }
        if self.collector_sweep_interval.is_zero() {
            return Err(ConfigError::Zero("collector_sweep_interval_ms"));
        }
        Ok(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::for_mode(DeploymentMode::default())
    }
}

/// What a YAML file may set. Missing keys keep the mode default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    mode: Option<DeploymentMode>,
    poll_interval_ms: Option<u64>,
    poll_startup_delay_ms: Option<u64>,
    batch_size: Option<usize>,
    handler_budget_ms: Option<u64>,
    ticker_slow_threshold_ms: Option<u64>,
    collector_ttl_ms: Option<u64>,
    collector_sweep_interval_ms: Option<u64>,
    rng_seed: Option<u64>,
}

impl RawConfig {
    fn overlay(self, mut config: Config) -> Config {
        let ms = Duration::from_millis;
        if let Some(v) = self.poll_interval_ms {
            config.poll_interval = ms(v);
        }
        if let Some(v) = self.poll_startup_delay_ms {
            config.poll_startup_delay = ms(v);
        }
        if let Some(v) = self.batch_size {
            config.batch_size = v;
        }
        if let Some(v) = self.handler_budget_ms {
            config.handler_budget = ms(v);
        }
        if let Some(v) = self.ticker_slow_threshold_ms {
            config.ticker_slow_threshold = ms(v);
        }
        if let Some(v) = self.collector_ttl_ms {
            config.collector_ttl = ms(v);
        }
        if let Some(v) = self.collector_sweep_interval_ms {
            config.collector_sweep_interval = ms(v);
        }
        if self.rng_seed.is_some() {
            config.rng_seed = self.rng_seed;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DeploymentMode::Production, 5_000, 10_000, 300_000)]
    #[case(DeploymentMode::Development, 500, 1_000, 30_000)]
    fn mode_defaults(
        #[case] mode: DeploymentMode,
        #[case] poll_ms: u64,
        #[case] startup_ms: u64,
        #[case] ttl_ms: u64,
    ) {
        let config = Config::for_mode(mode);
        assert_eq!(config.poll_interval, Duration::from_millis(poll_ms));
        assert_eq!(config.poll_startup_delay, Duration::from_millis(startup_ms));
        assert_eq!(config.collector_ttl, Duration::from_millis(ttl_ms));
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.handler_budget, Duration::from_millis(500));
        assert_eq!(config.ticker_slow_threshold, Duration::from_millis(100));
        assert_eq!(config.rng_seed, None);
    }

    #[test]
    fn yaml_overlays_the_named_mode() {
        let config = Config::from_yaml_str(
            "mode: development\npoll_interval_ms: 250\nbatch_size: 10\nrng_seed: 42\n",
        )
        .unwrap();

        assert_eq!(config.mode, DeploymentMode::Development);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.rng_seed, Some(42));
        // untouched keys keep the development defaults
        assert_eq!(config.collector_ttl, Duration::from_secs(30));
    }

    #[test]
    fn empty_yaml_is_production() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[rstest]
    #[case("batch_size: 0")]
    #[case("poll_interval_ms: 0")]
    fn zero_values_are_rejected(#[case] yaml: &str) {
        assert!(matches!(
            Config::from_yaml_str(yaml),
            Err(ConfigError::Zero(_))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Config::from_yaml_str("pol_interval_ms: 5"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn modes_parse_from_flags() {
        assert_eq!("dev".parse::<DeploymentMode>().unwrap(), DeploymentMode::Development);
        assert_eq!(
            "production".parse::<DeploymentMode>().unwrap(),
            DeploymentMode::Production
        );
        assert!("staging".parse::<DeploymentMode>().is_err());
    }

    #[test]
    fn load_reports_the_path() {
        let err = Config::load("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}

use config::{Config, Environment};
use serde::{Deserialize, Serialize};

use crate::error::{check_probability, Result};

/// Ring capacity used when nothing else is configured.
pub const DEFAULT_MAX_SAMPLES: usize = 10_000;

/// Record every tick unless told otherwise.
pub const DEFAULT_SAMPLE_PROBABILITY: f64 = 1.0;

/// Prefix for the `TICK_TIMING_*` environment variables.
const ENV_PREFIX: &str = "TICK_TIMING";

/// Instrumentation configuration, replaced wholesale on every `enable`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Ring capacity; 0 keeps the ring permanently empty
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,

    /// Chance of recording any given tick, within [0.0, 1.0]
    #[serde(default = "default_sample_probability")]
    pub sample_probability: f64,

    /// Fixes the sampling gate's generator, for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_max_samples() -> usize {
    DEFAULT_MAX_SAMPLES
}
fn default_sample_probability() -> f64 {
    DEFAULT_SAMPLE_PROBABILITY
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
            sample_probability: DEFAULT_SAMPLE_PROBABILITY,
            seed: None,
        }
    }
}

impl TimingConfig {
    pub fn new(max_samples: usize, sample_probability: f64) -> Self {
        Self {
            max_samples,
            sample_probability,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_probability(self.sample_probability).map(|_| ())
    }

    /// Load from `TICK_TIMING_MAX_SAMPLES`, `TICK_TIMING_SAMPLE_PROBABILITY`
    /// and `TICK_TIMING_SEED`, after pulling in a `.env` file if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let s = Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let cfg: Self = s.try_deserialize()?;
        cfg.validate()?;
        tracing::debug!(?cfg, "loaded tick timing settings from environment");
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimingError;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("TICK_TIMING_MAX_SAMPLES");
        std::env::remove_var("TICK_TIMING_SAMPLE_PROBABILITY");
        std::env::remove_var("TICK_TIMING_SEED");
    }

    #[test]
    #[serial]
    fn test_defaults_when_env_is_empty() {
        clear_env();
        let cfg = TimingConfig::from_env().expect("defaults should load");
        assert_eq!(cfg, TimingConfig::default());
    }

    #[test]
    #[serial]
    fn test_load_from_env() {
        clear_env();
        std::env::set_var("TICK_TIMING_MAX_SAMPLES", "2");
        std::env::set_var("TICK_TIMING_SAMPLE_PROBABILITY", "0.25");
        std::env::set_var("TICK_TIMING_SEED", "99");

        let cfg = TimingConfig::from_env().expect("Failed to load settings");
        assert_eq!(cfg.max_samples, 2);
        assert_eq!(cfg.sample_probability, 0.25);
        assert_eq!(cfg.seed, Some(99));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_probability_out_of_range() {
        clear_env();
        std::env::set_var("TICK_TIMING_SAMPLE_PROBABILITY", "1.5");

        let err = TimingConfig::from_env().unwrap_err();
        assert!(matches!(err, TimingError::InvalidConfiguration { .. }));

        clear_env();
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let cfg: TimingConfig = serde_json::from_str(r#"{"sample_probability": 0.0}"#).unwrap();
        assert_eq!(cfg.max_samples, DEFAULT_MAX_SAMPLES);
        assert_eq!(cfg.sample_probability, 0.0);
        assert_eq!(cfg.seed, None);
    }
}

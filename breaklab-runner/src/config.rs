//! Serializable backtest configuration.

use breaklab_core::{Resolution, RiskParams, SimConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Serializable configuration for a single backtest run.
///
/// Captures everything needed to reproduce the run: risk parameters,
/// capital, the slippage model, and the resolution layout. Two identical
/// configs hash to the same `RunId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub risk: RiskParams,

    /// Starting account equity.
    pub initial_capital: f64,

    /// Fixed half-spread applied against the trader on every fill.
    pub half_spread: f64,

    /// Resolution of the input feed.
    pub base_resolution: Resolution,

    /// Coarser resolutions the aggregator derives.
    pub aggregate_resolutions: Vec<Resolution>,

    /// Resolution whose SMA gates entries; `None` disables the filter.
    pub trend_resolution: Option<Resolution>,
}

impl Default for RunConfig {
    fn default() -> Self {
        let sim = SimConfig::default();
        Self {
            risk: sim.risk,
            initial_capital: sim.initial_capital,
            half_spread: sim.half_spread,
            base_resolution: sim.base_resolution,
            aggregate_resolutions: sim.aggregate_resolutions,
            trend_resolution: sim.trend_resolution,
        }
    }
}

impl RunConfig {
    /// Computes a deterministic hash ID for this configuration, enabling
    /// stable artifact directories and sweep result lookups.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Load a config from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run meaningfully.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ConfigError::Invalid(
                "initial_capital must be a positive finite number".into(),
            ));
        }
        if !(self.half_spread.is_finite() && self.half_spread >= 0.0) {
            return Err(ConfigError::Invalid(
                "half_spread must be a non-negative finite price offset".into(),
            ));
        }
        if !(self.risk.risk_fraction > 0.0 && self.risk.risk_fraction < 1.0) {
            return Err(ConfigError::Invalid(
                "risk_fraction must be in (0, 1)".into(),
            ));
        }
        if self.risk.lookback == 0 || self.risk.atr_period == 0 || self.risk.trend_filter_period == 0
        {
            return Err(ConfigError::Invalid(
                "lookback, atr_period and trend_filter_period must be >= 1".into(),
            ));
        }
        if !(self.risk.atr_mult_stop.is_finite() && self.risk.atr_mult_stop > 0.0) {
            return Err(ConfigError::Invalid("atr_mult_stop must be > 0".into()));
        }
        if !(self.risk.reward_to_risk.is_finite() && self.risk.reward_to_risk > 0.0) {
            return Err(ConfigError::Invalid("reward_to_risk must be > 0".into()));
        }
        Ok(())
    }

    pub fn to_sim_config(&self) -> SimConfig {
        SimConfig {
            risk: self.risk.clone(),
            initial_capital: self.initial_capital,
            half_spread: self.half_spread,
            base_resolution: self.base_resolution,
            aggregate_resolutions: self.aggregate_resolutions.clone(),
            trend_resolution: self.trend_resolution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_is_deterministic() {
        let config = RunConfig::default();
        assert_eq!(config.run_id(), config.run_id());
        assert!(!config.run_id().is_empty());
    }

    #[test]
    fn run_id_changes_with_params() {
        let config = RunConfig::default();
        let mut other = config.clone();
        other.risk.lookback = 50;
        assert_ne!(config.run_id(), other.run_id());
    }

    #[test]
    fn toml_roundtrip() {
        let config = RunConfig::default();
        let text = toml::to_string(&config).unwrap();
        let deser: RunConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, deser);
    }

    #[test]
    fn toml_risk_section_is_optional() {
        let config: RunConfig = toml::from_str(
            r#"
            initial_capital = 10000.0
            half_spread = 0.1
            base_resolution = "5m"
            aggregate_resolutions = ["15m", "1h", "4h", "1d"]
            trend_resolution = "1h"
            "#,
        )
        .unwrap();
        assert_eq!(config.risk, RiskParams::default());
        assert_eq!(config.trend_resolution, Some(Resolution::Hour1));
    }

    #[test]
    fn validate_rejects_bad_capital() {
        let mut config = RunConfig::default();
        config.initial_capital = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_risk_fraction_out_of_range() {
        let mut config = RunConfig::default();
        config.risk.risk_fraction = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_windows() {
        let mut config = RunConfig::default();
        config.risk.lookback = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_default() {
        assert!(RunConfig::default().validate().is_ok());
    }
}

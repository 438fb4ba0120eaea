//! Configuration management with TOML support.
//!
//! Provides the reward calibration config plus a top-level application
//! config with load/save capabilities.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CodenamesError, Result};

/// Reward calibration configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// KL divergence penalty coefficient.
    pub kl_coeff: f64,
    /// Calibrated probability is kept inside `[margin, 1 - margin]`.
    pub probability_margin: f64,
    /// Reuse reward values across samples through the shared memo table.
    pub memoize: bool,
    /// Score samples of a batch on the rayon thread pool.
    pub parallel: bool,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            kl_coeff: 0.1,
            probability_margin: 1e-3,
            memoize: true,
            parallel: true,
        }
    }
}

impl RewardConfig {
    /// Validate reward configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.kl_coeff.is_finite() || self.kl_coeff <= 0.0 {
            return Err(CodenamesError::InvalidConfig(format!(
                "kl_coeff must be finite and > 0, got {}",
                self.kl_coeff
            )));
        }
        if !(self.probability_margin > 0.0 && self.probability_margin < 0.5) {
            return Err(CodenamesError::InvalidConfig(format!(
                "probability_margin must be in (0, 0.5), got {}",
                self.probability_margin
            )));
        }
        Ok(())
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Reward calibration config.
    pub reward: RewardConfig,
    /// Logging level (debug, info, warn, error).
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reward: RewardConfig::default(),
            log_level: "info".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CodenamesError::Other(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.validate()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| CodenamesError::Other(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Validate all sub-configs.
    pub fn validate(&self) -> Result<()> {
        self.reward.validate()?;
        if !matches!(
            self.log_level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(CodenamesError::InvalidConfig(format!(
                "unknown log_level {:?}",
                self.log_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs_are_valid() {
        RewardConfig::default().validate().unwrap();
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn test_non_positive_kl_rejected() {
        let cfg = RewardConfig {
            kl_coeff: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = RewardConfig {
            kl_coeff: f64::NAN,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_margin_bounds() {
        for margin in [0.0, 0.5, -0.1, f64::NAN] {
            let cfg = RewardConfig {
                probability_margin: margin,
                ..Default::default()
            };
            assert!(cfg.validate().is_err(), "margin {} accepted", margin);
        }
    }

    #[test]
    fn test_config_roundtrip() {
        let cfg = AppConfig {
            reward: RewardConfig {
                kl_coeff: 0.05,
                parallel: false,
                ..Default::default()
            },
            log_level: "debug".into(),
        };
        let tmp = tempfile::NamedTempFile::new().unwrap();
        cfg.save(tmp.path()).unwrap();
        let loaded = AppConfig::from_file(tmp.path()).unwrap();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("[reward]\nkl_coeff = 0.2\n").unwrap();
        assert_eq!(cfg.reward.kl_coeff, 0.2);
        assert_eq!(cfg.reward.probability_margin, 1e-3);
        assert_eq!(cfg.log_level, "info");
    }
}

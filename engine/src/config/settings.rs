// Indicator settings, loaded from a JSON config file or the embedded defaults
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::EngineError;
use crate::indicators::Precision;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct IndicatorSettings {
    /// SMA windows drawn on the candlestick chart.
    pub sma_windows: Vec<usize>,
    pub precision: Precision,
    /// Reject malformed bar series instead of computing over them.
    pub validate: bool,
    /// Fractional margin an MA cross must clear.
    pub signal_threshold: f64,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        IndicatorSettings {
            sma_windows: vec![5, 10, 20, 30, 60],
            precision: Precision::Legacy,
            validate: false,
            signal_threshold: 0.02,
        }
    }
}

impl IndicatorSettings {
    pub fn load_default() -> Result<Self, EngineError> {
        let config_str = include_str!("../../assets/config/default.json");
        Self::from_json(config_str)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path).inspect_err(|e| {
            tracing::error!(path = %path.display(), error_detail = %e, "Failed to read indicator settings");
        })?;
        Self::from_json(&config_str)
    }

    pub fn from_json(config_str: &str) -> Result<Self, EngineError> {
        let settings: IndicatorSettings = serde_json::from_str(config_str)
            .map_err(|e| EngineError::ConfigError(format!("Invalid indicator settings: {}", e)))?;
        settings.check()?;
        Ok(settings)
    }

    fn check(&self) -> Result<(), EngineError> {
        if self.sma_windows.contains(&0) {
            return Err(EngineError::ConfigError("SMA windows must be at least 1".to_string()));
        }
        if !self.signal_threshold.is_finite() || !(0.0..1.0).contains(&self.signal_threshold) {
            return Err(EngineError::ConfigError(format!(
                "signal_threshold must be in [0, 1), got {}",
                self.signal_threshold
            )));
        }
        Ok(())
    }
}

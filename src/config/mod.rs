pub mod analyzer;
pub mod detector;
pub mod log;
pub mod reference;

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
pub use analyzer::AnalyzerConfig;
pub use analyzer::MAX_HISTORY_DAYS;
pub use detector::DetectorConfig;
pub use log::LogRotation;
pub use log::LoggingConfig;
pub use reference::LabeledAddress;
pub use reference::ReferenceConfig;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analyzer: AnalyzerConfig,
    pub detector: DetectorConfig,
    pub reference: ReferenceConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_toml_str(config_str: &str) -> crate::Result<Self> {
        let config: Config = toml::from_str(config_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.analyzer.max_concurrent_requests == 0 {
            return Err(ConfigError::InvalidValue {
                field: "analyzer.max_concurrent_requests".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0..=MAX_HISTORY_DAYS).contains(&self.analyzer.history_days) {
            return Err(ConfigError::InvalidValue {
                field: "analyzer.history_days".to_string(),
                reason: format!("must be within [0, {}]", MAX_HISTORY_DAYS),
            });
        }
        if !(0.0..=1.0).contains(&self.detector.layering_amount_tolerance) {
            return Err(ConfigError::InvalidValue {
                field: "detector.layering_amount_tolerance".to_string(),
                reason: "must be within [0, 1]".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.detector.similarity_candidate_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "detector.similarity_candidate_threshold".to_string(),
                reason: "must be within [0, 1]".to_string(),
            });
        }
        Ok(())
    }
}

pub fn load_config(path: impl AsRef<Path>) -> crate::Result<Config> {
    let path = path.as_ref();
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::OpenFileError(format!("{}: {}", path.display(), e)))?;
    Config::from_toml_str(&config_str)
}

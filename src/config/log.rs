use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// How often the log files roll over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Root of the `debug/` and `error/` log trees.
    pub directory: PathBuf,
    pub rotation: LogRotation,
    /// Prefix each line with the emitting `file:line`.
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(".logs"),
            rotation: LogRotation::Daily,
            source_location: true,
        }
    }
}

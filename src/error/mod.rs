pub mod analysis;
pub mod config;

pub use analysis::AnalysisError;
pub use anyhow::Context;
pub use anyhow::Error;
pub use anyhow::Result;
pub use anyhow::anyhow;
pub use config::ConfigError;

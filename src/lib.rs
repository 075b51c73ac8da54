pub mod config;
pub mod constants;
pub mod datasource;
pub mod detector;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod graph;
pub mod model;
pub mod risk;
pub mod tracing;
pub mod utils;

pub use engine::AnalysisEngine;
pub use error::*;

// Test utilities - only compiled during testing
#[cfg(test)]
pub mod test_utils {
    pub mod fixtures;
    pub mod mocks;
}

// Transaction builders shared with integration tests and replay fixtures
#[cfg(any(test, feature = "testing"))]
pub mod testing;

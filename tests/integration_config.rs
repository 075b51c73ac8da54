use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;

use muhaqqiq::AnalysisEngine;
use muhaqqiq::config::Config;
use muhaqqiq::config::LogRotation;
use muhaqqiq::config::load_config;
use muhaqqiq::constants::BINANCE_1;
use muhaqqiq::datasource::InMemoryProvider;
use muhaqqiq::tracing::setup_tracing;

const FULL_CONFIG: &str = r#"
[analyzer]
max_depth = 2
history_days = 30
max_signatures_to_check = 250
max_concurrent_requests = 4

[detector]
exchange_materiality_threshold = 5000
layering_window_secs = 1800

[[reference.mixers]]
address = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin"
label = "Test Mixer"

[logging]
directory = ".logs-test"
rotation = "hourly"
"#;

#[test]
fn parses_every_section() {
    let config = Config::from_toml_str(FULL_CONFIG).unwrap();

    assert_eq!(config.analyzer.max_depth, 2);
    assert_eq!(config.analyzer.history_days, 30);
    assert_eq!(config.analyzer.max_concurrent_requests, 4);
    assert_eq!(config.detector.exchange_materiality_threshold, 5000);
    assert_eq!(config.detector.layering_window_secs, 1800);
    // untouched fields keep their defaults
    assert_eq!(config.detector.layering_amount_tolerance, 0.2);
    assert_eq!(config.reference.mixers.len(), 1);
    assert_eq!(config.logging.directory, std::path::PathBuf::from(".logs-test"));
    assert_eq!(config.logging.rotation, LogRotation::Hourly);
    assert!(config.logging.source_location);
}

#[test]
fn empty_config_is_all_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.analyzer.max_depth, 3);
    assert_eq!(config.analyzer.history_days, 90);
    assert_eq!(config.detector.similarity_candidate_threshold, 0.7);
}

#[rstest]
#[case("[analyzer]\nmax_concurrent_requests = 0")]
#[case("[detector]\nlayering_amount_tolerance = 1.5")]
#[case("[detector]\nsimilarity_candidate_threshold = -0.1")]
#[case("[analyzer\nmax_depth = 2")]
#[case("[analyzer]\nhistory_days = 9223372036854775807")]
#[case("[analyzer]\nhistory_days = -1")]
#[case("[logging]\nrotation = \"weekly\"")]
fn rejects_invalid_config(#[case] source: &str) {
    assert!(Config::from_toml_str(source).is_err());
}

#[test]
fn missing_file_is_an_error() {
    assert!(load_config("does-not-exist/Config.toml").is_err());
}

#[test]
fn engine_rejects_invalid_reference_address() {
    let mut config = Config::default();
    config.reference.exchanges.push(muhaqqiq::config::LabeledAddress {
        address: "not-an-address".to_string(),
        label: "Broken".to_string(),
    });

    let engine = AnalysisEngine::new(config, Arc::new(InMemoryProvider::new()));
    assert!(engine.is_err());
}

#[test]
fn engine_extends_builtin_references() {
    let config = Config::from_toml_str(FULL_CONFIG).unwrap();
    let engine = AnalysisEngine::new(config, Arc::new(InMemoryProvider::new())).unwrap();

    let mixer = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin".parse().unwrap();
    assert_eq!(engine.references.mixer_label(&mixer), Some("Test Mixer"));
    assert_eq!(engine.references.exchange_label(&BINANCE_1), Some("Binance 1"));
    assert_eq!(engine.references.exchange_materiality_threshold, 5000);
}

#[test]
fn tracing_creates_log_directories() {
    let directory = std::env::temp_dir().join(format!("muhaqqiq-logs-{}", std::process::id()));
    let mut config = Config::default();
    config.logging.directory = directory.clone();

    let guards = setup_tracing("config_test", &config.logging).unwrap();

    assert!(directory.join("debug").is_dir());
    assert!(directory.join("error").is_dir());
    assert_eq!(guards.logs_dir, directory);
}

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    // Exchange routes need the amount (smallest unit) to exceed this
    pub exchange_materiality_threshold: u64,
    pub layering_window_secs: i64,
    pub layering_amount_tolerance: f64,
    pub similarity_candidate_threshold: f64,
    pub structuring_window_secs: i64,
    pub structuring_min_transfers: usize,
    pub rapid_movement_secs: i64,
    pub high_frequency_min_transactions: usize,
    pub high_frequency_per_hour: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            exchange_materiality_threshold: 1000,
            layering_window_secs: 3600,
            layering_amount_tolerance: 0.2,
            similarity_candidate_threshold: 0.7,
            structuring_window_secs: 3600,
            structuring_min_transfers: 3,
            rapid_movement_secs: 600,
            high_frequency_min_transactions: 500,
            high_frequency_per_hour: 10.0,
        }
    }
}

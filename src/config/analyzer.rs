use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Longest history window accepted from configuration.
pub const MAX_HISTORY_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub max_depth: usize,
    pub history_days: i64,
    pub max_signatures_to_check: usize,
    pub max_concurrent_requests: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            history_days: 90,
            max_signatures_to_check: 1000,
            max_concurrent_requests: 8,
        }
    }
}

impl AnalyzerConfig {
    /// Oldest block time (unix seconds) still inside the history window.
    /// A window reaching past the representable range starts at the earliest time.
    pub fn time_cutoff(
        &self,
        now: DateTime<Utc>,
    ) -> i64 {
        Duration::try_days(self.history_days)
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
            .timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_window_does_not_overflow() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let config = AnalyzerConfig {
            history_days: i64::MAX,
            ..Default::default()
        };

        assert_eq!(config.time_cutoff(now), DateTime::<Utc>::MIN_UTC.timestamp());
    }

    #[test]
    fn cutoff_is_whole_days_back() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let config = AnalyzerConfig {
            history_days: 2,
            ..Default::default()
        };

        assert_eq!(config.time_cutoff(now), 1_700_000_000 - 2 * 86_400);
    }
}

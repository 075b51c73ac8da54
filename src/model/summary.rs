use serde::Deserialize;
use serde::Serialize;

/// Counts and time range of an address's signature history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub total_transactions: usize,
    pub successful: usize,
    pub failed: usize,
    pub earliest: Option<i64>,
    pub latest: Option<i64>,
}

impl TransactionSummary {
    /// Average rate over the covered time range; `None` when the range is empty.
    pub fn transactions_per_hour(&self) -> Option<f64> {
        let span = self.latest? - self.earliest?;
        (span > 0).then(|| self.total_transactions as f64 / (span as f64 / 3600.0))
    }
}

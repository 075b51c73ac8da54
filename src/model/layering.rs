use serde::Deserialize;
use serde::Serialize;
use solana_pubkey::Pubkey;

/// A split transaction correlated with an aggregation transaction on the same address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayeringEvent {
    pub split_tx: String,
    pub aggregate_tx: String,
    pub mint: Option<Pubkey>,
    pub split_amount: u128,
    pub aggregate_amount: u128,
    pub time_delta_secs: i64,
    pub amount_delta_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayeringReport {
    pub address: Pubkey,
    pub detected: bool,
    pub confidence: f64,
    pub events: Vec<LayeringEvent>,
}

use serde::Deserialize;
use serde::Serialize;
use solana_pubkey::Pubkey;

use super::transfer::Transfer;

/// Structuring signals over one sender's transfers into a bridge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuringReport {
    pub sender: Option<Pubkey>,
    pub transfer_count: usize,
    pub amount_splitting: bool,
    pub rapid_movement: bool,
    pub round_amounts: Vec<Transfer>,
}

impl StructuringReport {
    pub fn is_suspicious(&self) -> bool {
        self.amount_splitting || self.rapid_movement || !self.round_amounts.is_empty()
    }
}

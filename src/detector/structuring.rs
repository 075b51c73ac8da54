use std::collections::BTreeMap;

use solana_pubkey::Pubkey;
use tracing::debug;

use crate::config::DetectorConfig;
use crate::model::ReferenceSets;
use crate::model::StructuringReport;
use crate::model::Transfer;
use crate::utils::is_round_sol_amount;

/// Bucket members within this band of the bucket mean count as similar.
const SIMILAR_AMOUNT_BAND: (f64, f64) = (0.8, 1.2);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuringDetector {
    pub window_secs: i64,
    pub min_transfers: usize,
    pub rapid_movement_secs: i64,
}

impl Default for StructuringDetector {
    fn default() -> Self {
        Self {
            window_secs: 3600,
            min_transfers: 3,
            rapid_movement_secs: 600,
        }
    }
}

impl StructuringDetector {
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self {
            window_secs: config.structuring_window_secs,
            min_transfers: config.structuring_min_transfers,
            rapid_movement_secs: config.rapid_movement_secs,
        }
    }

    /// Structuring signals per sender over transfers into known bridges.
    ///
    /// Senders with a single bridge transfer are skipped. Reports come back in
    /// order of each sender's first bridge transfer.
    pub fn detect(
        &self,
        transfers: &[Transfer],
        references: &ReferenceSets,
    ) -> Vec<StructuringReport> {
        let mut order: Vec<Pubkey> = Vec::new();
        let mut by_sender: BTreeMap<Pubkey, Vec<&Transfer>> = BTreeMap::new();
        for transfer in transfers {
            let (Some(source), Some(destination)) = (transfer.source, transfer.destination) else { continue };
            if !references.is_bridge(&destination) {
                continue;
            }
            let entries = by_sender.entry(source).or_default();
            if entries.is_empty() {
                order.push(source);
            }
            entries.push(transfer);
        }

        order
            .into_iter()
            .filter_map(|sender| {
                let mut sent = by_sender.remove(&sender)?;
                if sent.len() < 2 {
                    return None;
                }
                sent.sort_by_key(|transfer| transfer.block_time.unwrap_or_default());
                let report = self.assess(sender, &sent);
                debug!(
                    "structuring_scan::sender::{}::transfers::{}::suspicious::{}",
                    sender,
                    sent.len(),
                    report.is_suspicious()
                );
                Some(report)
            })
            .collect()
    }

    /// Signals for one sender's transfers, sorted by block time.
    pub fn assess(
        &self,
        sender: Pubkey,
        sent: &[&Transfer],
    ) -> StructuringReport {
        StructuringReport {
            sender: Some(sender),
            transfer_count: sent.len(),
            amount_splitting: self.amount_splitting(sent),
            rapid_movement: self.rapid_movement(sent),
            round_amounts: sent
                .iter()
                .filter(|transfer| transfer.is_native() && is_round_sol_amount(transfer.amount))
                .map(|transfer| (*transfer).clone())
                .collect(),
        }
    }

    // Enough similar-sized transfers inside one fixed time bucket
    fn amount_splitting(
        &self,
        sent: &[&Transfer],
    ) -> bool {
        if sent.len() < self.min_transfers || self.window_secs <= 0 {
            return false;
        }
        let mut buckets: BTreeMap<i64, Vec<u64>> = BTreeMap::new();
        for transfer in sent {
            let Some(time) = transfer.block_time else { continue };
            buckets.entry(time.div_euclid(self.window_secs)).or_default().push(transfer.amount);
        }

        buckets.values().filter(|amounts| amounts.len() >= self.min_transfers).any(|amounts| {
            let mean = amounts.iter().map(|amount| *amount as f64).sum::<f64>() / amounts.len() as f64;
            if mean <= 0.0 {
                return false;
            }
            let similar = amounts
                .iter()
                .filter(|amount| {
                    let ratio = **amount as f64 / mean;
                    (SIMILAR_AMOUNT_BAND.0..=SIMILAR_AMOUNT_BAND.1).contains(&ratio)
                })
                .count();
            similar >= self.min_transfers
        })
    }

    // First to last transfer inside the rapid-movement window
    fn rapid_movement(
        &self,
        sent: &[&Transfer],
    ) -> bool {
        let times: Vec<i64> = sent.iter().filter_map(|transfer| transfer.block_time).collect();
        match (times.first(), times.last()) {
            (Some(first), Some(last)) if times.len() >= 2 => last - first < self.rapid_movement_secs,
            _ => false,
        }
    }
}

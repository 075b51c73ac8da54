use std::collections::BTreeSet;

use solana_pubkey::Pubkey;
use tracing::debug;

use crate::config::DetectorConfig;
use crate::constants::LAYERING_CONFIDENCE;
use crate::constants::LAYERING_MIN_COUNTERPARTIES;
use crate::model::LayeringEvent;
use crate::model::LayeringReport;
use crate::model::TransactionTransfers;
use crate::utils::relative_difference;

/// Fan-out or fan-in of one address within one transaction, per mint.
#[derive(Debug, Clone, PartialEq)]
struct FanEvent<'a> {
    signature: &'a str,
    block_time: i64,
    mint: Option<Pubkey>,
    amount: u128,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayeringDetector {
    pub window_secs: i64,
    pub amount_tolerance: f64,
}

impl Default for LayeringDetector {
    fn default() -> Self {
        Self {
            window_secs: 3600,
            amount_tolerance: 0.2,
        }
    }
}

impl LayeringDetector {
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self {
            window_secs: config.layering_window_secs,
            amount_tolerance: config.layering_amount_tolerance,
        }
    }

    /// Correlates split transactions of `address` with aggregation transactions.
    ///
    /// A split sends one mint to more than two distinct destinations in a single
    /// transaction, an aggregation receives one mint from more than two distinct
    /// sources. Each split is paired with the first aggregation of the same mint
    /// that lies strictly inside the time window and within the amount tolerance.
    /// `None` when nothing correlates.
    pub fn detect(
        &self,
        address: &Pubkey,
        transactions: &[TransactionTransfers],
    ) -> Option<LayeringReport> {
        let mut splits = Vec::new();
        let mut aggregations = Vec::new();
        for tx in transactions {
            let Some(block_time) = tx.block_time else { continue };
            let mints: BTreeSet<Option<Pubkey>> = tx.transfers.iter().map(|t| t.mint_or_native()).collect();
            for mint in mints {
                let same_mint = tx.transfers.iter().filter(|t| t.mint_or_native() == mint);
                let outgoing: Vec<_> = same_mint.clone().filter(|t| t.source.as_ref() == Some(address)).collect();
                let incoming: Vec<_> = same_mint.filter(|t| t.destination.as_ref() == Some(address)).collect();

                let destinations: BTreeSet<Pubkey> = outgoing.iter().filter_map(|t| t.destination).collect();
                if destinations.len() > LAYERING_MIN_COUNTERPARTIES {
                    splits.push(FanEvent {
                        signature: &tx.signature,
                        block_time,
                        mint,
                        amount: outgoing.iter().map(|t| t.amount as u128).sum(),
                    });
                }
                let sources: BTreeSet<Pubkey> = incoming.iter().filter_map(|t| t.source).collect();
                if sources.len() > LAYERING_MIN_COUNTERPARTIES {
                    aggregations.push(FanEvent {
                        signature: &tx.signature,
                        block_time,
                        mint,
                        amount: incoming.iter().map(|t| t.amount as u128).sum(),
                    });
                }
            }
        }

        let mut events = Vec::new();
        for split in &splits {
            let correlated = aggregations.iter().find_map(|aggregation| {
                let time_delta = (split.block_time - aggregation.block_time).abs();
                let ratio = relative_difference(split.amount, aggregation.amount);
                (aggregation.mint == split.mint
                    && time_delta > 0
                    && time_delta < self.window_secs
                    && ratio < self.amount_tolerance)
                    .then(|| LayeringEvent {
                        split_tx: split.signature.to_string(),
                        aggregate_tx: aggregation.signature.to_string(),
                        mint: split.mint,
                        split_amount: split.amount,
                        aggregate_amount: aggregation.amount,
                        time_delta_secs: time_delta,
                        amount_delta_ratio: ratio,
                    })
            });
            events.extend(correlated);
        }

        debug!(
            "layering_scan::address::{}::splits::{}::aggregations::{}::events::{}",
            address,
            splits.len(),
            aggregations.len(),
            events.len()
        );

        (!events.is_empty()).then(|| LayeringReport {
            address: *address,
            detected: true,
            confidence: LAYERING_CONFIDENCE,
            events,
        })
    }
}

/// [`LayeringDetector::detect`] with the default window and tolerance.
pub fn detect_layering(
    address: &Pubkey,
    transactions: &[TransactionTransfers],
) -> Option<LayeringReport> {
    LayeringDetector::default().detect(address, transactions)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::constants::SOL_MINT_KEY;
    use crate::model::Transfer;
    use crate::model::transfer::group_by_transaction;
    use crate::test_utils::fixtures::TestFixtures;

    fn split(
        address: Pubkey,
        amounts: &[u64],
        signature: &str,
        time: i64,
    ) -> Vec<Transfer> {
        amounts
            .iter()
            .map(|amount| TestFixtures::native_transfer(address, TestFixtures::sample_pubkey(), *amount, signature, time))
            .collect()
    }

    fn aggregate(
        address: Pubkey,
        amounts: &[u64],
        signature: &str,
        time: i64,
    ) -> Vec<Transfer> {
        amounts
            .iter()
            .map(|amount| TestFixtures::native_transfer(TestFixtures::sample_pubkey(), address, *amount, signature, time))
            .collect()
    }

    #[test]
    fn correlates_split_and_aggregation() {
        let address = TestFixtures::sample_pubkey();
        let mut transfers = split(address, &[40, 30, 30], "split", 1_000);
        transfers.extend(aggregate(address, &[30, 30, 35], "aggregate", 2_800));

        let report = detect_layering(&address, &group_by_transaction(&transfers)).unwrap();

        assert!(report.detected);
        assert_eq!(report.confidence, 0.6);
        assert_eq!(report.events.len(), 1);
        let event = &report.events[0];
        assert_eq!(event.split_tx, "split");
        assert_eq!(event.aggregate_tx, "aggregate");
        assert_eq!(event.time_delta_secs, 1_800);
        assert!((event.amount_delta_ratio - 0.05).abs() < 1e-9);
    }

    #[test]
    fn two_counterparties_are_not_a_split() {
        let address = TestFixtures::sample_pubkey();
        let mut transfers = split(address, &[50, 50], "split", 1_000);
        transfers.extend(aggregate(address, &[30, 30, 40], "aggregate", 1_100));

        assert_eq!(detect_layering(&address, &group_by_transaction(&transfers)), None);
    }

    #[test]
    fn outside_window_or_tolerance_is_not_correlated() {
        let address = TestFixtures::sample_pubkey();
        let mut late = split(address, &[10, 10, 10], "split", 0);
        late.extend(aggregate(address, &[10, 10, 10], "late", 3_600));
        assert_eq!(detect_layering(&address, &group_by_transaction(&late)), None);

        let mut uneven = split(address, &[10, 10, 10], "split", 0);
        uneven.extend(aggregate(address, &[10, 10, 4], "uneven", 60));
        assert_eq!(detect_layering(&address, &group_by_transaction(&uneven)), None);
    }

    #[test]
    fn first_match_per_split_only() {
        let address = TestFixtures::sample_pubkey();
        let mut transfers = split(address, &[10, 10, 10], "split", 0);
        transfers.extend(aggregate(address, &[10, 10, 10], "first", 100));
        transfers.extend(aggregate(address, &[10, 10, 10], "second", 200));

        let report = detect_layering(&address, &group_by_transaction(&transfers)).unwrap();
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].aggregate_tx, "first");
    }

    #[test]
    fn counterparties_are_counted_per_mint() {
        let address = TestFixtures::sample_pubkey();
        let mint = TestFixtures::sample_pubkey();
        // Three destinations, but only two receive SOL.
        let mut transfers = split(address, &[10, 10], "mixed", 0);
        transfers.push(TestFixtures::token_transfer(address, TestFixtures::sample_pubkey(), mint, 10, "mixed", 0));
        transfers.extend(aggregate(address, &[10, 10, 10], "sol_in", 100));
        assert_eq!(detect_layering(&address, &group_by_transaction(&transfers)), None);

        // SOL split does not correlate with a token aggregation of the same size.
        let mut transfers = split(address, &[10, 10, 10], "sol_out", 0);
        transfers.extend(
            TestFixtures::sample_pubkeys(3)
                .into_iter()
                .map(|source| TestFixtures::token_transfer(source, address, mint, 10, "token_in", 100)),
        );
        assert_eq!(detect_layering(&address, &group_by_transaction(&transfers)), None);

        transfers.extend(aggregate(address, &[10, 10, 10], "sol_in", 200));
        let report = detect_layering(&address, &group_by_transaction(&transfers)).unwrap();
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].aggregate_tx, "sol_in");
        assert_eq!(report.events[0].mint, Some(SOL_MINT_KEY));
    }
}

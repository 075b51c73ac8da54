use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;

use solana_pubkey::Pubkey;
use tracing::info;
use tracing::warn;

use super::similarity::similarity;
use crate::datasource::TransactionProvider;
use crate::error::AnalysisError;
use crate::model::DustScan;
use crate::model::DustTransfer;
use crate::model::PoisoningCandidate;
use crate::model::Transfer;
use crate::model::TransferKind;

/// Poisoning dust is a single base unit of some token.
const DUST_AMOUNT: u64 = 1;

/// Looks for one-unit transfers of unnamed tokens sent to a target, the usual
/// opening move of an address-poisoning attempt.
pub struct DustScanner<'a, P: TransactionProvider + ?Sized> {
    provider: &'a P,
    threshold: f64,
    // mint -> suspicious, for the lifetime of the scanner
    metadata_cache: HashMap<Pubkey, bool>,
}

impl<'a, P: TransactionProvider + ?Sized> DustScanner<'a, P> {
    pub fn new(
        provider: &'a P,
        threshold: f64,
    ) -> Self {
        Self {
            provider,
            threshold,
            metadata_cache: HashMap::new(),
        }
    }

    /// Each transaction is flagged at most once, on its first dust transfer.
    pub async fn scan(
        &mut self,
        target: &Pubkey,
        transfers: &[Transfer],
    ) -> DustScan {
        let mut scan = DustScan::default();
        let counterparties = genuine_counterparties(target, transfers);
        let mut seen = HashSet::new();
        let mut flagged = HashSet::new();

        for transfer in transfers {
            if seen.insert(transfer.origin_tx.as_str()) {
                scan.checked_transactions += 1;
            }
            if flagged.contains(transfer.origin_tx.as_str()) || !is_dust_into(transfer, target) {
                continue;
            }
            let (Some(mint), Some(sender)) = (transfer.mint, transfer.source) else {
                continue;
            };
            if !self.is_suspicious(&mint, &mut scan.issues).await {
                continue;
            }

            let imitates = self.closest_counterparty(&sender, &counterparties);
            info!(
                "dust_transfer::target::{}::sender::{}::mint::{}::tx::{}::imitates::{}",
                target,
                sender,
                mint,
                transfer.origin_tx,
                imitates.as_ref().map(|c| c.address.as_str()).unwrap_or("none")
            );
            flagged.insert(transfer.origin_tx.as_str());
            scan.dust.push(DustTransfer {
                sender,
                mint,
                origin_tx: transfer.origin_tx.clone(),
                block_time: transfer.block_time,
                imitates,
            });
        }
        scan
    }

    async fn is_suspicious(
        &mut self,
        mint: &Pubkey,
        issues: &mut Vec<AnalysisError>,
    ) -> bool {
        if let Some(suspicious) = self.metadata_cache.get(mint) {
            return *suspicious;
        }
        let suspicious = match self.provider.get_token_metadata(mint).await {
            Ok(Some(metadata)) => metadata.is_anonymous(),
            Ok(None) => true,
            Err(e) => {
                warn!("token_metadata_unavailable::mint::{}::error::{:#}", mint, e);
                issues.push(AnalysisError::provider(mint, &e));
                false
            },
        };
        self.metadata_cache.insert(*mint, suspicious);
        suspicious
    }

    fn closest_counterparty(
        &self,
        sender: &Pubkey,
        counterparties: &BTreeSet<Pubkey>,
    ) -> Option<PoisoningCandidate> {
        let sender = sender.to_string();
        counterparties
            .iter()
            .map(|address| address.to_string())
            .filter(|address| *address != sender)
            .map(|address| {
                let score = similarity(&sender, &address);
                PoisoningCandidate {
                    address,
                    similarity: score,
                }
            })
            .filter(|candidate| candidate.similarity.score > self.threshold)
            .max_by(|a, b| a.similarity.score.total_cmp(&b.similarity.score))
    }
}

fn is_dust_into(
    transfer: &Transfer,
    target: &Pubkey,
) -> bool {
    transfer.kind == TransferKind::Token
        && transfer.amount == DUST_AMOUNT
        && transfer.destination.as_ref() == Some(target)
}

/// Addresses the target exchanged value with, other than through dust.
pub fn genuine_counterparties(
    target: &Pubkey,
    transfers: &[Transfer],
) -> BTreeSet<Pubkey> {
    transfers
        .iter()
        .filter(|transfer| !is_dust_into(transfer, target))
        .filter_map(|transfer| transfer.counterparty_of(target))
        .filter(|counterparty| counterparty != target)
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::anyhow;
    use crate::test_utils::fixtures::TestFixtures;
    use crate::test_utils::mocks::MockProvider;
    use crate::test_utils::mocks::create_empty_provider;

    #[tokio::test]
    async fn flags_dust_of_unnamed_token() {
        let target = TestFixtures::sample_pubkey();
        let sender = TestFixtures::sample_pubkey();
        let friend = TestFixtures::sample_pubkey();
        let mint = TestFixtures::sample_pubkey();
        let transfers = vec![
            TestFixtures::native_transfer(friend, target, 5_000_000, "tx-genuine", 10),
            TestFixtures::token_transfer(sender, target, mint, 1, "tx-dust", 20),
        ];
        let provider = create_empty_provider();

        let scan = DustScanner::new(&provider, 0.7).scan(&target, &transfers).await;

        assert_eq!(scan.checked_transactions, 2);
        assert_eq!(scan.dust.len(), 1);
        assert_eq!(scan.dust[0].sender, sender);
        assert_eq!(scan.dust[0].origin_tx, "tx-dust");
        assert!(scan.issues.is_empty());
    }

    #[tokio::test]
    async fn named_token_is_not_dust() {
        let target = TestFixtures::sample_pubkey();
        let sender = TestFixtures::sample_pubkey();
        let mint = TestFixtures::sample_pubkey();
        let transfers = vec![
            TestFixtures::token_transfer(sender, target, mint, 1, "tx-a", 20),
            TestFixtures::token_transfer(sender, target, mint, 1, "tx-b", 30),
        ];
        let mut provider = MockProvider::new();
        provider
            .expect_get_token_metadata()
            .times(1)
            .returning(|mint| Ok(Some(TestFixtures::sample_token_metadata(*mint))));

        let scan = DustScanner::new(&provider, 0.7).scan(&target, &transfers).await;

        assert!(scan.dust.is_empty());
    }

    #[tokio::test]
    async fn blank_metadata_still_counts_as_dust() {
        let target = TestFixtures::sample_pubkey();
        let sender = TestFixtures::sample_pubkey();
        let mint = TestFixtures::sample_pubkey();
        let transfers = vec![TestFixtures::token_transfer(sender, target, mint, 1, "tx-a", 20)];
        let mut provider = MockProvider::new();
        provider
            .expect_get_token_metadata()
            .returning(|mint| Ok(Some(TestFixtures::anonymous_token_metadata(*mint))));

        let scan = DustScanner::new(&provider, 0.7).scan(&target, &transfers).await;

        assert_eq!(scan.dust.len(), 1);
        // no genuine counterparties to imitate
        assert_eq!(scan.dust[0].imitates, None);
    }

    #[tokio::test]
    async fn metadata_failure_is_recorded() {
        let target = TestFixtures::sample_pubkey();
        let mint = TestFixtures::sample_pubkey();
        let transfers = vec![TestFixtures::token_transfer(
            TestFixtures::sample_pubkey(),
            target,
            mint,
            1,
            "tx-a",
            20,
        )];
        let mut provider = MockProvider::new();
        provider
            .expect_get_token_metadata()
            .returning(|_| Err(anyhow!("metadata service down")));

        let scan = DustScanner::new(&provider, 0.7).scan(&target, &transfers).await;

        assert!(scan.dust.is_empty());
        assert!(matches!(scan.issues[0], AnalysisError::ProviderUnavailable { .. }));
    }

    #[test]
    fn genuine_counterparties_skip_dust() {
        let target = TestFixtures::sample_pubkey();
        let friend = TestFixtures::sample_pubkey();
        let duster = TestFixtures::sample_pubkey();
        let mint = TestFixtures::sample_pubkey();
        let transfers = vec![
            TestFixtures::native_transfer(target, friend, 10, "tx-1", 1),
            TestFixtures::token_transfer(duster, target, mint, 1, "tx-2", 2),
        ];

        let counterparties = genuine_counterparties(&target, &transfers);
        assert_eq!(counterparties, BTreeSet::from([friend]));
    }
}

use futures::StreamExt;
use futures::stream;
use serde::Deserialize;
use serde::Serialize;
use solana_pubkey::Pubkey;
use tracing::debug;
use tracing::warn;

use super::SignatureInfo;
use super::TransactionProvider;
use crate::error::AnalysisError;
use crate::model::RawTransaction;

/// Transactions of one address in history order, plus whatever was skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectedHistory {
    pub address: String,
    pub history: Vec<SignatureInfo>,
    pub transactions: Vec<RawTransaction>,
    pub skipped: Vec<AnalysisError>,
}

impl CollectedHistory {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Fetches the history of `address` and then its transactions with at most
/// `max_concurrent_requests` in flight.
///
/// Entries older than `time_cutoff` are dropped and at most `max_signatures`
/// entries are kept. Failed transactions stay in the history but are not
/// fetched. A failed fetch is recorded and skipped.
pub async fn collect_transactions<P>(
    provider: &P,
    address: &Pubkey,
    time_cutoff: i64,
    max_signatures: usize,
    max_concurrent_requests: usize,
) -> CollectedHistory
where
    P: TransactionProvider + ?Sized,
{
    let mut collected = CollectedHistory {
        address: address.to_string(),
        ..Default::default()
    };

    let history = match provider.get_history(address, time_cutoff).await {
        Ok(history) => history,
        Err(e) => {
            warn!("history_unavailable::address::{}::error::{:#}", address, e);
            collected.skipped.push(AnalysisError::provider(address, &e));
            return collected;
        },
    };

    collected.history = history
        .into_iter()
        .filter(|entry| entry.block_time.is_none_or(|time| time >= time_cutoff))
        .take(max_signatures)
        .collect();

    let to_fetch: Vec<&SignatureInfo> = collected.history.iter().filter(|entry| entry.success).collect();
    let fetches: Vec<_> = to_fetch
        .iter()
        .map(|entry| provider.get_transaction(&entry.signature))
        .collect();
    let results: Vec<_> = stream::iter(fetches)
        .buffered(max_concurrent_requests.max(1))
        .collect()
        .await;

    for (entry, result) in to_fetch.iter().zip(results) {
        match result {
            Ok(tx) => collected.transactions.push(tx),
            Err(e) => {
                warn!("transaction_unavailable::signature::{}::error::{:#}", entry.signature, e);
                collected.skipped.push(AnalysisError::provider(&entry.signature, &e));
            },
        }
    }

    debug!(
        "collected_history::address::{}::signatures::{}::transactions::{}::skipped::{}",
        address,
        collected.history.len(),
        collected.transactions.len(),
        collected.skipped.len()
    );
    collected
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::datasource::InMemoryProvider;
    use crate::testing::TxBuilder;

    #[tokio::test]
    async fn keeps_history_order_and_skips_failures() {
        let from = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let mut provider = InMemoryProvider::new();
        for (signature, time) in [("a", 10), ("b", 20), ("c", 30), ("d", 40)] {
            let mut builder = TxBuilder::new(signature);
            builder.block_time(time).system_transfer(from, to, 5);
            provider.add_transaction(builder.build());
        }
        provider.mark_unavailable("b");

        let collected = collect_transactions(&provider, &to, 0, 100, 2).await;

        let signatures: Vec<&str> = collected.transactions.iter().map(|tx| tx.signature.as_str()).collect();
        assert_eq!(signatures, vec!["d", "c", "a"]);
        assert_eq!(collected.skipped.len(), 1);
        assert!(!collected.is_complete());
    }

    #[tokio::test]
    async fn failed_transactions_are_not_fetched() {
        let from = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let mut builder = TxBuilder::new("failed");
        builder.block_time(10).failed().system_transfer(from, to, 5);
        let provider = InMemoryProvider::with_transactions([builder.build()]);

        let collected = collect_transactions(&provider, &to, 0, 100, 4).await;
        assert_eq!(collected.history.len(), 1);
        assert!(collected.transactions.is_empty());
        assert!(collected.is_complete());
    }
}

use std::collections::HashMap;
use std::collections::HashSet;

use async_trait::async_trait;
use solana_pubkey::Pubkey;
use tracing::debug;

use super::SignatureInfo;
use super::TransactionProvider;
use crate::Result;
use crate::error::anyhow;
use crate::model::RawTransaction;
use crate::model::TokenMetadata;

/// Replays captured ledger records.
///
/// Every registered transaction shows up in the history of each address in its
/// address table and of each token balance owner.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    histories: HashMap<Pubkey, Vec<SignatureInfo>>,
    transactions: HashMap<String, RawTransaction>,
    metadata: HashMap<Pubkey, TokenMetadata>,
    unavailable: HashSet<String>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transactions(transactions: impl IntoIterator<Item = RawTransaction>) -> Self {
        let mut provider = Self::new();
        for tx in transactions {
            provider.add_transaction(tx);
        }
        provider
    }

    pub fn add_transaction(
        &mut self,
        tx: RawTransaction,
    ) {
        let info = SignatureInfo {
            signature: tx.signature.clone(),
            block_time: tx.block_time,
            success: tx.success,
        };

        let mut touched: Vec<Pubkey> = Vec::new();
        let owners = tx
            .pre_token_balances
            .iter()
            .chain(&tx.post_token_balances)
            .filter_map(|balance| balance.owner);
        for address in tx.account_keys.iter().copied().chain(owners) {
            if !touched.contains(&address) {
                touched.push(address);
            }
        }
        for address in touched {
            let history = self.histories.entry(address).or_default();
            if !history.iter().any(|entry| entry.signature == info.signature) {
                history.push(info.clone());
            }
        }

        self.transactions.insert(tx.signature.clone(), tx);
    }

    pub fn add_token_metadata(
        &mut self,
        metadata: TokenMetadata,
    ) {
        self.metadata.insert(metadata.mint, metadata);
    }

    /// Makes every request for `target` (an address or a signature) fail.
    pub fn mark_unavailable(
        &mut self,
        target: impl ToString,
    ) {
        self.unavailable.insert(target.to_string());
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    fn check_available(
        &self,
        target: &str,
    ) -> Result<()> {
        if self.unavailable.contains(target) {
            return Err(anyhow!("in_memory_provider::unavailable::{}", target));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionProvider for InMemoryProvider {
    async fn get_history(
        &self,
        address: &Pubkey,
        time_cutoff: i64,
    ) -> Result<Vec<SignatureInfo>> {
        self.check_available(&address.to_string())?;

        let mut history: Vec<SignatureInfo> = self
            .histories
            .get(address)
            .map(|entries| {
                entries
                    .iter()
                    .rev()
                    .filter(|entry| entry.block_time.is_none_or(|time| time >= time_cutoff))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        // newest first, like the RPC signature listing; ties keep the later registration first
        history.sort_by(|a, b| b.block_time.cmp(&a.block_time));

        debug!("in_memory_history::address::{}::entries::{}", address, history.len());
        Ok(history)
    }

    async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<RawTransaction> {
        self.check_available(signature)?;
        self.transactions
            .get(signature)
            .cloned()
            .ok_or_else(|| anyhow!("in_memory_provider::unknown_signature::{}", signature))
    }

    async fn get_token_metadata(
        &self,
        mint: &Pubkey,
    ) -> Result<Option<TokenMetadata>> {
        self.check_available(&mint.to_string())?;
        Ok(self.metadata.get(mint).cloned())
    }
}

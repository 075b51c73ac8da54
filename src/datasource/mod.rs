pub mod collector;
pub mod in_memory;
pub mod rpc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use solana_pubkey::Pubkey;

pub use collector::CollectedHistory;
pub use collector::collect_transactions;
pub use in_memory::InMemoryProvider;
pub use rpc::raw_transaction_from_encoded;

use crate::Result;
use crate::model::RawTransaction;
use crate::model::TokenMetadata;

/// One entry of an address's signature history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub signature: String,
    pub block_time: Option<i64>,
    pub success: bool,
}

/// Source of ledger history. Calls are the only suspension points of an analysis.
#[async_trait]
pub trait TransactionProvider: Send + Sync {
    /// Signatures touching `address`, newest first, at or after `time_cutoff` when
    /// the provider can filter; callers filter again.
    async fn get_history(
        &self,
        address: &Pubkey,
        time_cutoff: i64,
    ) -> Result<Vec<SignatureInfo>>;

    async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<RawTransaction>;

    async fn get_token_metadata(
        &self,
        _mint: &Pubkey,
    ) -> Result<Option<TokenMetadata>> {
        Ok(None)
    }
}

/// Values `mint` at `time` as `(sol, usd)` per smallest unit.
pub trait PriceOracle: Send + Sync {
    fn price_of(
        &self,
        mint: &Pubkey,
        time: Option<i64>,
    ) -> Option<(f64, f64)>;
}

impl<F> PriceOracle for F
where
    F: Fn(&Pubkey, Option<i64>) -> Option<(f64, f64)> + Send + Sync,
{
    fn price_of(
        &self,
        mint: &Pubkey,
        time: Option<i64>,
    ) -> Option<(f64, f64)> {
        self(mint, time)
    }
}

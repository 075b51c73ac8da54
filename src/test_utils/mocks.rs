use async_trait::async_trait;
use mockall::mock;
use solana_pubkey::Pubkey;

use crate::Result;
use crate::datasource::SignatureInfo;
use crate::datasource::TransactionProvider;
use crate::model::RawTransaction;
use crate::model::TokenMetadata;

// Mock for the ledger history provider
mock! {
    pub Provider {}

    #[async_trait]
    impl TransactionProvider for Provider {
        async fn get_history(&self, address: &Pubkey, time_cutoff: i64) -> Result<Vec<SignatureInfo>>;
        async fn get_transaction(&self, signature: &str) -> Result<RawTransaction>;
        async fn get_token_metadata(&self, mint: &Pubkey) -> Result<Option<TokenMetadata>>;
    }
}

/// Helper to create a mock provider that knows nothing
pub fn create_empty_provider() -> MockProvider {
    let mut mock = MockProvider::new();

    mock.expect_get_history().returning(|_, _| Ok(Vec::new()));
    mock.expect_get_token_metadata().returning(|_| Ok(None));

    mock
}

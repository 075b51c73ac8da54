use std::io;
use std::sync::Arc;
use std::sync::Mutex;

use fake::Fake;
use fake::Faker;
use solana_pubkey::Pubkey;
use tracing_subscriber::fmt::MakeWriter;

pub use crate::testing::TxBuilder;
use crate::constants::SOL_MINT_KEY;
use crate::model::Derivation;
use crate::model::TokenMetadata;
use crate::model::Transfer;
use crate::model::TransferKind;

/// Test fixtures for creating consistent test data
pub struct TestFixtures;

impl TestFixtures {
    /// Create a sample Pubkey for testing
    pub fn sample_pubkey() -> Pubkey {
        Pubkey::new_unique()
    }

    /// Create multiple sample pubkeys
    pub fn sample_pubkeys(count: usize) -> Vec<Pubkey> {
        (0..count).map(|_| Pubkey::new_unique()).collect()
    }

    /// Native transfer between two addresses at `block_time`
    pub fn native_transfer(
        source: Pubkey,
        destination: Pubkey,
        amount: u64,
        origin_tx: &str,
        block_time: i64,
    ) -> Transfer {
        Transfer {
            kind: TransferKind::NativeCoin,
            mint: Some(SOL_MINT_KEY),
            source: Some(source),
            destination: Some(destination),
            source_account: None,
            destination_account: None,
            amount,
            authority: Some(source),
            origin_tx: origin_tx.to_string(),
            block_time: Some(block_time),
            derivation: Derivation::InstructionParsed,
            confident: true,
        }
    }

    pub fn token_transfer(
        source: Pubkey,
        destination: Pubkey,
        mint: Pubkey,
        amount: u64,
        origin_tx: &str,
        block_time: i64,
    ) -> Transfer {
        Transfer {
            kind: TransferKind::Token,
            mint: Some(mint),
            ..Self::native_transfer(source, destination, amount, origin_tx, block_time)
        }
    }

    /// Token with a random name and symbol
    pub fn sample_token_metadata(mint: Pubkey) -> TokenMetadata {
        TokenMetadata {
            mint,
            name: Some(Faker.fake::<String>()),
            symbol: Some("TEST".to_string()),
        }
    }

    pub fn anonymous_token_metadata(mint: Pubkey) -> TokenMetadata {
        TokenMetadata {
            mint,
            name: None,
            symbol: Some("  ".to_string()),
        }
    }
}

/// In-memory log sink for asserting on formatted tracing output
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for LogBuffer {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

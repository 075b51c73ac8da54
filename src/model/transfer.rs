use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use solana_pubkey::Pubkey;

use crate::constants::SOL_MINT_KEY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferKind {
    NativeCoin,
    Token,
}

/// How a transfer was reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Derivation {
    InstructionParsed,
    BalanceReconciled,
}

/// Canonical unit of value movement.
///
/// `source`/`destination` are wallet owners when the token balance records
/// allow resolving them, otherwise the raw accounts; `None` means unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub kind: TransferKind,
    /// Native transfers carry [`SOL_MINT_KEY`]; `None` is a token mint that could not be resolved.
    pub mint: Option<Pubkey>,
    pub source: Option<Pubkey>,
    pub destination: Option<Pubkey>,
    pub source_account: Option<Pubkey>,
    pub destination_account: Option<Pubkey>,
    pub amount: u64,
    pub authority: Option<Pubkey>,
    pub origin_tx: String,
    pub block_time: Option<i64>,
    pub derivation: Derivation,
    pub confident: bool,
}

impl Transfer {
    pub fn is_native(&self) -> bool {
        self.kind == TransferKind::NativeCoin
    }

    pub fn has_resolved_endpoints(&self) -> bool {
        self.source.is_some() && self.destination.is_some()
    }

    pub fn touches(
        &self,
        address: &Pubkey,
    ) -> bool {
        self.source.as_ref() == Some(address) || self.destination.as_ref() == Some(address)
    }

    /// The other endpoint when `address` is one side of this transfer.
    pub fn counterparty_of(
        &self,
        address: &Pubkey,
    ) -> Option<Pubkey> {
        if self.source.as_ref() == Some(address) {
            self.destination
        } else if self.destination.as_ref() == Some(address) {
            self.source
        } else {
            None
        }
    }

    pub fn mint_or_native(&self) -> Option<Pubkey> {
        if self.is_native() { Some(SOL_MINT_KEY) } else { self.mint }
    }
}

impl fmt::Display for Transfer {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{}->{}::{}::{}",
            display_endpoint(&self.source),
            display_endpoint(&self.destination),
            self.amount,
            display_endpoint(&self.mint)
        )
    }
}

pub fn display_endpoint(endpoint: &Option<Pubkey>) -> String {
    endpoint.map(|key| key.to_string()).unwrap_or_else(|| "unknown".to_string())
}

/// Transfers of one transaction, in extraction order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTransfers {
    pub signature: String,
    pub block_time: Option<i64>,
    pub transfers: Vec<Transfer>,
}

/// Groups transfers by `origin_tx`, keeping first-appearance order.
pub fn group_by_transaction(transfers: &[Transfer]) -> Vec<TransactionTransfers> {
    let mut groups: Vec<TransactionTransfers> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for transfer in transfers {
        match positions.get(transfer.origin_tx.as_str()) {
            Some(&position) => groups[position].transfers.push(transfer.clone()),
            None => {
                positions.insert(transfer.origin_tx.as_str(), groups.len());
                groups.push(TransactionTransfers {
                    signature: transfer.origin_tx.clone(),
                    block_time: transfer.block_time,
                    transfers: vec![transfer.clone()],
                });
            },
        }
    }
    groups
}

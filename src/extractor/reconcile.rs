use std::collections::HashMap;
use std::collections::HashSet;

use solana_pubkey::Pubkey;
#[cfg(feature = "deep-trace")]
use tracing::debug;

use crate::error::AnalysisError;
use crate::model::Derivation;
use crate::model::RawTransaction;
use crate::model::TokenBalance;
use crate::model::Transfer;
use crate::model::TransferKind;

type OwnerMint = (Pubkey, Pubkey);

#[derive(Debug, Default)]
struct Holding {
    pre: i128,
    post: i128,
    explained: i128,
}

impl Holding {
    fn residual(&self) -> i128 {
        self.post - self.pre - self.explained
    }
}

/// Per-(owner, mint) holdings in order of first appearance in the balance records.
struct Holdings {
    order: Vec<OwnerMint>,
    by_key: HashMap<OwnerMint, Holding>,
}

impl Holdings {
    fn from_transaction(tx: &RawTransaction) -> Self {
        let mut holdings = Self {
            order: Vec::new(),
            by_key: HashMap::new(),
        };
        for balance in &tx.pre_token_balances {
            if let Some(holding) = holdings.entry(tx, balance) {
                holding.pre += balance.amount as i128;
            }
        }
        for balance in &tx.post_token_balances {
            if let Some(holding) = holdings.entry(tx, balance) {
                holding.post += balance.amount as i128;
            }
        }
        holdings
    }

    fn entry(
        &mut self,
        tx: &RawTransaction,
        balance: &TokenBalance,
    ) -> Option<&mut Holding> {
        let owner = tx.balance_owner(balance)?;
        let key = (owner, balance.mint);
        if !self.by_key.contains_key(&key) {
            self.order.push(key);
        }
        Some(self.by_key.entry(key).or_default())
    }

    /// Removes what the instruction-parse stage already accounts for.
    fn subtract_parsed(
        &mut self,
        parsed: &[Transfer],
    ) {
        for transfer in parsed.iter().filter(|t| t.kind == TransferKind::Token) {
            let Some(mint) = transfer.mint else { continue };
            if let Some(holding) = transfer.source.and_then(|source| self.by_key.get_mut(&(source, mint))) {
                holding.explained -= transfer.amount as i128;
            }
            if let Some(holding) = transfer
                .destination
                .and_then(|destination| self.by_key.get_mut(&(destination, mint)))
            {
                holding.explained += transfer.amount as i128;
            }
        }
    }
}

/// Balance-reconciliation stage: explains token balance movements that no
/// decoded instruction accounts for.
///
/// Receivers are matched, in record order, to the first other owner of the same
/// mint whose remaining unexplained decrease covers the receiver's increase.
/// A (source, destination, mint) triple is emitted at most once per transaction,
/// counting the triples the instruction-parse stage already produced.
pub fn reconcile_token_balances(
    tx: &RawTransaction,
    parsed: &[Transfer],
    issues: &mut Vec<AnalysisError>,
) -> Vec<Transfer> {
    let mut holdings = Holdings::from_transaction(tx);
    holdings.subtract_parsed(parsed);

    let mut consumed: HashSet<(Pubkey, Pubkey, Pubkey)> = parsed
        .iter()
        .filter(|t| t.kind == TransferKind::Token)
        .filter_map(|t| Some((t.source?, t.destination?, t.mint?)))
        .collect();

    let mut remaining: Vec<(OwnerMint, i128)> = holdings
        .order
        .iter()
        .filter_map(|key| {
            let residual = holdings.by_key.get(key)?.residual();
            (residual < 0).then_some((*key, -residual))
        })
        .collect();

    let receivers: Vec<(OwnerMint, i128)> = holdings
        .order
        .iter()
        .filter_map(|key| {
            let residual = holdings.by_key.get(key)?.residual();
            (residual > 0).then_some((*key, residual))
        })
        .collect();

    let mut reconciled = Vec::new();

    for ((receiver, mint), delta) in receivers {
        let matched = remaining.iter_mut().find(|((sender, sender_mint), left)| {
            *sender_mint == mint && *sender != receiver && *left >= delta && !consumed.contains(&(*sender, receiver, mint))
        });

        match matched {
            Some(((sender, _), left)) => {
                *left -= delta;
                consumed.insert((*sender, receiver, mint));
                #[cfg(feature = "deep-trace")]
                debug!(
                    "reconciled_transfer::signature::{}::source::{}::destination::{}::mint::{}::amount::{}",
                    tx.signature, sender, receiver, mint, delta
                );
                reconciled.push(reconciled_transfer(tx, Some(*sender), Some(receiver), mint, delta));
            },
            None => {
                issues.push(AnalysisError::UnresolvedEndpoint {
                    signature: tx.signature.clone(),
                    reason: format!("no source for {} of mint {} received by {}", delta, mint, receiver),
                });
                reconciled.push(reconciled_transfer(tx, None, Some(receiver), mint, delta));
            },
        }
    }

    for ((sender, mint), left) in remaining {
        if left > 0 {
            issues.push(AnalysisError::UnresolvedEndpoint {
                signature: tx.signature.clone(),
                reason: format!("no destination for {} of mint {} sent by {}", left, mint, sender),
            });
            reconciled.push(reconciled_transfer(tx, Some(sender), None, mint, left));
        }
    }

    reconciled
}

fn reconciled_transfer(
    tx: &RawTransaction,
    source: Option<Pubkey>,
    destination: Option<Pubkey>,
    mint: Pubkey,
    amount: i128,
) -> Transfer {
    Transfer {
        kind: TransferKind::Token,
        mint: Some(mint),
        source,
        destination,
        source_account: None,
        destination_account: None,
        amount: u64::try_from(amount).unwrap_or(u64::MAX),
        authority: None,
        origin_tx: tx.signature.clone(),
        block_time: tx.block_time,
        derivation: Derivation::BalanceReconciled,
        confident: false,
    }
}

pub mod instruction;
pub mod reconcile;

use serde::Deserialize;
use serde::Serialize;
use solana_pubkey::Pubkey;
use tracing::debug;
use tracing::debug_span;

pub use instruction::AccountRef;
pub use instruction::DecodedInstruction;
pub use instruction::decode_instruction;
pub use reconcile::reconcile_token_balances;

use crate::constants::SOL_MINT_KEY;
use crate::error::AnalysisError;
use crate::model::Derivation;
use crate::model::RawTransaction;
use crate::model::Transfer;
use crate::model::TransferKind;

/// Transfers of one transaction plus everything that had to be skipped.
/// A non-empty `issues` list marks the result as incomplete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub transfers: Vec<Transfer>,
    pub issues: Vec<AnalysisError>,
}

impl Extraction {
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Canonical transfers of a transaction: instruction-parsed transfers in
/// execution order, followed by balance-reconciled ones. Pure and deterministic.
pub fn extract(tx: &RawTransaction) -> Vec<Transfer> {
    extract_with_diagnostics(tx).transfers
}

pub fn extract_with_diagnostics(tx: &RawTransaction) -> Extraction {
    let _span = debug_span!("extract", signature = %tx.signature).entered();
    let mut extraction = Extraction::default();

    // Instructions of a failed transaction never executed
    if !tx.success {
        debug!("skipping_failed_transaction");
        return extraction;
    }

    let mut parsed = Vec::new();
    for (location, instruction) in tx.instruction_walk() {
        match decode_instruction(tx, instruction, location) {
            Ok(Some(decoded)) => parsed.push(to_transfer(tx, decoded)),
            Ok(None) => {},
            Err(e) => {
                debug!("skipping_malformed_instruction::{}", e);
                extraction.issues.push(e);
            },
        }
    }

    let reconciled = reconcile_token_balances(tx, &parsed, &mut extraction.issues);

    debug!(
        "extracted_transfers::parsed::{}::reconciled::{}::issues::{}",
        parsed.len(),
        reconciled.len(),
        extraction.issues.len()
    );

    extraction.transfers = parsed;
    extraction.transfers.extend(reconciled);
    extraction
}

fn to_transfer(
    tx: &RawTransaction,
    decoded: DecodedInstruction,
) -> Transfer {
    match decoded {
        DecodedInstruction::SystemTransfer { from, to, lamports } => native_transfer(tx, from, to, from, lamports),
        DecodedInstruction::SystemTransferWithSeed {
            from,
            base,
            to,
            lamports,
        } => native_transfer(tx, from, to, base, lamports),
        DecodedInstruction::TokenTransfer {
            source,
            destination,
            authority,
            amount,
        } => token_transfer(tx, source, destination, authority, amount, None),
        DecodedInstruction::TokenTransferChecked {
            source,
            mint,
            destination,
            authority,
            amount,
            ..
        } => token_transfer(tx, source, destination, authority, amount, Some(mint)),
    }
}

fn native_transfer(
    tx: &RawTransaction,
    from: Pubkey,
    to: Pubkey,
    authority: Pubkey,
    lamports: u64,
) -> Transfer {
    Transfer {
        kind: TransferKind::NativeCoin,
        mint: Some(SOL_MINT_KEY),
        source: Some(from),
        destination: Some(to),
        source_account: None,
        destination_account: None,
        amount: lamports,
        authority: Some(authority),
        origin_tx: tx.signature.clone(),
        block_time: tx.block_time,
        derivation: Derivation::InstructionParsed,
        confident: true,
    }
}

/// Token endpoints are resolved to their owning wallets through the balance
/// records; the unchecked variant also takes its mint from there.
fn token_transfer(
    tx: &RawTransaction,
    source: AccountRef,
    destination: AccountRef,
    authority: Pubkey,
    amount: u64,
    mint: Option<Pubkey>,
) -> Transfer {
    let source_info = tx.token_account_info(source.index);
    let destination_info = tx.token_account_info(destination.index);

    let recorded_mint = source_info
        .map(|(_, mint)| mint)
        .or_else(|| destination_info.map(|(_, mint)| mint));
    let mint = mint.or(recorded_mint);

    let source_owner = source_info.and_then(|(owner, _)| owner);
    let destination_owner = destination_info.and_then(|(owner, _)| owner);

    Transfer {
        kind: TransferKind::Token,
        mint,
        source: Some(source_owner.unwrap_or(source.key)),
        destination: Some(destination_owner.unwrap_or(destination.key)),
        source_account: Some(source.key),
        destination_account: Some(destination.key),
        amount,
        authority: Some(authority),
        origin_tx: tx.signature.clone(),
        block_time: tx.block_time,
        derivation: Derivation::InstructionParsed,
        confident: mint.is_some() && source_owner.is_some() && destination_owner.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::constants::TOKEN_PROGRAM_ID;
    use crate::test_utils::fixtures::TestFixtures;
    use crate::test_utils::fixtures::TxBuilder;

    #[test]
    fn follows_execution_order_through_inner_instructions() {
        let [payer, recipient, source, destination, mint] = std::array::from_fn(|_| TestFixtures::sample_pubkey());
        let mut builder = TxBuilder::new("ordered");
        builder
            .system_transfer(payer, recipient, 1_000)
            .inner_token_transfer(0, source, destination, payer, 25)
            .system_transfer(payer, recipient, 7)
            .token_balance(source, Some(payer), mint, 100, 75)
            .token_balance(destination, Some(recipient), mint, 0, 25);
        let tx = builder.build();

        let extraction = extract_with_diagnostics(&tx);

        assert!(extraction.is_complete());
        let amounts: Vec<u64> = extraction.transfers.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![1_000, 25, 7]);
        let token = &extraction.transfers[1];
        assert_eq!(token.kind, TransferKind::Token);
        assert_eq!(token.source, Some(payer));
        assert_eq!(token.destination, Some(recipient));
        assert_eq!(token.source_account, Some(source));
        assert!(token.confident);
    }

    #[test]
    fn failed_transaction_moves_nothing() {
        let mut builder = TxBuilder::new("failed");
        builder
            .failed()
            .system_transfer(TestFixtures::sample_pubkey(), TestFixtures::sample_pubkey(), 10);
        assert_eq!(extract(&builder.build()), Vec::new());
    }

    #[test]
    fn malformed_instruction_is_skipped_not_fatal() {
        let [from, to, a, b, authority] = std::array::from_fn(|_| TestFixtures::sample_pubkey());
        let mut builder = TxBuilder::new("partial");
        builder
            .raw_instruction(TOKEN_PROGRAM_ID, &[a, b, authority], vec![3, 0xff])
            .system_transfer(from, to, 10);
        let extraction = extract_with_diagnostics(&builder.build());

        assert_eq!(extraction.transfers.len(), 1);
        assert_eq!(extraction.transfers[0].amount, 10);
        assert_eq!(extraction.issues.len(), 1);
        assert!(!extraction.is_complete());
    }

    #[test]
    fn unknown_owner_keeps_the_token_account() {
        let [source, destination, authority, mint] = std::array::from_fn(|_| TestFixtures::sample_pubkey());
        let mut builder = TxBuilder::new("unowned");
        builder.token_transfer_checked(source, mint, destination, authority, 5, 6);
        let transfers = extract(&builder.build());

        assert_eq!(transfers[0].mint, Some(mint));
        assert_eq!(transfers[0].source, Some(source));
        assert_eq!(transfers[0].destination, Some(destination));
        assert!(!transfers[0].confident);
    }
}

use borsh::BorshDeserialize;
use solana_pubkey::Pubkey;
use spl_token::instruction::TokenInstruction;

use crate::constants::SYSTEM_PROGRAM_ID;
use crate::constants::SYSTEM_TRANSFER_TAG;
use crate::constants::SYSTEM_TRANSFER_WITH_SEED_TAG;
use crate::constants::TOKEN_2022_PROGRAM_ID;
use crate::constants::TOKEN_PROGRAM_ID;
use crate::error::AnalysisError;
use crate::model::CompiledInstruction;
use crate::model::InstructionLocation;
use crate::model::RawTransaction;

const TOKEN_TRANSFER_TAG: u8 = 3;
const TOKEN_TRANSFER_CHECKED_TAG: u8 = 12;

/// An account referenced by an instruction, with its index in the address table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountRef {
    pub index: u8,
    pub key: Pubkey,
}

/// Value-moving instructions of the system and token program families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedInstruction {
    SystemTransfer {
        from: Pubkey,
        to: Pubkey,
        lamports: u64,
    },
    SystemTransferWithSeed {
        from: Pubkey,
        base: Pubkey,
        to: Pubkey,
        lamports: u64,
    },
    TokenTransfer {
        source: AccountRef,
        destination: AccountRef,
        authority: Pubkey,
        amount: u64,
    },
    TokenTransferChecked {
        source: AccountRef,
        mint: Pubkey,
        destination: AccountRef,
        authority: Pubkey,
        amount: u64,
        decimals: u8,
    },
}

// bincode layout of the system program's transfer arguments, after the u32 tag
#[derive(BorshDeserialize)]
struct LamportsArg {
    lamports: u64,
}

/// Decodes one compiled instruction. `Ok(None)` for programs and instructions
/// that do not move value; `Err` only when a supported instruction is malformed.
pub fn decode_instruction(
    tx: &RawTransaction,
    instruction: &CompiledInstruction,
    location: InstructionLocation,
) -> Result<Option<DecodedInstruction>, AnalysisError> {
    let program_id = tx.program_id(instruction).ok_or_else(|| {
        AnalysisError::malformed(
            &tx.signature,
            location.to_string(),
            format!("program id index {} out of range", instruction.program_id_index),
        )
    })?;

    if *program_id == SYSTEM_PROGRAM_ID {
        decode_system(tx, instruction, location)
    } else if *program_id == TOKEN_PROGRAM_ID || *program_id == TOKEN_2022_PROGRAM_ID {
        decode_token(tx, instruction, location)
    } else {
        Ok(None)
    }
}

fn decode_system(
    tx: &RawTransaction,
    instruction: &CompiledInstruction,
    location: InstructionLocation,
) -> Result<Option<DecodedInstruction>, AnalysisError> {
    let malformed = |reason: String| AnalysisError::malformed(&tx.signature, location.to_string(), reason);

    let mut data: &[u8] = &instruction.data;
    let tag = u32::deserialize(&mut data).map_err(|e| malformed(format!("system instruction tag: {}", e)))?;

    match tag {
        SYSTEM_TRANSFER_TAG => {
            let args = LamportsArg::deserialize(&mut data).map_err(|e| malformed(format!("system transfer: {}", e)))?;
            let from = account_at(tx, instruction, 0, location)?;
            let to = account_at(tx, instruction, 1, location)?;
            Ok(Some(DecodedInstruction::SystemTransfer {
                from: from.key,
                to: to.key,
                lamports: args.lamports,
            }))
        },
        SYSTEM_TRANSFER_WITH_SEED_TAG => {
            // seed and owner follow the lamports; they do not affect the transfer
            let args = LamportsArg::deserialize(&mut data)
                .map_err(|e| malformed(format!("system transfer with seed: {}", e)))?;
            let from = account_at(tx, instruction, 0, location)?;
            let base = account_at(tx, instruction, 1, location)?;
            let to = account_at(tx, instruction, 2, location)?;
            Ok(Some(DecodedInstruction::SystemTransferWithSeed {
                from: from.key,
                base: base.key,
                to: to.key,
                lamports: args.lamports,
            }))
        },
        _ => Ok(None),
    }
}

fn decode_token(
    tx: &RawTransaction,
    instruction: &CompiledInstruction,
    location: InstructionLocation,
) -> Result<Option<DecodedInstruction>, AnalysisError> {
    // Token-2022 extension instructions are outside the classic tag space; only
    // look at the two transfer tags so those never surface as malformed.
    match instruction.data.first() {
        Some(&TOKEN_TRANSFER_TAG) | Some(&TOKEN_TRANSFER_CHECKED_TAG) => {},
        _ => return Ok(None),
    }

    let decoded = TokenInstruction::unpack(&instruction.data).map_err(|e| {
        AnalysisError::malformed(&tx.signature, location.to_string(), format!("token instruction: {}", e))
    })?;

    match decoded {
        TokenInstruction::Transfer { amount } => Ok(Some(DecodedInstruction::TokenTransfer {
            source: account_at(tx, instruction, 0, location)?,
            destination: account_at(tx, instruction, 1, location)?,
            authority: account_at(tx, instruction, 2, location)?.key,
            amount,
        })),
        TokenInstruction::TransferChecked { amount, decimals } => Ok(Some(DecodedInstruction::TokenTransferChecked {
            source: account_at(tx, instruction, 0, location)?,
            mint: account_at(tx, instruction, 1, location)?.key,
            destination: account_at(tx, instruction, 2, location)?,
            authority: account_at(tx, instruction, 3, location)?.key,
            amount,
            decimals,
        })),
        _ => Ok(None),
    }
}

/// Resolves the instruction's `position`-th account through the address table.
pub fn account_at(
    tx: &RawTransaction,
    instruction: &CompiledInstruction,
    position: usize,
    location: InstructionLocation,
) -> Result<AccountRef, AnalysisError> {
    let index = *instruction.accounts.get(position).ok_or_else(|| {
        AnalysisError::malformed(
            &tx.signature,
            location.to_string(),
            format!("missing account at position {}", position),
        )
    })?;
    let key = tx.account_key(index).ok_or_else(|| {
        AnalysisError::malformed(
            &tx.signature,
            location.to_string(),
            format!("account index {} out of range", index),
        )
    })?;
    Ok(AccountRef { index, key: *key })
}

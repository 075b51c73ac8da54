use borsh::BorshDeserialize;
use solana_pubkey::Pubkey;
#[cfg(feature = "deep-trace")]
use tracing::debug;

use crate::constants::ORCA_WHIRLPOOL_PROGRAM_ID;
use crate::constants::RAYDIUM_AMM_V4_PROGRAM_ID;
use crate::constants::RAYDIUM_SWAP_BASE_IN_TAG;
use crate::constants::RAYDIUM_SWAP_BASE_OUT_TAG;
use crate::constants::WHIRLPOOL_SWAP_DISCRIMINATOR;
use crate::extractor::AccountRef;
use crate::extractor::DecodedInstruction;
use crate::extractor::decode_instruction;
use crate::extractor::instruction::account_at;
use crate::model::CompiledInstruction;
use crate::model::InstructionLocation;
use crate::model::RawTransaction;
use crate::model::Swap;
use crate::model::SwapProgram;

/// Raydium AMM v4 swaps carry at least the pool, the market accounts and the
/// trailing user source, destination and owner.
const RAYDIUM_MIN_ACCOUNTS: usize = 17;
const WHIRLPOOL_MIN_ACCOUNTS: usize = 6;

// swapBaseIn: amount_in, minimum_amount_out; swapBaseOut: max_amount_in, amount_out
#[derive(BorshDeserialize)]
struct RaydiumSwapArgs {
    first: u64,
    second: u64,
}

#[derive(BorshDeserialize)]
struct WhirlpoolSwapArgs {
    amount: u64,
    _other_amount_threshold: u64,
    _sqrt_price_limit: u128,
    amount_specified_is_input: bool,
    a_to_b: bool,
}

// A swap plus the user token accounts it debits and credits
struct DecodedSwap {
    program: SwapProgram,
    pool: Pubkey,
    signer: Pubkey,
    user_source: AccountRef,
    user_destination: AccountRef,
    input_amount: Option<u64>,
    output_amount: Option<u64>,
}

/// Swaps of the supported pools in execution order, top-level and inner.
///
/// Mints come from the token balance records of the user accounts. Amounts the
/// instruction leaves open are taken from the token transfers the swap performs,
/// then from the user accounts' balance deltas.
pub fn extract_swaps(tx: &RawTransaction) -> Vec<Swap> {
    if !tx.success {
        return Vec::new();
    }

    let walk = tx.instruction_walk();
    let mut swaps = Vec::new();
    for (position, (location, instruction)) in walk.iter().enumerate() {
        let Some(decoded) = decode_swap(tx, instruction, *location) else { continue };
        let (input_cpi, output_cpi) = swap_transfers(tx, &walk[position + 1..], *location, &decoded);

        let input_amount = decoded
            .input_amount
            .or(input_cpi)
            .or_else(|| positive(-tx.token_account_delta(decoded.user_source.index)));
        let output_amount = decoded
            .output_amount
            .or(output_cpi)
            .or_else(|| positive(tx.token_account_delta(decoded.user_destination.index)));

        swaps.push(Swap {
            program: decoded.program,
            pool: decoded.pool,
            signer: decoded.signer,
            input_mint: tx.token_account_info(decoded.user_source.index).map(|(_, mint)| mint),
            output_mint: tx.token_account_info(decoded.user_destination.index).map(|(_, mint)| mint),
            input_amount,
            output_amount,
            origin_tx: tx.signature.clone(),
            location: *location,
            block_time: tx.block_time,
        });
    }
    swaps
}

fn decode_swap(
    tx: &RawTransaction,
    instruction: &CompiledInstruction,
    location: InstructionLocation,
) -> Option<DecodedSwap> {
    let program_id = tx.program_id(instruction)?;
    if *program_id == RAYDIUM_AMM_V4_PROGRAM_ID {
        decode_raydium(tx, instruction, location)
    } else if *program_id == ORCA_WHIRLPOOL_PROGRAM_ID {
        decode_whirlpool(tx, instruction, location)
    } else {
        None
    }
}

fn decode_raydium(
    tx: &RawTransaction,
    instruction: &CompiledInstruction,
    location: InstructionLocation,
) -> Option<DecodedSwap> {
    let (&tag, mut data) = instruction.data.split_first()?;
    if tag != RAYDIUM_SWAP_BASE_IN_TAG && tag != RAYDIUM_SWAP_BASE_OUT_TAG {
        return None;
    }
    let count = instruction.accounts.len();
    if count < RAYDIUM_MIN_ACCOUNTS {
        #[cfg(feature = "deep-trace")]
        debug!("raydium_swap_too_few_accounts::{}::{}::{}", tx.signature, location, count);
        return None;
    }
    let args = RaydiumSwapArgs::deserialize(&mut data).ok()?;
    let (input_amount, output_amount) = if tag == RAYDIUM_SWAP_BASE_IN_TAG {
        (Some(args.first), None)
    } else {
        (None, Some(args.second))
    };

    Some(DecodedSwap {
        program: SwapProgram::RaydiumAmmV4,
        pool: account_at(tx, instruction, 1, location).ok()?.key,
        signer: account_at(tx, instruction, count - 1, location).ok()?.key,
        user_source: account_at(tx, instruction, count - 3, location).ok()?,
        user_destination: account_at(tx, instruction, count - 2, location).ok()?,
        input_amount,
        output_amount,
    })
}

fn decode_whirlpool(
    tx: &RawTransaction,
    instruction: &CompiledInstruction,
    location: InstructionLocation,
) -> Option<DecodedSwap> {
    let data = instruction.data.strip_prefix(WHIRLPOOL_SWAP_DISCRIMINATOR.as_slice())?;
    if instruction.accounts.len() < WHIRLPOOL_MIN_ACCOUNTS {
        return None;
    }
    let args = WhirlpoolSwapArgs::deserialize(&mut &data[..]).ok()?;
    let owner_a = account_at(tx, instruction, 3, location).ok()?;
    let owner_b = account_at(tx, instruction, 5, location).ok()?;
    let (user_source, user_destination) = if args.a_to_b { (owner_a, owner_b) } else { (owner_b, owner_a) };
    let (input_amount, output_amount) = if args.amount_specified_is_input {
        (Some(args.amount), None)
    } else {
        (None, Some(args.amount))
    };

    Some(DecodedSwap {
        program: SwapProgram::OrcaWhirlpool,
        pool: account_at(tx, instruction, 2, location).ok()?.key,
        signer: account_at(tx, instruction, 1, location).ok()?.key,
        user_source,
        user_destination,
        input_amount,
        output_amount,
    })
}

/// Token transfers the swap itself performed: the instructions following it in
/// the same top-level group, up to the next swap.
fn swap_transfers(
    tx: &RawTransaction,
    following: &[(InstructionLocation, &CompiledInstruction)],
    location: InstructionLocation,
    swap: &DecodedSwap,
) -> (Option<u64>, Option<u64>) {
    let mut input = None;
    let mut output = None;
    for (next_location, instruction) in following {
        if next_location.top_level != location.top_level || decode_swap(tx, instruction, *next_location).is_some() {
            break;
        }
        let (source, destination, amount) = match decode_instruction(tx, instruction, *next_location) {
            Ok(Some(DecodedInstruction::TokenTransfer {
                source,
                destination,
                amount,
                ..
            }))
            | Ok(Some(DecodedInstruction::TokenTransferChecked {
                source,
                destination,
                amount,
                ..
            })) => (source, destination, amount),
            _ => continue,
        };
        if input.is_none() && source.key == swap.user_source.key {
            input = Some(amount);
        }
        if output.is_none() && destination.key == swap.user_destination.key {
            output = Some(amount);
        }
    }
    (input, output)
}

fn positive(delta: i128) -> Option<u64> {
    (delta > 0).then(|| u64::try_from(delta).unwrap_or(u64::MAX))
}

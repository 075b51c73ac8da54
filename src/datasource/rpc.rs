use std::collections::BTreeMap;
use std::str::FromStr;

use solana_pubkey::Pubkey;
use solana_transaction_status::EncodedConfirmedTransactionWithStatusMeta;
use solana_transaction_status::EncodedTransaction;
use solana_transaction_status::UiCompiledInstruction;
use solana_transaction_status::UiInstruction;
use solana_transaction_status::UiMessage;
use solana_transaction_status::UiTransactionStatusMeta;
use solana_transaction_status::UiTransactionTokenBalance;
use solana_transaction_status::option_serializer::OptionSerializer;
#[cfg(feature = "deep-trace")]
use tracing::debug;

use crate::error::AnalysisError;
use crate::model::CompiledInstruction;
use crate::model::RawTransaction;
use crate::model::TokenBalance;

fn opt_ref<T>(os: &OptionSerializer<T>) -> Option<&T> {
    Option::<&T>::from(os.as_ref())
}

// Signature and address table of the message, whichever encoding it came in
struct DecodedMessage {
    signature: String,
    account_keys: Vec<Pubkey>,
    signer_count: usize,
    instructions: Vec<CompiledInstruction>,
}

/// Translates an RPC `getTransaction` response into a [`RawTransaction`].
///
/// Accepts the binary encodings and the raw JSON encoding; `jsonParsed`
/// messages are rejected since they no longer carry instruction bytes.
pub fn raw_transaction_from_encoded(
    encoded: &EncodedConfirmedTransactionWithStatusMeta
) -> Result<RawTransaction, AnalysisError> {
    let message = decode_message(&encoded.transaction.transaction)?;
    let signature = message.signature;
    let malformed = |location: &str, reason: String| AnalysisError::malformed(&signature, location, reason);

    let meta = encoded
        .transaction
        .meta
        .as_ref()
        .ok_or_else(|| malformed("meta", "transaction meta missing".to_string()))?;

    let mut account_keys = message.account_keys;
    if let Some(loaded) = opt_ref(&meta.loaded_addresses) {
        for address in loaded.writable.iter().chain(&loaded.readonly) {
            account_keys.push(parse_pubkey(address).map_err(|reason| malformed("loaded_addresses", reason))?);
        }
    }

    let inner_instructions = inner_instructions(meta).map_err(|reason| malformed("inner_instructions", reason))?;
    let pre_token_balances =
        token_balances(&meta.pre_token_balances).map_err(|reason| malformed("pre_token_balances", reason))?;
    let post_token_balances =
        token_balances(&meta.post_token_balances).map_err(|reason| malformed("post_token_balances", reason))?;

    #[cfg(feature = "deep-trace")]
    debug!(
        "translated_rpc_transaction::signature::{}::keys::{}::instructions::{}",
        signature,
        account_keys.len(),
        message.instructions.len()
    );

    Ok(RawTransaction {
        signature,
        slot: encoded.slot,
        block_time: encoded.block_time,
        account_keys,
        signer_count: message.signer_count,
        instructions: message.instructions,
        inner_instructions,
        pre_balances: meta.pre_balances.clone(),
        post_balances: meta.post_balances.clone(),
        pre_token_balances,
        post_token_balances,
        success: meta.err.is_none(),
        fee: meta.fee,
    })
}

fn decode_message(transaction: &EncodedTransaction) -> Result<DecodedMessage, AnalysisError> {
    let unknown = |reason: &str| AnalysisError::malformed("unknown", "message", reason);

    if let EncodedTransaction::Json(ui_transaction) = transaction {
        let signature = ui_transaction
            .signatures
            .first()
            .cloned()
            .ok_or_else(|| unknown("no signatures"))?;
        let UiMessage::Raw(raw) = &ui_transaction.message else {
            return Err(AnalysisError::malformed(
                &signature,
                "message",
                "parsed messages carry no instruction data",
            ));
        };

        let account_keys = raw
            .account_keys
            .iter()
            .map(|key| parse_pubkey(key))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| AnalysisError::malformed(&signature, "account_keys", reason))?;
        let instructions = raw
            .instructions
            .iter()
            .map(compiled_instruction)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| AnalysisError::malformed(&signature, "instructions", reason))?;

        return Ok(DecodedMessage {
            signature,
            account_keys,
            signer_count: raw.header.num_required_signatures as usize,
            instructions,
        });
    }

    let versioned = transaction.decode().ok_or_else(|| unknown("undecodable transaction encoding"))?;
    let signature = versioned
        .signatures
        .first()
        .map(|signature| signature.to_string())
        .ok_or_else(|| unknown("no signatures"))?;
    let message = &versioned.message;

    Ok(DecodedMessage {
        signature,
        account_keys: message.static_account_keys().to_vec(),
        signer_count: message.header().num_required_signatures as usize,
        instructions: message
            .instructions()
            .iter()
            .map(|instruction| CompiledInstruction {
                program_id_index: instruction.program_id_index,
                accounts: instruction.accounts.clone(),
                data: instruction.data.clone(),
            })
            .collect(),
    })
}

fn compiled_instruction(instruction: &UiCompiledInstruction) -> Result<CompiledInstruction, String> {
    let data = bs58::decode(&instruction.data)
        .into_vec()
        .map_err(|e| format!("instruction data is not base58: {}", e))?;
    Ok(CompiledInstruction {
        program_id_index: instruction.program_id_index,
        accounts: instruction.accounts.clone(),
        data,
    })
}

fn inner_instructions(meta: &UiTransactionStatusMeta) -> Result<BTreeMap<usize, Vec<CompiledInstruction>>, String> {
    let mut groups = BTreeMap::new();
    let Some(inner) = opt_ref(&meta.inner_instructions) else {
        return Ok(groups);
    };
    for group in inner {
        let mut instructions = Vec::with_capacity(group.instructions.len());
        for instruction in &group.instructions {
            match instruction {
                UiInstruction::Compiled(compiled) => instructions.push(compiled_instruction(compiled)?),
                UiInstruction::Parsed(_) => return Err("parsed inner instructions carry no instruction data".to_string()),
            }
        }
        groups.insert(group.index as usize, instructions);
    }
    Ok(groups)
}

fn token_balances(balances: &OptionSerializer<Vec<UiTransactionTokenBalance>>) -> Result<Vec<TokenBalance>, String> {
    let Some(balances) = opt_ref(balances) else {
        return Ok(Vec::new());
    };
    balances
        .iter()
        .map(|balance| {
            let owner = opt_ref(&balance.owner).map(|owner| parse_pubkey(owner)).transpose()?;
            let amount = balance
                .ui_token_amount
                .amount
                .parse::<u64>()
                .map_err(|e| format!("token amount {}: {}", balance.ui_token_amount.amount, e))?;
            Ok(TokenBalance {
                account_index: balance.account_index,
                owner,
                mint: parse_pubkey(&balance.mint)?,
                amount,
            })
        })
        .collect()
}

fn parse_pubkey(value: &str) -> Result<Pubkey, String> {
    Pubkey::from_str(value).map_err(|e| format!("invalid address {}: {}", value, e))
}

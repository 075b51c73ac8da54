use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use solana_pubkey::Pubkey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// One token account balance record as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub account_index: u8,
    pub owner: Option<Pubkey>,
    pub mint: Pubkey,
    pub amount: u64,
}

/// Position of an instruction inside a transaction: top-level index plus the
/// position inside that instruction's inner group, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstructionLocation {
    pub top_level: usize,
    pub inner: Option<usize>,
}

impl InstructionLocation {
    pub fn top(index: usize) -> Self {
        Self {
            top_level: index,
            inner: None,
        }
    }

    pub fn inner(
        top_level: usize,
        inner: usize,
    ) -> Self {
        Self {
            top_level,
            inner: Some(inner),
        }
    }
}

impl fmt::Display for InstructionLocation {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self.inner {
            Some(inner) => write!(f, "{}.{}", self.top_level, inner),
            None => write!(f, "{}", self.top_level),
        }
    }
}

/// Strict, provider-independent transaction record.
///
/// Providers translate their own wire formats into this shape at the boundary;
/// everything downstream only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    /// Static keys followed by loaded writable and loaded readonly keys.
    pub account_keys: Vec<Pubkey>,
    /// The first `signer_count` account keys signed the transaction.
    pub signer_count: usize,
    pub instructions: Vec<CompiledInstruction>,
    /// Inner instruction groups keyed by the index of the top-level instruction that produced them.
    pub inner_instructions: BTreeMap<usize, Vec<CompiledInstruction>>,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    pub pre_token_balances: Vec<TokenBalance>,
    pub post_token_balances: Vec<TokenBalance>,
    pub success: bool,
    pub fee: u64,
}

impl RawTransaction {
    pub fn account_key(
        &self,
        index: u8,
    ) -> Option<&Pubkey> {
        self.account_keys.get(index as usize)
    }

    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.account_keys.first()
    }

    pub fn signers(&self) -> &[Pubkey] {
        let count = self.signer_count.min(self.account_keys.len());
        &self.account_keys[..count]
    }

    pub fn is_signer(
        &self,
        address: &Pubkey,
    ) -> bool {
        self.signers().contains(address)
    }

    pub fn program_id(
        &self,
        instruction: &CompiledInstruction,
    ) -> Option<&Pubkey> {
        self.account_key(instruction.program_id_index)
    }

    /// Top-level instructions each followed by their inner group, in execution order.
    pub fn instruction_walk(&self) -> Vec<(InstructionLocation, &CompiledInstruction)> {
        let mut walk = Vec::with_capacity(self.instructions.len());
        for (index, instruction) in self.instructions.iter().enumerate() {
            walk.push((InstructionLocation::top(index), instruction));
            if let Some(inner) = self.inner_instructions.get(&index) {
                for (position, inner_instruction) in inner.iter().enumerate() {
                    walk.push((InstructionLocation::inner(index, position), inner_instruction));
                }
            }
        }
        walk
    }

    /// Owner and mint of a token account, post balances first.
    pub fn token_account_info(
        &self,
        account_index: u8,
    ) -> Option<(Option<Pubkey>, Pubkey)> {
        self.post_token_balances
            .iter()
            .chain(self.pre_token_balances.iter())
            .find(|balance| balance.account_index == account_index)
            .map(|balance| (balance.owner, balance.mint))
    }

    /// Owner of a token balance record, falling back to the account key itself.
    pub fn balance_owner(
        &self,
        balance: &TokenBalance,
    ) -> Option<Pubkey> {
        balance.owner.or_else(|| self.account_key(balance.account_index).copied())
    }

    /// Net change of a single token account over the transaction.
    pub fn token_account_delta(
        &self,
        account_index: u8,
    ) -> i128 {
        let sum = |balances: &[TokenBalance]| -> i128 {
            balances
                .iter()
                .filter(|balance| balance.account_index == account_index)
                .map(|balance| balance.amount as i128)
                .sum()
        };
        sum(&self.post_token_balances) - sum(&self.pre_token_balances)
    }

    /// Net change of everything `owner` holds of `mint` over the transaction.
    pub fn owner_token_delta(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> i128 {
        let sum = |balances: &[TokenBalance]| -> i128 {
            balances
                .iter()
                .filter(|balance| &balance.mint == mint && self.balance_owner(balance).as_ref() == Some(owner))
                .map(|balance| balance.amount as i128)
                .sum()
        };
        sum(&self.post_token_balances) - sum(&self.pre_token_balances)
    }
}

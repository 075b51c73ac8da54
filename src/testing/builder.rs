use std::collections::BTreeMap;

use solana_pubkey::Pubkey;

use crate::constants::ORCA_WHIRLPOOL_PROGRAM_ID;
use crate::constants::RAYDIUM_AMM_V4_PROGRAM_ID;
use crate::constants::RAYDIUM_SWAP_BASE_IN_TAG;
use crate::constants::SYSTEM_PROGRAM_ID;
use crate::constants::SYSTEM_TRANSFER_TAG;
use crate::constants::TOKEN_PROGRAM_ID;
use crate::constants::WHIRLPOOL_SWAP_DISCRIMINATOR;
use crate::model::CompiledInstruction;
use crate::model::RawTransaction;
use crate::model::TokenBalance;

// Instruction referencing accounts by key; compiled into indexes on build.
#[derive(Debug, Clone)]
struct KeyedInstruction {
    program: Pubkey,
    accounts: Vec<Pubkey>,
    data: Vec<u8>,
}

#[derive(Debug, Clone)]
struct KeyedBalance {
    account: Pubkey,
    owner: Option<Pubkey>,
    mint: Pubkey,
    amount: u64,
}

/// Assembles synthetic [`RawTransaction`]s from keys instead of account indexes.
///
/// Signers are placed first in the address table, every other key follows in
/// order of first use.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    signature: String,
    slot: u64,
    block_time: Option<i64>,
    success: bool,
    fee: u64,
    signers: Vec<Pubkey>,
    instructions: Vec<KeyedInstruction>,
    inner: BTreeMap<usize, Vec<KeyedInstruction>>,
    pre_token_balances: Vec<KeyedBalance>,
    post_token_balances: Vec<KeyedBalance>,
}

impl TxBuilder {
    pub fn new(signature: &str) -> Self {
        Self {
            signature: signature.to_string(),
            slot: 0,
            block_time: None,
            success: true,
            fee: 5000,
            signers: Vec::new(),
            instructions: Vec::new(),
            inner: BTreeMap::new(),
            pre_token_balances: Vec::new(),
            post_token_balances: Vec::new(),
        }
    }

    pub fn slot(
        &mut self,
        slot: u64,
    ) -> &mut Self {
        self.slot = slot;
        self
    }

    pub fn block_time(
        &mut self,
        block_time: i64,
    ) -> &mut Self {
        self.block_time = Some(block_time);
        self
    }

    pub fn failed(&mut self) -> &mut Self {
        self.success = false;
        self
    }

    pub fn signer(
        &mut self,
        signer: Pubkey,
    ) -> &mut Self {
        if !self.signers.contains(&signer) {
            self.signers.push(signer);
        }
        self
    }

    pub fn raw_instruction(
        &mut self,
        program: Pubkey,
        accounts: &[Pubkey],
        data: Vec<u8>,
    ) -> &mut Self {
        self.instructions.push(KeyedInstruction {
            program,
            accounts: accounts.to_vec(),
            data,
        });
        self
    }

    /// Appends an instruction to the inner group of top-level instruction `top_level`.
    pub fn inner_instruction(
        &mut self,
        top_level: usize,
        program: Pubkey,
        accounts: &[Pubkey],
        data: Vec<u8>,
    ) -> &mut Self {
        self.inner.entry(top_level).or_default().push(KeyedInstruction {
            program,
            accounts: accounts.to_vec(),
            data,
        });
        self
    }

    pub fn system_transfer(
        &mut self,
        from: Pubkey,
        to: Pubkey,
        lamports: u64,
    ) -> &mut Self {
        self.signer(from);
        self.raw_instruction(SYSTEM_PROGRAM_ID, &[from, to], system_transfer_data(lamports))
    }

    pub fn token_transfer(
        &mut self,
        source: Pubkey,
        destination: Pubkey,
        authority: Pubkey,
        amount: u64,
    ) -> &mut Self {
        self.signer(authority);
        self.raw_instruction(
            TOKEN_PROGRAM_ID,
            &[source, destination, authority],
            token_transfer_data(amount),
        )
    }

    pub fn token_transfer_checked(
        &mut self,
        source: Pubkey,
        mint: Pubkey,
        destination: Pubkey,
        authority: Pubkey,
        amount: u64,
        decimals: u8,
    ) -> &mut Self {
        self.signer(authority);
        let mut data = vec![12];
        data.extend_from_slice(&amount.to_le_bytes());
        data.push(decimals);
        self.raw_instruction(TOKEN_PROGRAM_ID, &[source, mint, destination, authority], data)
    }

    pub fn inner_token_transfer(
        &mut self,
        top_level: usize,
        source: Pubkey,
        destination: Pubkey,
        authority: Pubkey,
        amount: u64,
    ) -> &mut Self {
        self.inner_instruction(
            top_level,
            TOKEN_PROGRAM_ID,
            &[source, destination, authority],
            token_transfer_data(amount),
        )
    }

    /// Records a token account in both balance snapshots.
    pub fn token_balance(
        &mut self,
        account: Pubkey,
        owner: Option<Pubkey>,
        mint: Pubkey,
        pre: u64,
        post: u64,
    ) -> &mut Self {
        self.pre_token_balances.push(KeyedBalance {
            account,
            owner,
            mint,
            amount: pre,
        });
        self.post_token_balances.push(KeyedBalance {
            account,
            owner,
            mint,
            amount: post,
        });
        self
    }

    /// Raydium AMM v4 `swapBaseIn`; returns the index of the new top-level instruction.
    pub fn raydium_swap(
        &mut self,
        owner: Pubkey,
        pool: Pubkey,
        user_source: Pubkey,
        user_destination: Pubkey,
        amount_in: u64,
        minimum_out: u64,
    ) -> usize {
        self.signer(owner);
        let mut accounts = vec![TOKEN_PROGRAM_ID, pool];
        // authority, open orders, target orders, vaults, serum market accounts
        accounts.extend((0..13).map(|_| Pubkey::new_unique()));
        accounts.extend([user_source, user_destination, owner]);

        let mut data = vec![RAYDIUM_SWAP_BASE_IN_TAG];
        data.extend_from_slice(&amount_in.to_le_bytes());
        data.extend_from_slice(&minimum_out.to_le_bytes());
        self.raw_instruction(RAYDIUM_AMM_V4_PROGRAM_ID, &accounts, data);
        self.instructions.len() - 1
    }

    /// Orca Whirlpool `swap` with an exact input amount; returns the instruction index.
    pub fn whirlpool_swap(
        &mut self,
        authority: Pubkey,
        whirlpool: Pubkey,
        owner_account_a: Pubkey,
        owner_account_b: Pubkey,
        amount: u64,
        a_to_b: bool,
    ) -> usize {
        self.signer(authority);
        let accounts = vec![
            TOKEN_PROGRAM_ID,
            authority,
            whirlpool,
            owner_account_a,
            Pubkey::new_unique(),
            owner_account_b,
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
        ];

        let mut data = WHIRLPOOL_SWAP_DISCRIMINATOR.to_vec();
        data.extend_from_slice(&amount.to_le_bytes());
        data.extend_from_slice(&0u64.to_le_bytes());
        data.extend_from_slice(&0u128.to_le_bytes());
        data.push(1);
        data.push(a_to_b as u8);
        self.raw_instruction(ORCA_WHIRLPOOL_PROGRAM_ID, &accounts, data);
        self.instructions.len() - 1
    }

    pub fn build(&self) -> RawTransaction {
        let mut account_keys = self.signers.clone();
        let every_instruction = self.instructions.iter().chain(self.inner.values().flatten());
        for instruction in every_instruction {
            push_key(&instruction.program, &mut account_keys);
            for account in &instruction.accounts {
                push_key(account, &mut account_keys);
            }
        }
        for balance in self.pre_token_balances.iter().chain(&self.post_token_balances) {
            push_key(&balance.account, &mut account_keys);
        }

        let index_of = |key: &Pubkey| account_keys.iter().position(|k| k == key).unwrap_or(0) as u8;
        let compile = |instruction: &KeyedInstruction| CompiledInstruction {
            program_id_index: index_of(&instruction.program),
            accounts: instruction.accounts.iter().map(index_of).collect(),
            data: instruction.data.clone(),
        };
        let balances = |records: &[KeyedBalance]| -> Vec<TokenBalance> {
            records
                .iter()
                .map(|record| TokenBalance {
                    account_index: index_of(&record.account),
                    owner: record.owner,
                    mint: record.mint,
                    amount: record.amount,
                })
                .collect()
        };

        RawTransaction {
            signature: self.signature.clone(),
            slot: self.slot,
            block_time: self.block_time,
            signer_count: self.signers.len(),
            instructions: self.instructions.iter().map(compile).collect(),
            inner_instructions: self
                .inner
                .iter()
                .map(|(top_level, group)| (*top_level, group.iter().map(compile).collect()))
                .collect(),
            pre_balances: vec![0; account_keys.len()],
            post_balances: vec![0; account_keys.len()],
            pre_token_balances: balances(&self.pre_token_balances),
            post_token_balances: balances(&self.post_token_balances),
            success: self.success,
            fee: self.fee,
            account_keys,
        }
    }
}

fn push_key(
    key: &Pubkey,
    keys: &mut Vec<Pubkey>,
) {
    if !keys.contains(key) {
        keys.push(*key);
    }
}

pub fn system_transfer_data(lamports: u64) -> Vec<u8> {
    let mut data = SYSTEM_TRANSFER_TAG.to_le_bytes().to_vec();
    data.extend_from_slice(&lamports.to_le_bytes());
    data
}

pub fn token_transfer_data(amount: u64) -> Vec<u8> {
    let mut data = vec![3];
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

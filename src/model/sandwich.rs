use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use solana_pubkey::Pubkey;

use super::transaction::InstructionLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapProgram {
    RaydiumAmmV4,
    OrcaWhirlpool,
}

impl fmt::Display for SwapProgram {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            SwapProgram::RaydiumAmmV4 => f.write_str("raydium_amm_v4"),
            SwapProgram::OrcaWhirlpool => f.write_str("orca_whirlpool"),
        }
    }
}

/// A decoded swap; amounts missing from the instruction are backfilled from
/// the swap's token account deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swap {
    pub program: SwapProgram,
    pub pool: Pubkey,
    pub signer: Pubkey,
    pub input_mint: Option<Pubkey>,
    pub output_mint: Option<Pubkey>,
    pub input_amount: Option<u64>,
    pub output_amount: Option<u64>,
    pub origin_tx: String,
    pub location: InstructionLocation,
    pub block_time: Option<i64>,
}

impl Swap {
    /// `other` trades the same pair in the opposite direction.
    pub fn reverses(
        &self,
        other: &Swap,
    ) -> bool {
        match (self.input_mint, self.output_mint, other.input_mint, other.output_mint) {
            (Some(a_in), Some(a_out), Some(b_in), Some(b_out)) => a_in == b_out && a_out == b_in,
            _ => false,
        }
    }

    /// Output per unit of input.
    pub fn execution_rate(&self) -> Option<f64> {
        match (self.input_amount, self.output_amount) {
            (Some(input), Some(output)) if input > 0 => Some(output as f64 / input as f64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitValuation {
    pub sol: f64,
    pub usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandwichCandidate {
    pub attacker: Pubkey,
    pub pool: Pubkey,
    pub program: SwapProgram,
    pub victim: Pubkey,
    pub victim_tx: String,
    pub front_run_tx: String,
    pub back_run_tx: String,
    pub profit_amount: u128,
    pub profit_mint: Pubkey,
    /// Coarse proxy in percent: victim rate shortfall against the front-run rate.
    pub estimated_slippage_pct: Option<f64>,
    pub timestamp: Option<i64>,
    pub valuation: Option<ProfitValuation>,
}

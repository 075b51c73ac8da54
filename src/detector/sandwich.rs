use std::collections::HashMap;
use std::collections::HashSet;

use solana_pubkey::Pubkey;
use tracing::debug;
use tracing::info;

use super::swap::extract_swaps;
use crate::datasource::PriceOracle;
use crate::model::ProfitValuation;
use crate::model::RawTransaction;
use crate::model::SandwichCandidate;
use crate::model::Swap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Any,
    AcrossTransactions,
}

/// Finds a front-run and back-run by one signer on one pool around a swap by
/// someone else.
#[derive(Default)]
pub struct SandwichDetector<'a> {
    oracle: Option<&'a dyn PriceOracle>,
}

impl<'a> SandwichDetector<'a> {
    pub fn new() -> Self {
        Self { oracle: None }
    }

    /// Values detected profits through `oracle`.
    pub fn with_oracle(oracle: &'a dyn PriceOracle) -> Self {
        Self { oracle: Some(oracle) }
    }

    /// Sandwich inside a single transaction.
    pub fn detect_in_tx(
        &self,
        tx: &RawTransaction,
    ) -> Option<SandwichCandidate> {
        let swaps = extract_swaps(tx);
        let txs = HashMap::from([(tx.signature.as_str(), tx)]);
        self.search(&swaps, &txs, Scope::Any).into_iter().next()
    }

    /// Sandwich spread over consecutive transactions, given in ledger order.
    pub fn detect_in_block(
        &self,
        txs: &[RawTransaction],
    ) -> Option<SandwichCandidate> {
        let (swaps, by_signature) = index_block(txs);
        self.search(&swaps, &by_signature, Scope::Any).into_iter().next()
    }

    /// Every sandwich whose front-run and back-run land in different
    /// transactions of `txs`, given in ledger order. A swap takes part in at
    /// most one front-run or back-run.
    pub fn detect_across_transactions(
        &self,
        txs: &[RawTransaction],
    ) -> Vec<SandwichCandidate> {
        let (swaps, by_signature) = index_block(txs);
        self.search(&swaps, &by_signature, Scope::AcrossTransactions)
    }

    // (front, victim, back) combinations with a realized profit, in swap order.
    // `Scope::Any` stops at the first one.
    fn search(
        &self,
        swaps: &[Swap],
        txs: &HashMap<&str, &RawTransaction>,
        scope: Scope,
    ) -> Vec<SandwichCandidate> {
        let mut found = Vec::new();
        let mut used = HashSet::new();

        for (i, front) in swaps.iter().enumerate() {
            if used.contains(&i) {
                continue;
            }
            for (j, back) in swaps.iter().enumerate().skip(i + 1) {
                if used.contains(&j)
                    || back.pool != front.pool
                    || back.signer != front.signer
                    || !back.reverses(front)
                {
                    continue;
                }
                if scope == Scope::AcrossTransactions && back.origin_tx == front.origin_tx {
                    continue;
                }
                let Some(victim) = swaps[i + 1..j]
                    .iter()
                    .find(|swap| swap.pool == front.pool && swap.signer != front.signer)
                else {
                    continue;
                };
                let Some((profit_mint, profit_amount)) = attacker_profit(front, back, txs) else {
                    continue;
                };

                let timestamp = victim.block_time.or(front.block_time);
                let candidate = SandwichCandidate {
                    attacker: front.signer,
                    pool: front.pool,
                    program: front.program,
                    victim: victim.signer,
                    victim_tx: victim.origin_tx.clone(),
                    front_run_tx: front.origin_tx.clone(),
                    back_run_tx: back.origin_tx.clone(),
                    profit_amount,
                    profit_mint,
                    estimated_slippage_pct: estimate_slippage(front, victim),
                    timestamp,
                    valuation: self.value(&profit_mint, profit_amount, timestamp),
                };
                info!(
                    "sandwich_detected::attacker::{}::victim::{}::pool::{}::profit::{}::mint::{}",
                    candidate.attacker, candidate.victim, candidate.pool, profit_amount, profit_mint
                );
                found.push(candidate);
                if scope == Scope::Any {
                    return found;
                }
                used.insert(i);
                used.insert(j);
                break;
            }
        }
        if found.is_empty() {
            debug!("no_sandwich::swaps::{}", swaps.len());
        }
        found
    }

    fn value(
        &self,
        mint: &Pubkey,
        amount: u128,
        time: Option<i64>,
    ) -> Option<ProfitValuation> {
        let (sol, usd) = self.oracle?.price_of(mint, time)?;
        Some(ProfitValuation {
            sol: amount as f64 * sol,
            usd: amount as f64 * usd,
        })
    }
}

fn index_block(txs: &[RawTransaction]) -> (Vec<Swap>, HashMap<&str, &RawTransaction>) {
    let swaps = txs.iter().flat_map(extract_swaps).collect();
    let by_signature = txs.iter().map(|tx| (tx.signature.as_str(), tx)).collect();
    (swaps, by_signature)
}

/// Attacker's net change of the two traded mints over the front-run and
/// back-run transactions. Only opposite signs count; the growing mint is the profit.
fn attacker_profit(
    front: &Swap,
    back: &Swap,
    txs: &HashMap<&str, &RawTransaction>,
) -> Option<(Pubkey, u128)> {
    let mint_in = front.input_mint?;
    let mint_out = front.output_mint?;

    let mut signatures = vec![front.origin_tx.as_str()];
    if back.origin_tx != front.origin_tx {
        signatures.push(back.origin_tx.as_str());
    }
    let mut delta_in = 0i128;
    let mut delta_out = 0i128;
    for signature in signatures {
        let tx = txs.get(signature)?;
        delta_in += tx.owner_token_delta(&front.signer, &mint_in);
        delta_out += tx.owner_token_delta(&front.signer, &mint_out);
    }

    match (delta_in.signum(), delta_out.signum()) {
        (1, -1) => Some((mint_in, delta_in as u128)),
        (-1, 1) => Some((mint_out, delta_out as u128)),
        _ => None,
    }
}

/// Percent by which the victim's execution rate falls short of the front-run's,
/// with the front-run rate turned around when the victim traded the other way.
fn estimate_slippage(
    front: &Swap,
    victim: &Swap,
) -> Option<f64> {
    let front_rate = front.execution_rate()?;
    let victim_rate = victim.execution_rate()?;
    let reference = if victim.input_mint == front.input_mint {
        front_rate
    } else if victim.reverses(front) && front_rate > 0.0 {
        1.0 / front_rate
    } else {
        return None;
    };
    if reference <= 0.0 {
        return None;
    }
    Some(((reference - victim_rate) / reference * 100.0).max(0.0))
}

/// [`SandwichDetector::detect_in_tx`] without valuation.
pub fn detect_in_tx(tx: &RawTransaction) -> Option<SandwichCandidate> {
    SandwichDetector::new().detect_in_tx(tx)
}

pub fn detect_in_block(txs: &[RawTransaction]) -> Option<SandwichCandidate> {
    SandwichDetector::new().detect_in_block(txs)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_utils::fixtures::TestFixtures;
    use crate::test_utils::fixtures::TxBuilder;

    struct Accounts {
        attacker: Pubkey,
        victim: Pubkey,
        pool: Pubkey,
        attacker_a: Pubkey,
        attacker_b: Pubkey,
        victim_a: Pubkey,
        victim_b: Pubkey,
        mint_a: Pubkey,
        mint_b: Pubkey,
    }

    impl Accounts {
        fn new() -> Self {
            let keys = TestFixtures::sample_pubkeys(9);
            Self {
                attacker: keys[0],
                victim: keys[1],
                pool: keys[2],
                attacker_a: keys[3],
                attacker_b: keys[4],
                victim_a: keys[5],
                victim_b: keys[6],
                mint_a: keys[7],
                mint_b: keys[8],
            }
        }
    }

    // attacker buys B, victim buys B, attacker sells B for more A than spent
    fn sandwich_tx(
        accounts: &Accounts,
        attacker_a_post: u64,
    ) -> RawTransaction {
        let a = accounts;
        let mut builder = TxBuilder::new("bundle");
        builder.block_time(1_700_000_000);
        builder.raydium_swap(a.attacker, a.pool, a.attacker_a, a.attacker_b, 1_000, 0);
        builder.raydium_swap(a.victim, a.pool, a.victim_a, a.victim_b, 500, 0);
        builder.raydium_swap(a.attacker, a.pool, a.attacker_b, a.attacker_a, 900, 0);
        builder
            .token_balance(a.attacker_a, Some(a.attacker), a.mint_a, 10_000, attacker_a_post)
            .token_balance(a.attacker_b, Some(a.attacker), a.mint_b, 100, 50)
            .token_balance(a.victim_a, Some(a.victim), a.mint_a, 500, 0)
            .token_balance(a.victim_b, Some(a.victim), a.mint_b, 0, 400);
        builder.build()
    }

    #[test]
    fn detects_single_transaction_sandwich() {
        let accounts = Accounts::new();
        let tx = sandwich_tx(&accounts, 10_050);

        let candidate = detect_in_tx(&tx).unwrap();

        assert_eq!(candidate.attacker, accounts.attacker);
        assert_eq!(candidate.victim, accounts.victim);
        assert_eq!(candidate.pool, accounts.pool);
        assert_eq!(candidate.profit_mint, accounts.mint_a);
        assert_eq!(candidate.profit_amount, 50);
        assert_eq!(candidate.victim_tx, "bundle");
        assert_eq!(candidate.timestamp, Some(1_700_000_000));
    }

    #[test]
    fn no_profit_means_no_candidate() {
        let accounts = Accounts::new();
        // attacker ends with less of both mints
        let tx = sandwich_tx(&accounts, 9_900);
        assert_eq!(detect_in_tx(&tx), None);
    }

    #[test]
    fn oracle_values_the_profit() {
        let accounts = Accounts::new();
        let tx = sandwich_tx(&accounts, 10_050);
        let oracle = |_: &Pubkey, _: Option<i64>| Some((0.5, 100.0));

        let candidate = SandwichDetector::with_oracle(&oracle).detect_in_tx(&tx).unwrap();
        assert_eq!(candidate.valuation, Some(ProfitValuation { sol: 25.0, usd: 5_000.0 }));
    }

    fn cross_transaction_sandwich(a: &Accounts) -> [RawTransaction; 3] {
        let mut front = TxBuilder::new("front");
        front.raydium_swap(a.attacker, a.pool, a.attacker_a, a.attacker_b, 1_000, 0);
        front
            .token_balance(a.attacker_a, Some(a.attacker), a.mint_a, 10_000, 9_000)
            .token_balance(a.attacker_b, Some(a.attacker), a.mint_b, 50, 850);
        let mut victim = TxBuilder::new("victim");
        victim.raydium_swap(a.victim, a.pool, a.victim_a, a.victim_b, 500, 0);
        victim
            .token_balance(a.victim_a, Some(a.victim), a.mint_a, 500, 0)
            .token_balance(a.victim_b, Some(a.victim), a.mint_b, 0, 350);
        let mut back = TxBuilder::new("back");
        back.raydium_swap(a.attacker, a.pool, a.attacker_b, a.attacker_a, 850, 0);
        back.token_balance(a.attacker_b, Some(a.attacker), a.mint_b, 850, 0)
            .token_balance(a.attacker_a, Some(a.attacker), a.mint_a, 9_000, 10_100);
        [front.build(), victim.build(), back.build()]
    }

    #[test]
    fn detects_sandwich_across_transactions() {
        let a = Accounts::new();

        let candidate = detect_in_block(&cross_transaction_sandwich(&a)).unwrap();

        assert_eq!(candidate.front_run_tx, "front");
        assert_eq!(candidate.victim_tx, "victim");
        assert_eq!(candidate.back_run_tx, "back");
        assert_eq!(candidate.profit_mint, a.mint_a);
        assert_eq!(candidate.profit_amount, 100);
        // front: 800/1000, victim: 350/500
        let slippage = candidate.estimated_slippage_pct.unwrap();
        assert!((slippage - 12.5).abs() < 1e-9);
    }

    #[test]
    fn cross_transaction_search_looks_past_bundles() {
        let bundled = Accounts::new();
        let spread = Accounts::new();
        let mut txs = vec![sandwich_tx(&bundled, 10_050)];
        txs.extend(cross_transaction_sandwich(&spread));

        // the bundle comes first in ledger order
        assert_eq!(detect_in_block(&txs).unwrap().front_run_tx, "bundle");

        let found = SandwichDetector::new().detect_across_transactions(&txs);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pool, spread.pool);
        assert_eq!(
            (found[0].front_run_tx.as_str(), found[0].back_run_tx.as_str()),
            ("front", "back")
        );
    }
}

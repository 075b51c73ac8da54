use std::sync::Arc;

use chrono::DateTime;
use pretty_assertions::assert_eq;
use rstest::fixture;
use rstest::rstest;
use solana_pubkey::Pubkey;

use muhaqqiq::AnalysisEngine;
use muhaqqiq::config::Config;
use muhaqqiq::constants::TORNADO_ROUTER;
use muhaqqiq::datasource::InMemoryProvider;
use muhaqqiq::detector::analyze_similarity;
use muhaqqiq::detector::detect_in_tx;
use muhaqqiq::detector::detect_layering;
use muhaqqiq::detector::similarity;
use muhaqqiq::extractor::extract;
use muhaqqiq::model::RawTransaction;
use muhaqqiq::model::RiskCategory;
use muhaqqiq::model::SimilarityKind;
use muhaqqiq::model::TransactionTransfers;
use muhaqqiq::testing::TxBuilder;

const T1: i64 = 1_700_000_000;

struct LayeringCase {
    address: Pubkey,
    split: RawTransaction,
    aggregate: RawTransaction,
}

#[fixture]
fn layering_case() -> LayeringCase {
    build_layering_case()
}

// 3 x 100 out to distinct wallets at T1, ~300 back from distinct wallets 30 minutes later
fn build_layering_case() -> LayeringCase {
    let address = Pubkey::new_unique();

    let mut split = TxBuilder::new("t1");
    split.block_time(T1);
    for _ in 0..3 {
        split.system_transfer(address, Pubkey::new_unique(), 100);
    }

    let mut aggregate = TxBuilder::new("t2");
    aggregate.block_time(T1 + 1800);
    for amount in [98, 101, 99] {
        aggregate.system_transfer(Pubkey::new_unique(), address, amount);
    }

    LayeringCase {
        address,
        split: split.build(),
        aggregate: aggregate.build(),
    }
}

fn grouped(txs: &[&RawTransaction]) -> Vec<TransactionTransfers> {
    txs.iter()
        .map(|tx| TransactionTransfers {
            signature: tx.signature.clone(),
            block_time: tx.block_time,
            transfers: extract(tx),
        })
        .collect()
}

#[rstest]
fn split_then_aggregate_is_layering(layering_case: LayeringCase) {
    let report = detect_layering(
        &layering_case.address,
        &grouped(&[&layering_case.split, &layering_case.aggregate]),
    )
    .unwrap();

    assert!(report.detected);
    assert_eq!(report.confidence, 0.6);
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].split_tx, "t1");
    assert_eq!(report.events[0].aggregate_tx, "t2");
    assert_eq!(report.events[0].time_delta_secs, 1800);
}

#[rstest]
fn aggregate_outside_window_is_no_correlation(mut layering_case: LayeringCase) {
    layering_case.aggregate.block_time = Some(T1 + 3600);
    let report = detect_layering(
        &layering_case.address,
        &grouped(&[&layering_case.split, &layering_case.aggregate]),
    );
    assert_eq!(report, None);
}

#[test]
fn bundled_sandwich_names_attacker_victim_and_profit_mint() {
    let [x, y, pool, x_mint1, x_mint2, y_mint1, y_mint2, mint1, mint2] =
        std::array::from_fn(|_| Pubkey::new_unique());

    let mut builder = TxBuilder::new("bundle");
    builder.raydium_swap(x, pool, x_mint1, x_mint2, 1_000, 0);
    builder.raydium_swap(y, pool, y_mint1, y_mint2, 2_000, 0);
    builder.raydium_swap(x, pool, x_mint2, x_mint1, 950, 0);
    builder
        .token_balance(x_mint1, Some(x), mint1, 5_000, 5_040)
        .token_balance(x_mint2, Some(x), mint2, 1_000, 990)
        .token_balance(y_mint1, Some(y), mint1, 2_000, 0)
        .token_balance(y_mint2, Some(y), mint2, 0, 1_800);

    let candidate = detect_in_tx(&builder.build()).unwrap();

    assert_eq!(candidate.attacker, x);
    assert_eq!(candidate.victim, y);
    assert_eq!(candidate.pool, pool);
    assert_eq!(candidate.profit_mint, mint1);
    assert_eq!(candidate.profit_amount, 40);
}

#[test]
fn eight_character_prefix_is_a_poisoning_candidate() {
    let score = similarity("Aaaaaaaa1111", "Aaaaaaaa2222");
    assert_eq!(score.prefix_len, 8);
    assert_eq!(score.kind, SimilarityKind::Prefix);
    assert!(score.score >= 0.8);

    let report = analyze_similarity("Aaaaaaaa1111", &["Aaaaaaaa2222"], 0.7);
    assert_eq!(report.candidates.len(), 1);
}

#[tokio::test]
async fn engine_reports_layering_and_mixer_deposit() {
    let case = build_layering_case();
    let mut deposit = TxBuilder::new("t3");
    deposit.block_time(T1 + 2000).system_transfer(case.address, TORNADO_ROUTER, 5);
    let provider = InMemoryProvider::with_transactions([case.split, case.aggregate, deposit.build()]);

    let engine = AnalysisEngine::new(Config::default(), Arc::new(provider)).unwrap();
    let now = DateTime::from_timestamp(T1 + 7200, 0).unwrap();
    let report = engine.analyze_address(&case.address, None, now).await;

    assert!(report.is_complete());
    assert_eq!(report.summary.total_transactions, 3);
    assert_eq!(report.transfers.len(), 7);
    assert_eq!(report.routes.patterns, vec!["Mixer Usage (Deposit)".to_string()]);
    assert!(report.layering.is_some());
    assert_eq!(report.risk.confidence_for(RiskCategory::Layering), Some(0.6));
    assert_eq!(report.risk.confidence_for(RiskCategory::Route), Some(0.8));
    assert_eq!(report.risk.max_confidence, 0.8);
}

#[tokio::test]
async fn engine_marks_unavailable_transactions_as_skipped() {
    let case = build_layering_case();
    let mut provider = InMemoryProvider::with_transactions([case.split, case.aggregate]);
    provider.mark_unavailable("t2");

    let engine = AnalysisEngine::new(Config::default(), Arc::new(provider)).unwrap();
    let now = DateTime::from_timestamp(T1 + 7200, 0).unwrap();
    let report = engine.analyze_address(&case.address, None, now).await;

    assert!(!report.is_complete());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.layering, None);
}

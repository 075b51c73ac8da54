pub mod report;

use std::path::Path;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use solana_pubkey::Pubkey;
use tracing::debug;
use tracing::info;
use tracing::instrument;
use tracing::warn;

pub use report::AddressReport;
pub use report::TransactionReport;

use crate::Result;
use crate::config::Config;
use crate::config::load_config;
use crate::datasource::PriceOracle;
use crate::datasource::TransactionProvider;
use crate::datasource::collect_transactions;
use crate::detector::DustScanner;
use crate::detector::LayeringDetector;
use crate::detector::SandwichDetector;
use crate::detector::StructuringDetector;
use crate::detector::classify_all;
use crate::detector::extract_swaps;
use crate::detector::similarity::poisoning_risk;
use crate::error::AnalysisError;
use crate::extractor::extract_with_diagnostics;
use crate::graph::ExpansionLimits;
use crate::graph::ExpansionReport;
use crate::graph::classify_complexity;
use crate::graph::expand_many;
use crate::graph::label_nodes;
use crate::graph::net_flow;
use crate::model::EntityRisk;
use crate::model::FlowGraph;
use crate::model::PoisoningReport;
use crate::model::RawTransaction;
use crate::model::ReferenceSets;
use crate::model::SandwichCandidate;
use crate::model::TransactionTransfers;
use crate::risk::RiskAggregator;
use crate::risk::summarize_history;

/// Runs collection, extraction and every detector against one provider.
pub struct AnalysisEngine<P: TransactionProvider + ?Sized> {
    pub config: Config,
    pub references: ReferenceSets,
    provider: Arc<P>,
    oracle: Option<Arc<dyn PriceOracle>>,
}

impl<P: TransactionProvider + ?Sized + 'static> AnalysisEngine<P> {
    pub fn new(
        config: Config,
        provider: Arc<P>,
    ) -> Result<Self> {
        let references =
            ReferenceSets::from_config(&config.reference, config.detector.exchange_materiality_threshold)?;
        let (mixers, bridges, exchanges) = references.sizes();
        info!(
            "analysis_engine::created::mixers::{}::bridges::{}::exchanges::{}",
            mixers, bridges, exchanges
        );
        Ok(Self {
            config,
            references,
            provider,
            oracle: None,
        })
    }

    pub fn from_config_file(
        path: impl AsRef<Path>,
        provider: Arc<P>,
    ) -> Result<Self> {
        let config = load_config(path)?;
        debug!("analysis_engine::config_loaded");
        Self::new(config, provider)
    }

    /// Values sandwich profits through `oracle`.
    pub fn with_oracle(
        mut self,
        oracle: Arc<dyn PriceOracle>,
    ) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Collects the history of `address` inside the configured window and runs
    /// every detector over it. `entity` is an optional external risk assessment.
    #[instrument(name = "analyze_address", skip_all, fields(address = %address))]
    pub async fn analyze_address(
        &self,
        address: &Pubkey,
        entity: Option<&EntityRisk>,
        now: DateTime<Utc>,
    ) -> AddressReport {
        let analyzer = &self.config.analyzer;
        let detector = &self.config.detector;
        let time_cutoff = analyzer.time_cutoff(now);
        info!("analyze_address::started::cutoff::{}", time_cutoff);

        let collected = collect_transactions(
            self.provider.as_ref(),
            address,
            time_cutoff,
            analyzer.max_signatures_to_check,
            analyzer.max_concurrent_requests,
        )
        .await;
        let summary = summarize_history(&collected.history);

        let mut issues = Vec::new();
        let mut grouped = Vec::with_capacity(collected.transactions.len());
        for tx in &collected.transactions {
            let extraction = extract_with_diagnostics(tx);
            issues.extend(extraction.issues);
            grouped.push(TransactionTransfers {
                signature: tx.signature.clone(),
                block_time: tx.block_time,
                transfers: extraction.transfers,
            });
        }
        let transfers: Vec<_> = grouped.iter().flat_map(|group| group.transfers.iter().cloned()).collect();

        let routes = classify_all(&transfers, address, &self.references);
        let layering = LayeringDetector::from_config(detector).detect(address, &grouped);
        let structuring = StructuringDetector::from_config(detector).detect(&transfers, &self.references);
        let sandwiches = self.find_sandwiches(&collected.transactions);

        let dust = DustScanner::new(self.provider.as_ref(), detector.similarity_candidate_threshold)
            .scan(address, &transfers)
            .await;
        let candidates: Vec<_> = dust.dust.iter().filter_map(|dust| dust.imitates.clone()).collect();
        let poisoning = PoisoningReport {
            target: address.to_string(),
            risk: poisoning_risk(&candidates),
            candidates,
        };

        let mut aggregator = RiskAggregator::new(address);
        aggregator
            .add_routes(&routes)
            .add_structuring(&structuring)
            .add_poisoning(&poisoning)
            .add_activity(&summary, detector);
        if let Some(layering) = &layering {
            aggregator.add_layering(layering);
        }
        for sandwich in &sandwiches {
            aggregator.add_sandwich(sandwich);
        }
        if let Some(entity) = entity {
            aggregator.add_entity_risk(entity);
        }
        let risk = aggregator.finish();

        let mut skipped = collected.skipped;
        skipped.extend(dust.issues.iter().cloned());

        info!(
            "analyze_address::completed::transactions::{}::transfers::{}::max_confidence::{:.2}::skipped::{}",
            collected.transactions.len(),
            transfers.len(),
            risk.max_confidence,
            skipped.len()
        );

        AddressReport {
            address: *address,
            time_cutoff,
            summary,
            transfers,
            routes,
            layering,
            structuring,
            sandwiches,
            dust,
            poisoning,
            risk,
            skipped,
            issues,
        }
    }

    /// Transfers, flow shape, swaps and sandwich check of one transaction.
    #[instrument(name = "analyze_transaction", skip(self))]
    pub async fn analyze_transaction(
        &self,
        signature: &str,
    ) -> std::result::Result<TransactionReport, AnalysisError> {
        let tx = self.provider.get_transaction(signature).await.map_err(|e| {
            warn!("transaction_unavailable::error::{:#}", e);
            AnalysisError::provider(signature, &e)
        })?;

        let extraction = extract_with_diagnostics(&tx);
        let complexity = classify_complexity(&extraction.transfers);
        debug!(
            "analyze_transaction::transfers::{}::flow::{}",
            extraction.transfers.len(),
            complexity.kind
        );

        Ok(TransactionReport {
            signature: tx.signature.clone(),
            block_time: tx.block_time,
            success: tx.success,
            net_flow: net_flow(&extraction.transfers),
            complexity,
            swaps: extract_swaps(&tx),
            sandwich: self.sandwich_detector().detect_in_tx(&tx),
            transfers: extraction.transfers,
            issues: extraction.issues,
        })
    }

    /// Expands every seed to the configured depth and labels known infrastructure.
    pub async fn build_flow_network(
        &self,
        seeds: &[Pubkey],
        now: DateTime<Utc>,
    ) -> (FlowGraph, ExpansionReport) {
        let limits = ExpansionLimits {
            time_cutoff: self.config.analyzer.time_cutoff(now),
            ..ExpansionLimits::from_config(&self.config.analyzer)
        };
        let (mut graph, report) = expand_many(seeds, &limits, self.provider.clone()).await;
        let labeled = label_nodes(&mut graph, &self.references);
        info!(
            "flow_network::seeds::{}::nodes::{}::edges::{}::labeled::{}",
            seeds.len(),
            graph.get_node_count(),
            graph.get_edge_count(),
            labeled
        );
        (graph, report)
    }

    fn sandwich_detector(&self) -> SandwichDetector<'_> {
        match self.oracle.as_deref() {
            Some(oracle) => SandwichDetector::with_oracle(oracle),
            None => SandwichDetector::new(),
        }
    }

    // Bundled sandwiches per transaction first, then every sandwich spread
    // across transactions. `transactions` arrive in history order, newest first.
    fn find_sandwiches(
        &self,
        transactions: &[RawTransaction],
    ) -> Vec<SandwichCandidate> {
        let detector = self.sandwich_detector();
        let mut found: Vec<SandwichCandidate> = transactions.iter().filter_map(|tx| detector.detect_in_tx(tx)).collect();

        let mut ordered: Vec<RawTransaction> = transactions.iter().rev().cloned().collect();
        ordered.sort_by_key(|tx| tx.slot);
        found.extend(detector.detect_across_transactions(&ordered));
        found
    }
}

use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use solana_pubkey::Pubkey;
use tokio::task::JoinSet;
use tracing::debug;
use tracing::error;
use tracing::info;

use crate::config::AnalyzerConfig;
use crate::datasource::TransactionProvider;
use crate::datasource::collect_transactions;
use crate::error::AnalysisError;
use crate::extractor::Extraction;
use crate::extractor::extract_with_diagnostics;
use crate::model::FlowGraph;
use crate::model::ReferenceSets;

/// Bounds of one frontier expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionLimits {
    pub max_depth: usize,
    /// Oldest block time (unix seconds) still considered.
    pub time_cutoff: i64,
    pub max_signatures: usize,
    pub max_concurrent_requests: usize,
}

impl ExpansionLimits {
    pub fn new(
        max_depth: usize,
        time_cutoff: i64,
    ) -> Self {
        Self {
            max_depth,
            time_cutoff,
            max_signatures: usize::MAX,
            max_concurrent_requests: 1,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            time_cutoff: config.time_cutoff(Utc::now()),
            max_signatures: config.max_signatures_to_check,
            max_concurrent_requests: config.max_concurrent_requests,
        }
    }
}

/// What one expansion touched and what it had to skip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpansionReport {
    pub seeds: Vec<String>,
    pub addresses_expanded: usize,
    pub transactions_processed: usize,
    /// Provider failures per address or signature.
    pub skipped: Vec<AnalysisError>,
    /// Extraction issues of transactions that were still processed.
    pub issues: Vec<AnalysisError>,
}

impl ExpansionReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.issues.is_empty()
    }

    fn absorb(
        &mut self,
        other: ExpansionReport,
    ) {
        self.seeds.extend(other.seeds);
        self.addresses_expanded += other.addresses_expanded;
        self.transactions_processed += other.transactions_processed;
        self.skipped.extend(other.skipped);
        self.issues.extend(other.issues);
    }
}

/// Breadth-first expansion from `seed` through the provider's history.
///
/// Addresses at `max_depth` or deeper are never expanded; a neighbor is queued
/// once, and only while its depth stays below `max_depth`. Every node keeps the
/// minimum depth at which it was reached. A transfer seen from both of its
/// endpoints is added to the graph once.
pub async fn expand<P>(
    graph: &mut FlowGraph,
    seed: Pubkey,
    limits: &ExpansionLimits,
    provider: &P,
) -> ExpansionReport
where
    P: TransactionProvider + ?Sized,
{
    let mut report = ExpansionReport {
        seeds: vec![seed.to_string()],
        ..Default::default()
    };

    graph.add_node(seed, Some(0));
    let mut frontier: VecDeque<(Pubkey, usize)> = VecDeque::from([(seed, 0)]);
    let mut enqueued: HashSet<Pubkey> = HashSet::from([seed]);
    let mut extractions: HashMap<String, Extraction> = HashMap::new();
    let mut added: HashSet<(String, usize)> = HashSet::new();

    while let Some((address, depth)) = frontier.pop_front() {
        if depth >= limits.max_depth {
            continue;
        }

        let collected = collect_transactions(
            provider,
            &address,
            limits.time_cutoff,
            limits.max_signatures,
            limits.max_concurrent_requests,
        )
        .await;
        report.addresses_expanded += 1;
        report.skipped.extend(collected.skipped);

        for tx in collected.transactions {
            if !tx.success || tx.block_time.is_some_and(|time| time < limits.time_cutoff) {
                continue;
            }
            let extraction = extractions.entry(tx.signature.clone()).or_insert_with(|| {
                report.transactions_processed += 1;
                let extraction = extract_with_diagnostics(&tx);
                report.issues.extend(extraction.issues.iter().cloned());
                extraction
            });

            for (position, transfer) in extraction.transfers.iter().enumerate() {
                if !transfer.touches(&address) {
                    continue;
                }
                if added.insert((tx.signature.clone(), position)) {
                    graph.add_transfer(transfer.clone());
                }
                let Some(neighbor) = transfer.counterparty_of(&address) else { continue };
                graph.add_node(neighbor, Some(depth + 1));
                if depth + 1 < limits.max_depth && enqueued.insert(neighbor) {
                    frontier.push_back((neighbor, depth + 1));
                }
            }
        }

        debug!(
            "expanded_address::{}::depth::{}::frontier::{}::nodes::{}",
            address,
            depth,
            frontier.len(),
            graph.get_node_count()
        );
    }

    info!(
        "expansion_completed::seed::{}::nodes::{}::edges::{}::skipped::{}",
        seed,
        graph.get_node_count(),
        graph.get_edge_count(),
        report.skipped.len()
    );
    report
}

/// Expands independent seeds on separate tasks, each into its own graph, and
/// merges the graphs in seed order.
pub async fn expand_many<P>(
    seeds: &[Pubkey],
    limits: &ExpansionLimits,
    provider: Arc<P>,
) -> (FlowGraph, ExpansionReport)
where
    P: TransactionProvider + ?Sized + 'static,
{
    let mut tasks = JoinSet::new();
    for (position, seed) in seeds.iter().copied().enumerate() {
        let provider = provider.clone();
        let limits = limits.clone();
        tasks.spawn(async move {
            let mut graph = FlowGraph::new();
            let report = expand(&mut graph, seed, &limits, provider.as_ref()).await;
            (position, graph, report)
        });
    }

    let mut results = Vec::with_capacity(seeds.len());
    let mut failed_tasks = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => {
                error!("expansion_task_failed::{}", e);
                failed_tasks.push(AnalysisError::ProviderUnavailable {
                    target: "expansion_task".to_string(),
                    reason: e.to_string(),
                });
            },
        }
    }
    results.sort_by_key(|(position, ..)| *position);

    let mut merged = FlowGraph::new();
    let mut report = ExpansionReport::default();
    for (_, graph, seed_report) in results {
        merged.merge(graph);
        report.absorb(seed_report);
    }
    report.skipped.extend(failed_tasks);
    (merged, report)
}

/// Attaches mixer, bridge and exchange labels to known nodes.
pub fn label_nodes(
    graph: &mut FlowGraph,
    references: &ReferenceSets,
) -> usize {
    let known: Vec<(Pubkey, String)> = graph
        .get_nodes()
        .into_iter()
        .filter_map(|node| references.label_of(&node.address).map(|label| (node.address, label.to_string())))
        .collect();
    for (address, label) in &known {
        graph.set_label(address, label);
    }
    known.len()
}

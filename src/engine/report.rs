use std::collections::BTreeMap;

use serde::Serialize;
use solana_pubkey::Pubkey;

use crate::error::AnalysisError;
use crate::graph::FlowComplexity;
use crate::model::DustScan;
use crate::model::LayeringReport;
use crate::model::PoisoningReport;
use crate::model::RiskReport;
use crate::model::RouteSummary;
use crate::model::SandwichCandidate;
use crate::model::StructuringReport;
use crate::model::Swap;
use crate::model::TransactionSummary;
use crate::model::Transfer;

/// Everything learned about one address over its history window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressReport {
    pub address: Pubkey,
    pub time_cutoff: i64,
    pub summary: TransactionSummary,
    pub transfers: Vec<Transfer>,
    pub routes: RouteSummary,
    pub layering: Option<LayeringReport>,
    pub structuring: Vec<StructuringReport>,
    pub sandwiches: Vec<SandwichCandidate>,
    pub dust: DustScan,
    pub poisoning: PoisoningReport,
    pub risk: RiskReport,
    /// Addresses and transactions the provider could not deliver.
    pub skipped: Vec<AnalysisError>,
    /// Instructions and balance movements that could not be turned into clean transfers.
    pub issues: Vec<AnalysisError>,
}

impl AddressReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.issues.is_empty()
    }
}

/// Fund flow of a single transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionReport {
    pub signature: String,
    pub block_time: Option<i64>,
    pub success: bool,
    pub transfers: Vec<Transfer>,
    pub complexity: FlowComplexity,
    /// Signed net change per mint and address.
    pub net_flow: BTreeMap<Pubkey, BTreeMap<Pubkey, i128>>,
    pub swaps: Vec<Swap>,
    pub sandwich: Option<SandwichCandidate>,
    pub issues: Vec<AnalysisError>,
}

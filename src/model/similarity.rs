use serde::Deserialize;
use serde::Serialize;
use solana_pubkey::Pubkey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimilarityKind {
    Prefix,
    Suffix,
    Both,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub score: f64,
    pub kind: SimilarityKind,
    pub prefix_len: usize,
    pub suffix_len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoisoningCandidate {
    pub address: String,
    pub similarity: SimilarityScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoisoningReport {
    pub target: String,
    pub candidates: Vec<PoisoningCandidate>,
    pub risk: f64,
}

/// A one-base-unit transfer of an anonymous token into the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DustTransfer {
    pub sender: Pubkey,
    pub mint: Pubkey,
    pub origin_tx: String,
    pub block_time: Option<i64>,
    /// Closest genuine counterparty of the target the sender imitates, if any.
    pub imitates: Option<PoisoningCandidate>,
}

/// Outcome of a dust scan over one address's transfers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DustScan {
    pub checked_transactions: usize,
    pub dust: Vec<DustTransfer>,
    /// Metadata lookups that failed; those mints were not counted as dust.
    pub issues: Vec<crate::error::AnalysisError>,
}

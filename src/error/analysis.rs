use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Faults raised while turning ledger records into transfers and graphs.
///
/// None of these abort a batch: callers record them next to the partial result
/// and move on to the next instruction, transaction or address.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisError {
    /// Instruction data or account-index references could not be decoded.
    #[error("Malformed transaction {signature} at instruction {location}: {reason}")]
    MalformedTransaction {
        signature: String,
        location: String,
        reason: String,
    },

    /// A transfer endpoint could not be determined.
    #[error("Unresolved endpoint in {signature}: {reason}")]
    UnresolvedEndpoint { signature: String, reason: String },

    /// The injected provider failed for an address or signature.
    #[error("Provider unavailable for {target}: {reason}")]
    ProviderUnavailable { target: String, reason: String },
}

impl AnalysisError {
    pub fn malformed(
        signature: &str,
        location: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedTransaction {
            signature: signature.to_string(),
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn provider(
        target: impl ToString,
        error: &anyhow::Error,
    ) -> Self {
        Self::ProviderUnavailable {
            target: target.to_string(),
            reason: format!("{:#}", error),
        }
    }
}

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskCategory {
    Route,
    Layering,
    Structuring,
    Sandwich,
    Poisoning,
    EntityRisk,
    Activity,
}

impl fmt::Display for RiskCategory {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            RiskCategory::Route => "route",
            RiskCategory::Layering => "layering",
            RiskCategory::Structuring => "structuring",
            RiskCategory::Sandwich => "sandwich",
            RiskCategory::Poisoning => "poisoning",
            RiskCategory::EntityRisk => "entity_risk",
            RiskCategory::Activity => "activity",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub category: RiskCategory,
    pub confidence: f64,
    pub description: String,
    /// Transaction id or address the evidence points at.
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: RiskCategory,
    pub confidence: f64,
}

/// Per-category maxima plus every piece of evidence. Categories are not additive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub subject: String,
    pub categories: Vec<CategoryScore>,
    pub evidence: Vec<Evidence>,
    pub max_confidence: f64,
}

impl RiskReport {
    pub fn confidence_for(
        &self,
        category: RiskCategory,
    ) -> Option<f64> {
        self.categories
            .iter()
            .find(|score| score.category == category)
            .map(|score| score.confidence)
    }
}

/// Risk assessment supplied by an external entity-scoring service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRisk {
    pub risk_score: u8,
    pub labels: Vec<String>,
}

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::DetectorConfig;
use crate::constants::ILLICIT_ENTITY_LABELS;
use crate::constants::SANDWICH_CONFIDENCE;
use crate::datasource::SignatureInfo;
use crate::model::CategoryScore;
use crate::model::EntityRisk;
use crate::model::Evidence;
use crate::model::LayeringReport;
use crate::model::PoisoningReport;
use crate::model::RiskCategory;
use crate::model::RiskReport;
use crate::model::RouteSummary;
use crate::model::SandwichCandidate;
use crate::model::StructuringReport;
use crate::model::TransactionSummary;

const AMOUNT_SPLITTING_CONFIDENCE: f64 = 0.6;
const RAPID_MOVEMENT_CONFIDENCE: f64 = 0.5;
const ROUND_AMOUNT_CONFIDENCE: f64 = 0.4;
const HIGH_ENTITY_SCORE: u8 = 75;
const HIGH_ENTITY_SCORE_CONFIDENCE: f64 = 0.7;
const ILLICIT_ENTITY_CONFIDENCE: f64 = 0.9;
const HIGH_FREQUENCY_CONFIDENCE: f64 = 0.4;

/// Collects detector findings for one subject. A category's confidence is the
/// maximum of its evidence; categories never add up.
#[derive(Debug, Clone)]
pub struct RiskAggregator {
    subject: String,
    evidence: Vec<Evidence>,
}

impl RiskAggregator {
    pub fn new(subject: impl ToString) -> Self {
        Self {
            subject: subject.to_string(),
            evidence: Vec::new(),
        }
    }

    pub fn add(
        &mut self,
        category: RiskCategory,
        confidence: f64,
        description: impl Into<String>,
        reference: Option<String>,
    ) -> &mut Self {
        self.evidence.push(Evidence {
            category,
            confidence: confidence.clamp(0.0, 1.0),
            description: description.into(),
            reference,
        });
        self
    }

    /// Route bands are taken as percentages.
    pub fn add_routes(
        &mut self,
        summary: &RouteSummary,
    ) -> &mut Self {
        for route in &summary.routes {
            let label = route.counterparty_label.as_deref().unwrap_or("unlabeled");
            self.add(
                RiskCategory::Route,
                f64::from(route.risk_score) / 100.0,
                format!("{} via {} ({})", route.kind.pattern_label(), route.counterparty, label),
                Some(route.transfer.origin_tx.clone()),
            );
        }
        self
    }

    pub fn add_layering(
        &mut self,
        report: &LayeringReport,
    ) -> &mut Self {
        if !report.detected {
            return self;
        }
        for event in &report.events {
            self.add(
                RiskCategory::Layering,
                report.confidence,
                format!(
                    "split of {} re-aggregated as {} after {}s",
                    event.split_amount, event.aggregate_amount, event.time_delta_secs
                ),
                Some(event.split_tx.clone()),
            );
        }
        self
    }

    pub fn add_structuring(
        &mut self,
        reports: &[StructuringReport],
    ) -> &mut Self {
        for report in reports {
            let sender = report.sender.map(|sender| sender.to_string());
            if report.amount_splitting {
                self.add(
                    RiskCategory::Structuring,
                    AMOUNT_SPLITTING_CONFIDENCE,
                    format!("{} similar-sized transfers into bridges", report.transfer_count),
                    sender.clone(),
                );
            }
            if report.rapid_movement {
                self.add(
                    RiskCategory::Structuring,
                    RAPID_MOVEMENT_CONFIDENCE,
                    "rapid movement into bridges",
                    sender.clone(),
                );
            }
            for transfer in &report.round_amounts {
                self.add(
                    RiskCategory::Structuring,
                    ROUND_AMOUNT_CONFIDENCE,
                    format!("round amount of {} lamports bridged", transfer.amount),
                    Some(transfer.origin_tx.clone()),
                );
            }
        }
        self
    }

    pub fn add_sandwich(
        &mut self,
        candidate: &SandwichCandidate,
    ) -> &mut Self {
        self.add(
            RiskCategory::Sandwich,
            SANDWICH_CONFIDENCE,
            format!(
                "{} sandwiched {} on pool {} for {} of {}",
                candidate.attacker, candidate.victim, candidate.pool, candidate.profit_amount, candidate.profit_mint
            ),
            Some(candidate.victim_tx.clone()),
        )
    }

    pub fn add_poisoning(
        &mut self,
        report: &PoisoningReport,
    ) -> &mut Self {
        if report.candidates.is_empty() {
            return self;
        }
        for candidate in &report.candidates {
            self.add(
                RiskCategory::Poisoning,
                report.risk,
                format!(
                    "{} resembles {} (score {:.2})",
                    candidate.address, report.target, candidate.similarity.score
                ),
                Some(candidate.address.clone()),
            );
        }
        self
    }

    pub fn add_entity_risk(
        &mut self,
        entity: &EntityRisk,
    ) -> &mut Self {
        if entity.risk_score > HIGH_ENTITY_SCORE {
            self.add(
                RiskCategory::EntityRisk,
                HIGH_ENTITY_SCORE_CONFIDENCE,
                format!("external risk score {}", entity.risk_score),
                None,
            );
        }
        let illicit: Vec<&str> = entity
            .labels
            .iter()
            .map(String::as_str)
            .filter(|label| ILLICIT_ENTITY_LABELS.contains(label))
            .collect();
        if !illicit.is_empty() {
            self.add(
                RiskCategory::EntityRisk,
                ILLICIT_ENTITY_CONFIDENCE,
                format!("associated with illicit entity: {}", illicit.join(", ")),
                None,
            );
        }
        self
    }

    pub fn add_activity(
        &mut self,
        summary: &TransactionSummary,
        config: &DetectorConfig,
    ) -> &mut Self {
        if summary.total_transactions <= config.high_frequency_min_transactions {
            return self;
        }
        match summary.transactions_per_hour() {
            Some(rate) if rate > config.high_frequency_per_hour => self.add(
                RiskCategory::Activity,
                HIGH_FREQUENCY_CONFIDENCE,
                format!("high transaction frequency: {:.1} per hour", rate),
                None,
            ),
            _ => self,
        }
    }

    pub fn finish(self) -> RiskReport {
        let mut maxima: BTreeMap<RiskCategory, f64> = BTreeMap::new();
        for evidence in &self.evidence {
            let entry = maxima.entry(evidence.category).or_insert(0.0);
            *entry = entry.max(evidence.confidence);
        }
        let max_confidence = maxima.values().copied().fold(0.0, f64::max);
        debug!(
            "risk_aggregated::subject::{}::evidence::{}::max_confidence::{:.2}",
            self.subject,
            self.evidence.len(),
            max_confidence
        );

        RiskReport {
            subject: self.subject,
            categories: maxima
                .into_iter()
                .map(|(category, confidence)| CategoryScore { category, confidence })
                .collect(),
            evidence: self.evidence,
            max_confidence,
        }
    }
}

/// Counts and time range of a signature history.
pub fn summarize_history(history: &[SignatureInfo]) -> TransactionSummary {
    let successful = history.iter().filter(|info| info.success).count();
    let times = history.iter().filter_map(|info| info.block_time);
    TransactionSummary {
        total_transactions: history.len(),
        successful,
        failed: history.len() - successful,
        earliest: times.clone().min(),
        latest: times.max(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::LayeringEvent;

    fn layering_report(detected: bool) -> LayeringReport {
        LayeringReport {
            address: solana_pubkey::Pubkey::new_unique(),
            detected,
            confidence: 0.6,
            events: vec![LayeringEvent {
                split_tx: "split".to_string(),
                aggregate_tx: "aggregate".to_string(),
                mint: None,
                split_amount: 100,
                aggregate_amount: 95,
                time_delta_secs: 60,
                amount_delta_ratio: 0.05,
            }],
        }
    }

    #[test]
    fn categories_take_the_maximum() {
        let mut aggregator = RiskAggregator::new("subject");
        aggregator
            .add(RiskCategory::Structuring, 0.4, "round", None)
            .add(RiskCategory::Structuring, 0.6, "splitting", None)
            .add_layering(&layering_report(true));

        let report = aggregator.finish();
        assert_eq!(report.confidence_for(RiskCategory::Structuring), Some(0.6));
        assert_eq!(report.confidence_for(RiskCategory::Layering), Some(0.6));
        assert_eq!(report.evidence.len(), 3);
        assert_eq!(report.max_confidence, 0.6);
    }

    #[test]
    fn undetected_layering_adds_nothing() {
        let mut aggregator = RiskAggregator::new("subject");
        aggregator.add_layering(&layering_report(false));
        let report = aggregator.finish();
        assert!(report.evidence.is_empty());
        assert_eq!(report.max_confidence, 0.0);
    }

    #[test]
    fn entity_risk_rules() {
        let mut aggregator = RiskAggregator::new("subject");
        aggregator.add_entity_risk(&EntityRisk {
            risk_score: 80,
            labels: vec!["exchange".to_string(), "scam".to_string()],
        });
        let report = aggregator.finish();
        assert_eq!(report.evidence.len(), 2);
        assert_eq!(report.confidence_for(RiskCategory::EntityRisk), Some(0.9));
    }

    #[test]
    fn high_frequency_needs_volume_and_rate() {
        let config = DetectorConfig::default();
        let busy = TransactionSummary {
            total_transactions: 600,
            successful: 600,
            failed: 0,
            earliest: Some(0),
            latest: Some(3600 * 10),
        };
        let slow = TransactionSummary {
            latest: Some(3600 * 100),
            ..busy
        };

        let mut aggregator = RiskAggregator::new("busy");
        aggregator.add_activity(&busy, &config);
        assert_eq!(aggregator.finish().confidence_for(RiskCategory::Activity), Some(0.4));

        let mut aggregator = RiskAggregator::new("slow");
        aggregator.add_activity(&slow, &config);
        assert_eq!(aggregator.finish().confidence_for(RiskCategory::Activity), None);
    }

    #[test]
    fn summarizes_history() {
        let history = vec![
            SignatureInfo {
                signature: "a".to_string(),
                block_time: Some(30),
                success: true,
            },
            SignatureInfo {
                signature: "b".to_string(),
                block_time: None,
                success: false,
            },
            SignatureInfo {
                signature: "c".to_string(),
                block_time: Some(10),
                success: true,
            },
        ];
        let summary = summarize_history(&history);
        assert_eq!(summary.total_transactions, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.earliest, Some(10));
        assert_eq!(summary.latest, Some(30));
    }
}

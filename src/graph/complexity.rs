use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use solana_pubkey::Pubkey;

use crate::model::Transfer;

/// Shape of the value movement inside one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    NoTransfer,
    Simple,
    Split,
    Aggregation,
    Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for FlowKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            FlowKind::NoTransfer => "no_transfer",
            FlowKind::Simple => "simple_transfer",
            FlowKind::Split => "split",
            FlowKind::Aggregation => "aggregation",
            FlowKind::Complex => "complex",
        };
        f.write_str(name)
    }
}

/// Fan-out above this many counterparties makes a split or aggregation `High`.
const MEDIUM_FAN_OUT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowComplexity {
    pub kind: FlowKind,
    pub level: ComplexityLevel,
    pub sources: usize,
    pub destinations: usize,
}

/// Classifies one transaction's transfers by their distinct resolved endpoints.
pub fn classify_complexity(transfers: &[Transfer]) -> FlowComplexity {
    let sources: BTreeSet<Pubkey> = transfers.iter().filter_map(|t| t.source).collect();
    let destinations: BTreeSet<Pubkey> = transfers.iter().filter_map(|t| t.destination).collect();
    let fan_out_level = |count: usize| {
        if count <= MEDIUM_FAN_OUT {
            ComplexityLevel::Medium
        } else {
            ComplexityLevel::High
        }
    };

    let (kind, level) = if transfers.is_empty() {
        (FlowKind::NoTransfer, ComplexityLevel::Low)
    } else {
        match (sources.len(), destinations.len()) {
            (1, 1) => (FlowKind::Simple, ComplexityLevel::Low),
            (1, n) if n > 1 => (FlowKind::Split, fan_out_level(n)),
            (n, 1) if n > 1 => (FlowKind::Aggregation, fan_out_level(n)),
            _ => (FlowKind::Complex, ComplexityLevel::High),
        }
    };

    FlowComplexity {
        kind,
        level,
        sources: sources.len(),
        destinations: destinations.len(),
    }
}

/// Net change per mint and address; unresolved endpoints are left out.
/// Native transfers are keyed by the native mint sentinel.
pub fn net_flow(transfers: &[Transfer]) -> BTreeMap<Pubkey, BTreeMap<Pubkey, i128>> {
    let mut flows: BTreeMap<Pubkey, BTreeMap<Pubkey, i128>> = BTreeMap::new();
    for transfer in transfers {
        let Some(mint) = transfer.mint_or_native() else { continue };
        let per_address = flows.entry(mint).or_default();
        if let Some(source) = transfer.source {
            *per_address.entry(source).or_default() -= transfer.amount as i128;
        }
        if let Some(destination) = transfer.destination {
            *per_address.entry(destination).or_default() += transfer.amount as i128;
        }
    }
    flows
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::fixtures::TestFixtures;

    fn fan_out(count: usize) -> Vec<Transfer> {
        let source = TestFixtures::sample_pubkey();
        TestFixtures::sample_pubkeys(count)
            .into_iter()
            .map(|destination| TestFixtures::native_transfer(source, destination, 10, "tx", 0))
            .collect()
    }

    #[rstest]
    #[case(0, FlowKind::NoTransfer, ComplexityLevel::Low)]
    #[case(1, FlowKind::Simple, ComplexityLevel::Low)]
    #[case(5, FlowKind::Split, ComplexityLevel::Medium)]
    #[case(6, FlowKind::Split, ComplexityLevel::High)]
    fn classifies_fan_out(
        #[case] destinations: usize,
        #[case] kind: FlowKind,
        #[case] level: ComplexityLevel,
    ) {
        let complexity = classify_complexity(&fan_out(destinations));
        assert_eq!((complexity.kind, complexity.level), (kind, level));
    }

    #[test]
    fn classifies_aggregation_and_complex() {
        let sink = TestFixtures::sample_pubkey();
        let mut transfers: Vec<Transfer> = TestFixtures::sample_pubkeys(3)
            .into_iter()
            .map(|source| TestFixtures::native_transfer(source, sink, 10, "tx", 0))
            .collect();
        assert_eq!(classify_complexity(&transfers).kind, FlowKind::Aggregation);

        transfers.extend(fan_out(2));
        let complexity = classify_complexity(&transfers);
        assert_eq!((complexity.kind, complexity.level), (FlowKind::Complex, ComplexityLevel::High));
    }

    #[test]
    fn net_flow_balances_per_mint() {
        let [a, b, c, mint]: [Pubkey; 4] = TestFixtures::sample_pubkeys(4).try_into().unwrap();
        let transfers = vec![
            TestFixtures::token_transfer(a, b, mint, 100, "tx", 0),
            TestFixtures::token_transfer(b, c, mint, 40, "tx", 0),
        ];

        let flows = net_flow(&transfers);
        let per_address = &flows[&mint];
        assert_eq!(per_address[&a], -100);
        assert_eq!(per_address[&b], 60);
        assert_eq!(per_address[&c], 40);
        assert_eq!(per_address.values().sum::<i128>(), 0);
    }
}

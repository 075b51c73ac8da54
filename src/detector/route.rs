use solana_pubkey::Pubkey;
use tracing::debug;

use crate::model::ReferenceSets;
use crate::model::Route;
use crate::model::RouteKind;
use crate::model::RouteSummary;
use crate::model::Transfer;

type LabelLookup = for<'a> fn(&'a ReferenceSets, &Pubkey) -> Option<&'a str>;

/// Labels one transfer of `origin` against the reference sets.
///
/// Mixers take precedence over bridges, bridges over exchanges. Exchange routes
/// are a materiality heuristic: any resolved counterparty receiving or sending
/// more than the threshold qualifies, known hot wallets only add a label.
pub fn classify(
    transfer: &Transfer,
    origin: &Pubkey,
    references: &ReferenceSets,
) -> Option<Route> {
    let outbound = transfer.destination.filter(|_| transfer.source.as_ref() == Some(origin));
    let inbound = transfer.source.filter(|_| transfer.destination.as_ref() == Some(origin));

    let infrastructure: [(RouteKind, Option<Pubkey>, LabelLookup); 4] = [
        (RouteKind::MixerDeposit, outbound, ReferenceSets::mixer_label),
        (RouteKind::MixerWithdrawal, inbound, ReferenceSets::mixer_label),
        (RouteKind::BridgeOutbound, outbound, ReferenceSets::bridge_label),
        (RouteKind::BridgeInbound, inbound, ReferenceSets::bridge_label),
    ];
    for (kind, counterparty, lookup) in infrastructure {
        let Some(counterparty) = counterparty else { continue };
        if let Some(label) = lookup(references, &counterparty) {
            return Some(route(kind, transfer, counterparty, Some(label)));
        }
    }

    if transfer.amount <= references.exchange_materiality_threshold {
        return None;
    }
    match (outbound, inbound) {
        (Some(destination), None) => Some(route(
            RouteKind::ExchangeDeposit,
            transfer,
            destination,
            references.exchange_label(&destination),
        )),
        (None, Some(source)) => Some(route(
            RouteKind::ExchangeWithdrawal,
            transfer,
            source,
            references.exchange_label(&source),
        )),
        _ => None,
    }
}

/// Every route of `origin` in transfer order, with the implied pattern labels.
pub fn classify_all(
    transfers: &[Transfer],
    origin: &Pubkey,
    references: &ReferenceSets,
) -> RouteSummary {
    let routes: Vec<Route> = transfers
        .iter()
        .filter_map(|transfer| classify(transfer, origin, references))
        .collect();
    debug!("classified_routes::origin::{}::routes::{}", origin, routes.len());
    RouteSummary::from_routes(routes)
}

fn route(
    kind: RouteKind,
    transfer: &Transfer,
    counterparty: Pubkey,
    label: Option<&str>,
) -> Route {
    Route {
        kind,
        transfer: transfer.clone(),
        counterparty,
        counterparty_label: label.map(str::to_string),
        risk_score: kind.risk_score(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::constants::BINANCE_1;
    use crate::constants::TORNADO_ROUTER;
    use crate::constants::WORMHOLE_TOKEN_BRIDGE;
    use crate::test_utils::fixtures::TestFixtures;

    fn references() -> ReferenceSets {
        ReferenceSets::builtin(1_000)
    }

    #[test]
    fn mixer_deposit_scores_eighty() {
        let origin = TestFixtures::sample_pubkey();
        let transfer = TestFixtures::native_transfer(origin, TORNADO_ROUTER, 5, "tx", 0);

        let route = classify(&transfer, &origin, &references()).unwrap();
        assert_eq!(route.kind, RouteKind::MixerDeposit);
        assert_eq!(route.risk_score, 80);
        assert_eq!(route.counterparty, TORNADO_ROUTER);
    }

    #[test]
    fn bridge_inbound_scores_fifty() {
        let origin = TestFixtures::sample_pubkey();
        let transfer = TestFixtures::native_transfer(WORMHOLE_TOKEN_BRIDGE, origin, 5, "tx", 0);

        let route = classify(&transfer, &origin, &references()).unwrap();
        assert_eq!(route.kind, RouteKind::BridgeInbound);
        assert_eq!(route.risk_score, 50);
    }

    #[test]
    fn mixer_wins_over_bridge() {
        let origin = TestFixtures::sample_pubkey();
        let both = TestFixtures::sample_pubkey();
        let references = references().with_bridge(both, "bridge").with_mixer(both, "mixer");
        let transfer = TestFixtures::native_transfer(origin, both, 5, "tx", 0);

        let route = classify(&transfer, &origin, &references).unwrap();
        assert_eq!(route.kind, RouteKind::MixerDeposit);
        assert_eq!(route.counterparty_label.as_deref(), Some("mixer"));
    }

    #[test]
    fn exchange_needs_material_amount() {
        let origin = TestFixtures::sample_pubkey();
        let small = TestFixtures::native_transfer(origin, BINANCE_1, 1_000, "tx", 0);
        let large = TestFixtures::native_transfer(origin, BINANCE_1, 1_001, "tx", 0);

        assert_eq!(classify(&small, &origin, &references()), None);
        let route = classify(&large, &origin, &references()).unwrap();
        assert_eq!(route.kind, RouteKind::ExchangeDeposit);
        assert_eq!(route.risk_score, 40);
        assert_eq!(route.counterparty_label.as_deref(), Some("Binance 1"));
    }

    #[test]
    fn unrelated_transfer_has_no_route() {
        let origin = TestFixtures::sample_pubkey();
        let transfer =
            TestFixtures::native_transfer(TestFixtures::sample_pubkey(), TORNADO_ROUTER, 5_000, "tx", 0);
        assert_eq!(classify(&transfer, &origin, &references()), None);
    }

    #[test]
    fn summary_keeps_max_score_and_labels() {
        let origin = TestFixtures::sample_pubkey();
        let transfers = vec![
            TestFixtures::native_transfer(origin, WORMHOLE_TOKEN_BRIDGE, 5, "a", 0),
            TestFixtures::native_transfer(origin, TORNADO_ROUTER, 5, "b", 0),
        ];

        let summary = classify_all(&transfers, &origin, &references());
        assert_eq!(summary.risk_score, 80);
        assert_eq!(
            summary.patterns,
            vec!["Mixer Usage (Deposit)".to_string(), "Cross-Chain Bridging (Outbound)".to_string()]
        );
    }
}

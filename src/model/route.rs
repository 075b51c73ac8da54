use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use solana_pubkey::Pubkey;

use super::transfer::Transfer;
use crate::constants::BRIDGE_INBOUND_RISK;
use crate::constants::BRIDGE_OUTBOUND_RISK;
use crate::constants::EXCHANGE_RISK;
use crate::constants::MIXER_DEPOSIT_RISK;
use crate::constants::MIXER_WITHDRAWAL_RISK;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RouteKind {
    MixerDeposit,
    MixerWithdrawal,
    BridgeOutbound,
    BridgeInbound,
    ExchangeDeposit,
    ExchangeWithdrawal,
}

impl RouteKind {
    /// Coarse ordinal risk band, not a probability.
    pub fn risk_score(self) -> u8 {
        match self {
            RouteKind::MixerDeposit => MIXER_DEPOSIT_RISK,
            RouteKind::MixerWithdrawal => MIXER_WITHDRAWAL_RISK,
            RouteKind::BridgeOutbound => BRIDGE_OUTBOUND_RISK,
            RouteKind::BridgeInbound => BRIDGE_INBOUND_RISK,
            RouteKind::ExchangeDeposit | RouteKind::ExchangeWithdrawal => EXCHANGE_RISK,
        }
    }

    pub fn pattern_label(self) -> &'static str {
        match self {
            RouteKind::MixerDeposit => "Mixer Usage (Deposit)",
            RouteKind::MixerWithdrawal => "Mixer Usage (Withdrawal)",
            RouteKind::BridgeOutbound => "Cross-Chain Bridging (Outbound)",
            RouteKind::BridgeInbound => "Cross-Chain Bridging (Inbound)",
            RouteKind::ExchangeDeposit => "Exchange Interaction (Deposit)",
            RouteKind::ExchangeWithdrawal => "Exchange Interaction (Withdrawal)",
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            RouteKind::MixerDeposit => "mixer_deposit",
            RouteKind::MixerWithdrawal => "mixer_withdrawal",
            RouteKind::BridgeOutbound => "bridge_outbound",
            RouteKind::BridgeInbound => "bridge_inbound",
            RouteKind::ExchangeDeposit => "exchange_deposit",
            RouteKind::ExchangeWithdrawal => "exchange_withdrawal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub kind: RouteKind,
    pub transfer: Transfer,
    pub counterparty: Pubkey,
    pub counterparty_label: Option<String>,
    pub risk_score: u8,
}

/// Routes found for one origin address plus the labels they imply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub routes: Vec<Route>,
    pub risk_score: u8,
    pub patterns: Vec<String>,
}

impl RouteSummary {
    pub fn from_routes(routes: Vec<Route>) -> Self {
        let risk_score = routes.iter().map(|route| route.risk_score).max().unwrap_or(0);
        let mut kinds: Vec<RouteKind> = routes.iter().map(|route| route.kind).collect();
        kinds.sort();
        kinds.dedup();
        let patterns = kinds.into_iter().map(|kind| kind.pattern_label().to_string()).collect();
        Self {
            routes,
            risk_score,
            patterns,
        }
    }
}

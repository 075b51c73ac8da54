use std::collections::HashMap;
use std::str::FromStr;

use solana_pubkey::Pubkey;

use crate::config::LabeledAddress;
use crate::config::ReferenceConfig;
use crate::constants::KNOWN_BRIDGES;
use crate::constants::KNOWN_EXCHANGES;
use crate::constants::KNOWN_MIXERS;
use crate::error::ConfigError;

/// Frozen infrastructure tables, built once at start-up and passed explicitly.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSets {
    mixers: HashMap<Pubkey, String>,
    bridges: HashMap<Pubkey, String>,
    exchanges: HashMap<Pubkey, String>,
    pub exchange_materiality_threshold: u64,
}

impl ReferenceSets {
    pub fn new(exchange_materiality_threshold: u64) -> Self {
        Self {
            exchange_materiality_threshold,
            ..Default::default()
        }
    }

    /// Built-in mixer, bridge and exchange tables.
    pub fn builtin(exchange_materiality_threshold: u64) -> Self {
        let table = |entries: &[(Pubkey, &str)]| {
            entries
                .iter()
                .map(|(address, label)| (*address, label.to_string()))
                .collect::<HashMap<_, _>>()
        };
        Self {
            mixers: table(KNOWN_MIXERS),
            bridges: table(KNOWN_BRIDGES),
            exchanges: table(KNOWN_EXCHANGES),
            exchange_materiality_threshold,
        }
    }

    /// Built-in tables extended with the configured extras.
    pub fn from_config(
        config: &ReferenceConfig,
        exchange_materiality_threshold: u64,
    ) -> Result<Self, ConfigError> {
        let mut sets = Self::builtin(exchange_materiality_threshold);
        extend(&mut sets.mixers, "reference.mixers", &config.mixers)?;
        extend(&mut sets.bridges, "reference.bridges", &config.bridges)?;
        extend(&mut sets.exchanges, "reference.exchanges", &config.exchanges)?;
        Ok(sets)
    }

    pub fn with_mixer(
        mut self,
        address: Pubkey,
        label: &str,
    ) -> Self {
        self.mixers.insert(address, label.to_string());
        self
    }

    pub fn with_bridge(
        mut self,
        address: Pubkey,
        label: &str,
    ) -> Self {
        self.bridges.insert(address, label.to_string());
        self
    }

    pub fn with_exchange(
        mut self,
        address: Pubkey,
        label: &str,
    ) -> Self {
        self.exchanges.insert(address, label.to_string());
        self
    }

    pub fn mixer_label(
        &self,
        address: &Pubkey,
    ) -> Option<&str> {
        self.mixers.get(address).map(String::as_str)
    }

    pub fn bridge_label(
        &self,
        address: &Pubkey,
    ) -> Option<&str> {
        self.bridges.get(address).map(String::as_str)
    }

    pub fn exchange_label(
        &self,
        address: &Pubkey,
    ) -> Option<&str> {
        self.exchanges.get(address).map(String::as_str)
    }

    /// Any known label for a node in the flow graph.
    pub fn label_of(
        &self,
        address: &Pubkey,
    ) -> Option<&str> {
        self.mixer_label(address)
            .or_else(|| self.bridge_label(address))
            .or_else(|| self.exchange_label(address))
    }

    pub fn is_bridge(
        &self,
        address: &Pubkey,
    ) -> bool {
        self.bridges.contains_key(address)
    }

    /// Table sizes as (mixers, bridges, exchanges).
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.mixers.len(), self.bridges.len(), self.exchanges.len())
    }
}

fn extend(
    table: &mut HashMap<Pubkey, String>,
    section: &str,
    entries: &[LabeledAddress],
) -> Result<(), ConfigError> {
    for entry in entries {
        let address = Pubkey::from_str(&entry.address).map_err(|_| ConfigError::InvalidAddress {
            section: section.to_string(),
            address: entry.address.clone(),
        })?;
        table.insert(address, entry.label.clone());
    }
    Ok(())
}

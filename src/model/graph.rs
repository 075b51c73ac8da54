use std::collections::HashMap;

use petgraph::Graph;
use petgraph::prelude::*;
use serde::Deserialize;
use serde::Serialize;
use solana_pubkey::Pubkey;

use super::transfer::Transfer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressNode {
    pub address: Pubkey,
    /// Minimum expansion depth at which the address was reached.
    pub depth: Option<usize>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintTotal {
    pub mint: Option<Pubkey>,
    pub amount: u128,
}

/// All value that moved from `source` to `destination`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub source: Pubkey,
    pub destination: Pubkey,
    pub transfers: Vec<Transfer>,
    pub count: usize,
    pub totals: Vec<MintTotal>,
}

impl FlowEdge {
    fn new(
        source: Pubkey,
        destination: Pubkey,
    ) -> Self {
        Self {
            source,
            destination,
            transfers: Vec::new(),
            count: 0,
            totals: Vec::new(),
        }
    }

    fn push(
        &mut self,
        transfer: Transfer,
    ) {
        match self.totals.iter_mut().find(|total| total.mint == transfer.mint) {
            Some(total) => total.amount += transfer.amount as u128,
            None => self.totals.push(MintTotal {
                mint: transfer.mint,
                amount: transfer.amount as u128,
            }),
        }
        self.transfers.push(transfer);
        self.count = self.transfers.len();
    }

    pub fn total_amount(
        &self,
        mint: Option<&Pubkey>,
    ) -> u128 {
        self.totals
            .iter()
            .find(|total| total.mint.as_ref() == mint)
            .map(|total| total.amount)
            .unwrap_or(0)
    }
}

/// Append-only directed flow graph keyed by address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowGraph {
    graph: Graph<AddressNode, FlowEdge>,
    #[serde(skip)]
    node_indices: HashMap<Pubkey, NodeIndex>,
    #[serde(skip)]
    edge_indices: HashMap<(Pubkey, Pubkey), EdgeIndex>,
    /// Transfers with an unknown endpoint; they count towards volume only.
    unattributed: Vec<Transfer>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // Rebuild the index maps from the graph (useful after deserialization)
    pub fn rebuild_indices(&mut self) {
        self.node_indices.clear();
        self.edge_indices.clear();
        for node_index in self.graph.node_indices() {
            if let Some(node) = self.graph.node_weight(node_index) {
                self.node_indices.insert(node.address, node_index);
            }
        }
        for edge_index in self.graph.edge_indices() {
            if let Some(edge) = self.graph.edge_weight(edge_index) {
                self.edge_indices.insert((edge.source, edge.destination), edge_index);
            }
        }
    }

    fn ensure_indices(&mut self) {
        if self.node_indices.len() != self.graph.node_count() || self.edge_indices.len() != self.graph.edge_count() {
            self.rebuild_indices();
        }
    }

    /// Inserts the address if missing; an existing node keeps the smaller depth.
    pub fn add_node(
        &mut self,
        address: Pubkey,
        depth: Option<usize>,
    ) -> NodeIndex {
        self.ensure_indices();

        if let Some(&idx) = self.node_indices.get(&address) {
            if let Some(node) = self.graph.node_weight_mut(idx) {
                node.depth = min_depth(node.depth, depth);
            }
            return idx;
        }

        let idx = self.graph.add_node(AddressNode {
            address,
            depth,
            label: None,
        });
        self.node_indices.insert(address, idx);
        idx
    }

    pub fn set_label(
        &mut self,
        address: &Pubkey,
        label: &str,
    ) {
        self.ensure_indices();
        if let Some(&idx) = self.node_indices.get(address) {
            if let Some(node) = self.graph.node_weight_mut(idx) {
                node.label.get_or_insert_with(|| label.to_string());
            }
        }
    }

    pub fn add_transfer(
        &mut self,
        transfer: Transfer,
    ) {
        let (Some(source), Some(destination)) = (transfer.source, transfer.destination) else {
            self.unattributed.push(transfer);
            return;
        };

        let source_idx = self.add_node(source, None);
        let destination_idx = self.add_node(destination, None);

        let edge_idx = match self.edge_indices.get(&(source, destination)) {
            Some(&idx) => idx,
            None => {
                let idx = self
                    .graph
                    .add_edge(source_idx, destination_idx, FlowEdge::new(source, destination));
                self.edge_indices.insert((source, destination), idx);
                idx
            },
        };

        if let Some(edge) = self.graph.edge_weight_mut(edge_idx) {
            edge.push(transfer);
        }
    }

    pub fn add_transfers(
        &mut self,
        transfers: impl IntoIterator<Item = Transfer>,
    ) {
        for transfer in transfers {
            self.add_transfer(transfer);
        }
    }

    /// Union with another graph: nodes keep the minimum depth and the first
    /// label, duplicate edges concatenate their transfer lists.
    pub fn merge(
        &mut self,
        other: FlowGraph,
    ) {
        let FlowGraph {
            graph, unattributed, ..
        } = other;
        let (nodes, edges) = graph.into_nodes_edges();

        for node in nodes {
            let AddressNode {
                address,
                depth,
                label,
            } = node.weight;
            self.add_node(address, depth);
            if let Some(label) = label {
                self.set_label(&address, &label);
            }
        }
        for edge in edges {
            self.add_transfers(edge.weight.transfers);
        }
        self.unattributed.extend(unattributed);
    }

    pub fn node(
        &self,
        address: &Pubkey,
    ) -> Option<&AddressNode> {
        match self.node_indices.get(address) {
            Some(&idx) => self.graph.node_weight(idx),
            None => self.graph.node_weights().find(|node| &node.address == address),
        }
    }

    pub fn depth_of(
        &self,
        address: &Pubkey,
    ) -> Option<usize> {
        self.node(address).and_then(|node| node.depth)
    }

    pub fn edge(
        &self,
        source: &Pubkey,
        destination: &Pubkey,
    ) -> Option<&FlowEdge> {
        match self.edge_indices.get(&(*source, *destination)) {
            Some(&idx) => self.graph.edge_weight(idx),
            None => self
                .graph
                .edge_weights()
                .find(|edge| &edge.source == source && &edge.destination == destination),
        }
    }

    pub fn contains(
        &self,
        address: &Pubkey,
    ) -> bool {
        self.node(address).is_some()
    }

    pub fn get_node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn get_edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn get_nodes(&self) -> Vec<&AddressNode> {
        self.graph.node_weights().collect()
    }

    pub fn get_edges(&self) -> Vec<&FlowEdge> {
        self.graph.edge_weights().collect()
    }

    pub fn unattributed(&self) -> &[Transfer] {
        &self.unattributed
    }

    /// Everything moved in `mint`, attributed or not.
    pub fn total_volume(
        &self,
        mint: Option<&Pubkey>,
    ) -> u128 {
        let attributed: u128 = self.graph.edge_weights().map(|edge| edge.total_amount(mint)).sum();
        let unattributed: u128 = self
            .unattributed
            .iter()
            .filter(|transfer| transfer.mint.as_ref() == mint)
            .map(|transfer| transfer.amount as u128)
            .sum();
        attributed + unattributed
    }

    pub fn inner(&self) -> &Graph<AddressNode, FlowEdge> {
        &self.graph
    }
}

fn min_depth(
    current: Option<usize>,
    candidate: Option<usize>,
) -> Option<usize> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_utils::fixtures::TestFixtures;

    #[test]
    fn node_keeps_the_smallest_depth() {
        let address = TestFixtures::sample_pubkey();
        let mut graph = FlowGraph::new();

        graph.add_node(address, Some(2));
        graph.add_node(address, None);
        graph.add_node(address, Some(1));
        graph.add_node(address, Some(3));

        assert_eq!(graph.depth_of(&address), Some(1));
        assert_eq!(graph.get_node_count(), 1);
    }

    #[test]
    fn merge_resolves_conflicting_depths() {
        let [seed, shared, other_seed] = std::array::from_fn(|_| TestFixtures::sample_pubkey());
        let mut first = FlowGraph::new();
        first.add_node(seed, Some(0));
        first.add_node(shared, Some(2));
        first.add_transfer(TestFixtures::native_transfer(seed, shared, 5, "tx-1", 1));
        let mut second = FlowGraph::new();
        second.add_node(other_seed, Some(0));
        second.add_node(shared, Some(1));
        second.add_node(seed, Some(3));
        second.add_transfer(TestFixtures::native_transfer(seed, shared, 7, "tx-2", 2));

        first.merge(second);

        assert_eq!(first.depth_of(&shared), Some(1));
        assert_eq!(first.depth_of(&seed), Some(0));
        assert_eq!(first.depth_of(&other_seed), Some(0));
        let edge = first.edge(&seed, &shared).unwrap();
        assert_eq!(edge.count, 2);
        assert_eq!(edge.total_amount(Some(&crate::constants::SOL_MINT_KEY)), 12);
    }
}

pub mod complexity;
pub mod expand;

pub use complexity::ComplexityLevel;
pub use complexity::FlowComplexity;
pub use complexity::FlowKind;
pub use complexity::classify_complexity;
pub use complexity::net_flow;
pub use expand::ExpansionLimits;
pub use expand::ExpansionReport;
pub use expand::expand;
pub use expand::expand_many;
pub use expand::label_nodes;

use crate::model::FlowGraph;
use crate::model::Transfer;

/// Aggregates `transfers` into `graph` in order.
pub fn add_transfers(
    graph: &mut FlowGraph,
    transfers: impl IntoIterator<Item = Transfer>,
) {
    graph.add_transfers(transfers);
}

pub mod graph;
pub mod layering;
pub mod reference;
pub mod risk;
pub mod route;
pub mod sandwich;
pub mod similarity;
pub mod structuring;
pub mod summary;
pub mod token;
pub mod transaction;
pub mod transfer;

pub use graph::AddressNode;
pub use graph::FlowEdge;
pub use graph::FlowGraph;
pub use graph::MintTotal;
pub use layering::LayeringEvent;
pub use layering::LayeringReport;
pub use reference::ReferenceSets;
pub use risk::CategoryScore;
pub use risk::EntityRisk;
pub use risk::Evidence;
pub use risk::RiskCategory;
pub use risk::RiskReport;
pub use route::Route;
pub use route::RouteKind;
pub use route::RouteSummary;
pub use sandwich::ProfitValuation;
pub use sandwich::SandwichCandidate;
pub use sandwich::Swap;
pub use sandwich::SwapProgram;
pub use similarity::DustScan;
pub use similarity::DustTransfer;
pub use similarity::PoisoningCandidate;
pub use similarity::PoisoningReport;
pub use similarity::SimilarityKind;
pub use similarity::SimilarityScore;
pub use structuring::StructuringReport;
pub use summary::TransactionSummary;
pub use token::TokenMetadata;
pub use transaction::CompiledInstruction;
pub use transaction::InstructionLocation;
pub use transaction::RawTransaction;
pub use transaction::TokenBalance;
pub use transfer::Derivation;
pub use transfer::TransactionTransfers;
pub use transfer::Transfer;
pub use transfer::TransferKind;

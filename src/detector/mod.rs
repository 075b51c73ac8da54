pub mod layering;
pub mod poisoning;
pub mod route;
pub mod sandwich;
pub mod similarity;
pub mod structuring;
pub mod swap;

pub use layering::LayeringDetector;
pub use layering::detect_layering;
pub use poisoning::DustScanner;
pub use poisoning::genuine_counterparties;
pub use route::classify;
pub use route::classify_all;
pub use sandwich::SandwichDetector;
pub use sandwich::detect_in_block;
pub use sandwich::detect_in_tx;
pub use similarity::CANDIDATE_THRESHOLD;
pub use similarity::analyze_similarity;
pub use similarity::similarity;
pub use structuring::StructuringDetector;
pub use swap::extract_swaps;

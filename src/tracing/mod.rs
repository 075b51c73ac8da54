pub mod file;
pub mod filter;
pub mod format;

pub use file::TracingGuards;
pub use file::setup_tracing;
pub use format::MuhaqqiqFormat;

//! Builders for synthetic ledger records, shared by unit tests, integration
//! tests and replay fixtures.

pub mod builder;

pub use builder::TxBuilder;
pub use builder::system_transfer_data;
pub use builder::token_transfer_data;

// Application layer - use cases and orchestration.
// The CLI and the io module only talk to the ledger through LedgerService.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;

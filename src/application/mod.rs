// Application layer: the ledger and what it reports back to callers.
// Rendering those outcomes as text is left to the CLI.

pub mod error;
mod ledger;
pub mod reporting;

pub use error::*;
pub use ledger::*;
pub use reporting::*;

mod accountant;
mod error;
pub mod family;
mod ledger;
pub mod pricing;
pub mod types;

pub use accountant::UsageAccountant;
pub use ledger::UsageLedger;
pub use types::*;

mod memory;
mod provider;
mod records;

pub use memory::MemoryLedger;
pub use provider::{Ledger, LedgerError, LedgerFunctions};
pub use records::{RecordLedger, RecordPage};

//! Built-in venue adapters.
//!
//! [`PaperGateway`] simulates a venue for dry runs, [`StaticFeed`] serves a
//! fixed set of market snapshots, and [`MemoryLedger`] keeps the audit trail
//! in process memory. Live venue adapters implement the same
//! [`crate::exchange`] traits in downstream crates.

mod memory;
mod paper;

pub use memory::{LedgerEntry, MemoryLedger};
pub use paper::{PaperGateway, StaticFeed};

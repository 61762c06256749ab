//! In-process audit trail.

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::info;

use crate::domain::{ExecutionResult, Opportunity};
use crate::error::Result;
use crate::exchange::Ledger;

/// One recorded execution attempt.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub result: ExecutionResult,
    pub opportunity: Opportunity,
}

/// Keeps every recorded attempt in memory, in arrival order.
#[derive(Default)]
pub struct MemoryLedger {
    entries: Mutex<Vec<LedgerEntry>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Sum of realized profit across all recorded attempts.
    pub fn total_profit(&self) -> Decimal {
        self.entries
            .lock()
            .iter()
            .map(|e| e.result.profit_usd)
            .sum()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn record(&self, result: &ExecutionResult, opportunity: &Opportunity) -> Result<()> {
        info!(
            opportunity = %result.opportunity_id,
            success = result.success,
            profit_usd = %result.profit_usd,
            "Recording execution attempt"
        );
        self.entries.lock().push(LedgerEntry {
            result: result.clone(),
            opportunity: opportunity.clone(),
        });
        Ok(())
    }
}

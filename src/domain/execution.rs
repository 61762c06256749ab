//! Execution report types.
//!
//! [`ExecutionResult`] is the append-only record handed to the ledger after
//! an execution attempt. Leg state is a closed enumeration so invalid
//! combinations (a "filled" leg with zero size) cannot be represented by a
//! stray string.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::OpportunityId;
use super::market::Outcome;

/// Order side for one leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Terminal and transient states of one leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegStatus {
    /// Accepted by the gateway but nothing filled yet.
    Pending,
    /// Filled at >= 95% of the requested size.
    Filled,
    /// Filled below 95% of the requested size.
    Partial,
    /// Rejected or errored at the gateway.
    Failed,
}

impl LegStatus {
    /// Pending is the only non-terminal state.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for LegStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Filled => write!(f, "FILLED"),
            Self::Partial => write!(f, "PARTIAL"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Outcome of one of the two orders in an execution attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLeg {
    pub outcome: Outcome,
    pub side: OrderSide,
    pub requested_size: Decimal,
    pub filled_size: Decimal,
    pub avg_price: Decimal,
    pub status: LegStatus,
    pub error: Option<String>,
}

impl ExecutionLeg {
    /// A leg that never reached the gateway, or was rejected by it.
    pub fn failed(
        outcome: Outcome,
        side: OrderSide,
        requested_size: Decimal,
        error: impl Into<String>,
    ) -> Self {
        Self {
            outcome,
            side,
            requested_size,
            filled_size: Decimal::ZERO,
            avg_price: Decimal::ZERO,
            status: LegStatus::Failed,
            error: Some(error.into()),
        }
    }

    pub fn has_fills(&self) -> bool {
        self.filled_size > Decimal::ZERO
    }
}

/// Auditable record of one execution attempt.
///
/// Created exactly once per attempt and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub opportunity_id: OpportunityId,
    pub success: bool,
    pub yes_leg: ExecutionLeg,
    pub no_leg: ExecutionLeg,
    pub total_capital_used: Decimal,
    pub profit_usd: Decimal,
    pub profit_pct: Decimal,
    pub execution_time_ms: f64,
    pub error_message: Option<String>,
    /// One leg filled while the other did not (or fills diverged by more
    /// than 10%), leaving an unhedged directional position. Always surfaced,
    /// never silently absorbed.
    pub partial_fill_risk: bool,
    pub executed_at: DateTime<Utc>,
}

impl ExecutionResult {
    pub fn both_legs_filled(&self) -> bool {
        self.yes_leg.status == LegStatus::Filled && self.no_leg.status == LegStatus::Filled
    }

    pub fn any_leg_failed(&self) -> bool {
        self.yes_leg.status == LegStatus::Failed || self.no_leg.status == LegStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn leg(status: LegStatus, filled: Decimal) -> ExecutionLeg {
        ExecutionLeg {
            outcome: Outcome::Yes,
            side: OrderSide::Buy,
            requested_size: dec!(100),
            filled_size: filled,
            avg_price: dec!(0.5),
            status,
            error: None,
        }
    }

    #[test]
    fn pending_is_not_terminal() {
        assert!(!LegStatus::Pending.is_terminal());
        assert!(LegStatus::Filled.is_terminal());
        assert!(LegStatus::Partial.is_terminal());
        assert!(LegStatus::Failed.is_terminal());
    }

    #[test]
    fn failed_leg_has_no_fills() {
        let leg = ExecutionLeg::failed(Outcome::No, OrderSide::Sell, dec!(100), "rejected");
        assert_eq!(leg.status, LegStatus::Failed);
        assert_eq!(leg.filled_size, Decimal::ZERO);
        assert!(!leg.has_fills());
        assert_eq!(leg.error.as_deref(), Some("rejected"));
    }

    #[test]
    fn result_helpers_reflect_leg_statuses() {
        let result = ExecutionResult {
            opportunity_id: OpportunityId::from("opp-1"),
            success: true,
            yes_leg: leg(LegStatus::Filled, dec!(100)),
            no_leg: leg(LegStatus::Filled, dec!(100)),
            total_capital_used: dec!(100),
            profit_usd: dec!(5),
            profit_pct: dec!(0.05),
            execution_time_ms: 12.5,
            error_message: None,
            partial_fill_risk: false,
            executed_at: Utc::now(),
        };
        assert!(result.both_legs_filled());
        assert!(!result.any_leg_failed());

        let mixed = ExecutionResult {
            no_leg: leg(LegStatus::Failed, dec!(0)),
            success: false,
            ..result
        };
        assert!(!mixed.both_legs_filled());
        assert!(mixed.any_leg_failed());
    }

    #[test]
    fn serializes_statuses_as_screaming_snake() {
        let json = serde_json::to_string(&LegStatus::Partial).unwrap();
        assert_eq!(json, "\"PARTIAL\"");
        let json = serde_json::to_string(&OrderSide::Sell).unwrap();
        assert_eq!(json, "\"SELL\"");
    }
}

//! Execution result fixtures.

use chrono::Utc;
use paritybot::domain::{
    ExecutionLeg, ExecutionResult, LegStatus, Opportunity, OrderSide, Outcome,
};
use rust_decimal::Decimal;

/// Fully filled two-leg result at the opportunity's detection prices.
pub fn successful_result(opportunity: &Opportunity, size: Decimal) -> ExecutionResult {
    let leg = |outcome: Outcome, price: Decimal| ExecutionLeg {
        outcome,
        side: OrderSide::Sell,
        requested_size: size,
        filled_size: size,
        avg_price: price,
        status: LegStatus::Filled,
        error: None,
    };

    let profit = (opportunity.price_sum() - Decimal::ONE) * size;
    ExecutionResult {
        opportunity_id: opportunity.id().clone(),
        success: true,
        yes_leg: leg(Outcome::Yes, opportunity.yes_price()),
        no_leg: leg(Outcome::No, opportunity.no_price()),
        total_capital_used: size,
        profit_usd: profit,
        profit_pct: opportunity.price_sum() - Decimal::ONE,
        execution_time_ms: 5.0,
        error_message: None,
        partial_fill_risk: false,
        executed_at: Utc::now(),
    }
}

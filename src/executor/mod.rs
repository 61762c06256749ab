//! Two-leg concurrent execution.
//!
//! The executor commits capital by issuing both legs of an opportunity so
//! that they are in flight simultaneously, then reconciles whatever came
//! back (full fills, partial fills, rejections, transport errors) into a
//! single auditable [`ExecutionResult`].
//!
//! Ordering guarantee: price freshness is verified strictly before either
//! order is submitted. After a leg has been submitted there is no
//! cancellation and no compensating transaction; a failure on one leg never
//! rolls back the other. Whatever one-sided exposure remains is surfaced
//! through `partial_fill_risk`, never absorbed.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, error, info, warn};

use crate::config::TradingConfig;
use crate::domain::{
    ArbitrageType, ExecutionLeg, ExecutionResult, LegStatus, Opportunity, OrderSide, Outcome,
};
use crate::error::{ExecutionError, Result, ValidationError};
use crate::exchange::{OrderGateway, OrderRequest, OrderResult};

/// A leg counts as filled from this fraction of the requested size up.
const FILL_THRESHOLD: Decimal = dec!(0.95);
/// Fill sizes diverging by more than this ratio flag partial-fill risk.
const IMBALANCE_TOLERANCE: Decimal = dec!(0.1);

/// Executes opportunities through an [`OrderGateway`].
pub struct Executor<G: OrderGateway> {
    gateway: Arc<G>,
    trading: TradingConfig,
}

impl<G: OrderGateway> Executor<G> {
    pub fn new(gateway: Arc<G>, trading: TradingConfig) -> Self {
        Self { gateway, trading }
    }

    /// Execute one opportunity at the given per-leg size.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a malformed size before any gateway
    /// call. Everything after that point (stale prices, gateway rejections,
    /// partial outcomes) is captured in the returned [`ExecutionResult`]
    /// rather than surfaced as an error.
    pub async fn execute(
        &self,
        opportunity: &Opportunity,
        position_size: Decimal,
    ) -> Result<ExecutionResult> {
        let started = Instant::now();

        info!(
            opportunity = %opportunity.id(),
            event = %opportunity.event_title(),
            arbitrage_type = %opportunity.arbitrage_type(),
            spread = %opportunity.spread(),
            size = %position_size,
            "Executing opportunity"
        );

        // Fail fast with no network activity.
        if position_size <= Decimal::ZERO {
            return Err(ValidationError::SizeNotPositive {
                size: position_size,
            }
            .into());
        }
        if position_size > self.trading.max_position_size {
            return Err(ValidationError::SizeAboveMax {
                size: position_size,
                max: self.trading.max_position_size,
            }
            .into());
        }

        // Staleness gate: expired window or moved prices abort before any
        // order is placed, so zero capital is put at risk.
        if let Err(e) = self.verify_freshness(opportunity).await {
            warn!(opportunity = %opportunity.id(), error = %e, "Execution aborted");
            return Ok(self.aborted_result(opportunity, position_size, e.to_string(), started));
        }

        let (yes_leg, no_leg) = self.dispatch_legs(opportunity, position_size).await;

        let result = self.reconcile(opportunity, yes_leg, no_leg, started);

        if result.success {
            info!(
                opportunity = %opportunity.id(),
                profit_usd = %result.profit_usd,
                profit_pct = %result.profit_pct,
                elapsed_ms = result.execution_time_ms,
                "Execution succeeded"
            );
        } else {
            error!(
                opportunity = %opportunity.id(),
                error = result.error_message.as_deref().unwrap_or("execution incomplete"),
                partial_fill_risk = result.partial_fill_risk,
                "Execution failed"
            );
        }

        Ok(result)
    }

    /// Re-quote both tokens and compare against the recorded prices.
    async fn verify_freshness(&self, opportunity: &Opportunity) -> Result<()> {
        if opportunity.is_expired(Utc::now()) {
            return Err(ExecutionError::OpportunityExpired {
                opportunity_id: opportunity.id().to_string(),
                valid_until: opportunity.valid_until(),
            }
            .into());
        }

        let (yes_quote, no_quote) = tokio::join!(
            self.gateway.price(opportunity.yes_token()),
            self.gateway.price(opportunity.no_token()),
        );

        let current_yes = yes_quote.map_err(|e| ExecutionError::QuoteUnavailable {
            token_id: opportunity.yes_token().to_string(),
            reason: e.to_string(),
        })?;
        let current_no = no_quote.map_err(|e| ExecutionError::QuoteUnavailable {
            token_id: opportunity.no_token().to_string(),
            reason: e.to_string(),
        })?;

        self.check_drift("YES", opportunity.yes_price(), current_yes)?;
        self.check_drift("NO", opportunity.no_price(), current_no)?;

        debug!(
            yes = %current_yes,
            no = %current_no,
            "Price verification passed"
        );
        Ok(())
    }

    fn check_drift(
        &self,
        outcome: &'static str,
        detected: Decimal,
        current: Decimal,
    ) -> Result<()> {
        let drift = (current - detected).abs() / detected;
        if drift > self.trading.slippage_tolerance {
            return Err(ExecutionError::PriceStale {
                outcome,
                detected,
                current,
                moved_pct: (drift * dec!(100)).to_f64().unwrap_or(f64::NAN),
                tolerance_pct: (self.trading.slippage_tolerance * dec!(100))
                    .to_f64()
                    .unwrap_or(f64::NAN),
            }
            .into());
        }
        Ok(())
    }

    /// Fan out both legs so they are in flight simultaneously and join
    /// afterwards. Each leg's gateway error is converted into a FAILED leg
    /// record; nothing crosses the join as a raw error, and one leg's
    /// failure never prevents observing the other's outcome.
    async fn dispatch_legs(
        &self,
        opportunity: &Opportunity,
        size: Decimal,
    ) -> (ExecutionLeg, ExecutionLeg) {
        // Overpriced pairs sum above $1: sell both, collect the premium.
        // Underpriced pairs sum below $1: buy both at the discount.
        let side = match opportunity.arbitrage_type() {
            ArbitrageType::Overpriced => OrderSide::Sell,
            ArbitrageType::Underpriced => OrderSide::Buy,
        };

        let yes_order = OrderRequest {
            token_id: opportunity.yes_token().clone(),
            side,
            price: opportunity.yes_price(),
            size,
        };
        let no_order = OrderRequest {
            token_id: opportunity.no_token().clone(),
            side,
            price: opportunity.no_price(),
            size,
        };

        debug!(side = %side, "Dispatching both legs");
        let (yes_outcome, no_outcome) = tokio::join!(
            self.gateway.submit(&yes_order),
            self.gateway.submit(&no_order),
        );

        let yes_leg = self.classify_leg(Outcome::Yes, side, size, yes_outcome);
        let no_leg = self.classify_leg(Outcome::No, side, size, no_outcome);

        (yes_leg, no_leg)
    }

    /// Map one gateway verdict to a leg record with a closed status.
    fn classify_leg(
        &self,
        outcome: Outcome,
        side: OrderSide,
        requested: Decimal,
        verdict: Result<OrderResult>,
    ) -> ExecutionLeg {
        let order = match verdict {
            Ok(order) => order,
            Err(e) => {
                error!(leg = %outcome, error = %e, "Leg errored at the gateway");
                return ExecutionLeg::failed(outcome, side, requested, e.to_string());
            }
        };

        if !order.success {
            return ExecutionLeg::failed(
                outcome,
                side,
                requested,
                order.error.unwrap_or_else(|| "order rejected".into()),
            );
        }

        let status = if order.filled_size == Decimal::ZERO {
            LegStatus::Pending
        } else if requested > Decimal::ZERO && order.filled_size / requested >= FILL_THRESHOLD {
            LegStatus::Filled
        } else {
            LegStatus::Partial
        };

        ExecutionLeg {
            outcome,
            side,
            requested_size: requested,
            filled_size: order.filled_size,
            avg_price: order.avg_price,
            status,
            error: order.error,
        }
    }

    /// Assemble the final record from the two leg outcomes.
    fn reconcile(
        &self,
        opportunity: &Opportunity,
        yes_leg: ExecutionLeg,
        no_leg: ExecutionLeg,
        started: Instant,
    ) -> ExecutionResult {
        let partial_fill_risk = detect_partial_fill_risk(&yes_leg, &no_leg);

        let both_filled =
            yes_leg.status == LegStatus::Filled && no_leg.status == LegStatus::Filled;
        let any_failed =
            yes_leg.status == LegStatus::Failed || no_leg.status == LegStatus::Failed;
        let success = both_filled && !any_failed;

        let (capital_used, profit_usd, profit_pct) =
            realized_profit(opportunity, &yes_leg, &no_leg);

        let error_message = if success {
            None
        } else {
            let mut parts = Vec::new();
            if let Some(e) = &yes_leg.error {
                parts.push(format!("YES: {e}"));
            }
            if let Some(e) = &no_leg.error {
                parts.push(format!("NO: {e}"));
            }
            if partial_fill_risk {
                parts.push("partial fill risk detected".into());
            }
            if parts.is_empty() {
                parts.push("execution incomplete".into());
            }
            Some(parts.join("; "))
        };

        ExecutionResult {
            opportunity_id: opportunity.id().clone(),
            success,
            yes_leg,
            no_leg,
            total_capital_used: capital_used,
            profit_usd,
            profit_pct,
            execution_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            error_message,
            partial_fill_risk,
            executed_at: Utc::now(),
        }
    }

    /// Result for an attempt aborted before any order went out.
    fn aborted_result(
        &self,
        opportunity: &Opportunity,
        size: Decimal,
        error: String,
        started: Instant,
    ) -> ExecutionResult {
        let side = match opportunity.arbitrage_type() {
            ArbitrageType::Overpriced => OrderSide::Sell,
            ArbitrageType::Underpriced => OrderSide::Buy,
        };
        ExecutionResult {
            opportunity_id: opportunity.id().clone(),
            success: false,
            yes_leg: ExecutionLeg::failed(Outcome::Yes, side, size, error.clone()),
            no_leg: ExecutionLeg::failed(Outcome::No, side, size, error.clone()),
            total_capital_used: Decimal::ZERO,
            profit_usd: Decimal::ZERO,
            profit_pct: Decimal::ZERO,
            execution_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            error_message: Some(error),
            partial_fill_risk: false,
            executed_at: Utc::now(),
        }
    }
}

/// One-sided or badly uneven fills leave a directional position.
fn detect_partial_fill_risk(yes_leg: &ExecutionLeg, no_leg: &ExecutionLeg) -> bool {
    match (yes_leg.has_fills(), no_leg.has_fills()) {
        (true, false) | (false, true) => {
            warn!("Partial fill risk: only one leg has fills");
            true
        }
        (true, true) => {
            let ratio = yes_leg.filled_size / no_leg.filled_size;
            let uneven = ratio < Decimal::ONE - IMBALANCE_TOLERANCE
                || ratio > Decimal::ONE + IMBALANCE_TOLERANCE;
            if uneven {
                warn!(
                    yes_filled = %yes_leg.filled_size,
                    no_filled = %no_leg.filled_size,
                    "Fill size imbalance"
                );
            }
            uneven
        }
        (false, false) => false,
    }
}

/// Realized profit over the matched (hedged) size.
///
/// `matched_size = min(yes_filled, no_filled)`; any one-sided excess is
/// unhedged exposure that stays out of the profit figure and is reported
/// only through the partial-fill-risk flag.
fn realized_profit(
    opportunity: &Opportunity,
    yes_leg: &ExecutionLeg,
    no_leg: &ExecutionLeg,
) -> (Decimal, Decimal, Decimal) {
    let matched_size = yes_leg.filled_size.min(no_leg.filled_size);
    if matched_size == Decimal::ZERO {
        return (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
    }

    // Fall back to detection prices only when the gateway reported no fill
    // price at all.
    let yes_price = if yes_leg.avg_price > Decimal::ZERO {
        yes_leg.avg_price
    } else {
        opportunity.yes_price()
    };
    let no_price = if no_leg.avg_price > Decimal::ZERO {
        no_leg.avg_price
    } else {
        opportunity.no_price()
    };

    let (capital_used, profit_usd) = match opportunity.arbitrage_type() {
        ArbitrageType::Overpriced => {
            // Sold both sides: premium collected now, $1 paid out at
            // resolution on whichever side wins.
            let received = (yes_price + no_price) * matched_size;
            let payout = matched_size;
            (matched_size, received - payout)
        }
        ArbitrageType::Underpriced => {
            // Bought both sides below parity: $1 comes back at resolution.
            let paid = (yes_price + no_price) * matched_size;
            (paid, matched_size - paid)
        }
    };

    let profit_pct = if capital_used > Decimal::ZERO {
        profit_usd / capital_used
    } else {
        Decimal::ZERO
    };

    (capital_used, profit_usd, profit_pct)
}

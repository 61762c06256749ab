//! Capital allocation under hard risk limits.
//!
//! The [`CapitalAllocator`] converts an opportunity into a bounded position
//! size, or an explicit refusal. A refusal means no risk was taken and must
//! never be mistaken for an executed-but-failed trade, so the outcome is a
//! closed [`Sizing`] type rather than an error that callers might conflate
//! with execution failures.
//!
//! Shared account state (available capital, daily realized loss, open
//! position count) sits behind one mutex so check-then-reserve is atomic:
//! two concurrent sizing requests can never together allocate more than the
//! capital on hand.

pub mod kelly;

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{RiskConfig, TradingConfig};
use crate::domain::{ExecutionResult, Opportunity};
use crate::error::RefusalReason;

/// Mutable account risk state, mutated only through the allocator's
/// reserve/settle/release feedback cycle.
pub struct AccountState {
    inner: Mutex<AccountInner>,
}

struct AccountInner {
    available_capital: Decimal,
    daily_realized_loss: Decimal,
    open_positions: usize,
    loss_day: NaiveDate,
}

impl AccountState {
    pub fn new(initial_capital: Decimal) -> Self {
        Self {
            inner: Mutex::new(AccountInner {
                available_capital: initial_capital,
                daily_realized_loss: Decimal::ZERO,
                open_positions: 0,
                loss_day: Utc::now().date_naive(),
            }),
        }
    }

    pub fn available_capital(&self) -> Decimal {
        self.inner.lock().available_capital
    }

    pub fn daily_realized_loss(&self) -> Decimal {
        let mut inner = self.inner.lock();
        inner.roll_over(Utc::now().date_naive());
        inner.daily_realized_loss
    }

    pub fn open_positions(&self) -> usize {
        self.inner.lock().open_positions
    }

    /// Fold a completed execution back into the account: the reservation is
    /// released, realized pnl lands on the balance, losses count against the
    /// daily limit, and a successful attempt opens a position.
    pub fn settle(&self, reservation: Reservation, result: &ExecutionResult) {
        let mut inner = self.inner.lock();
        inner.available_capital += reservation.amount + result.profit_usd;
        if result.profit_usd < Decimal::ZERO {
            inner.roll_over(Utc::now().date_naive());
            inner.daily_realized_loss += result.profit_usd.abs();
            warn!(daily_loss = %inner.daily_realized_loss, "Daily loss updated");
        }
        if result.success {
            inner.open_positions += 1;
        }
        debug!(
            available = %inner.available_capital,
            open_positions = inner.open_positions,
            "Execution settled"
        );
    }

    /// Hand back a reservation untouched (sizing was followed by a refusal
    /// to execute, e.g. stale prices).
    pub fn release(&self, reservation: Reservation) {
        let mut inner = self.inner.lock();
        inner.available_capital += reservation.amount;
    }

    /// A previously opened arbitrage position resolved.
    pub fn close_position(&self) {
        let mut inner = self.inner.lock();
        inner.open_positions = inner.open_positions.saturating_sub(1);
    }
}

impl AccountInner {
    fn roll_over(&mut self, today: NaiveDate) {
        if today > self.loss_day {
            self.loss_day = today;
            self.daily_realized_loss = Decimal::ZERO;
            debug!("Daily loss counter reset");
        }
    }
}

/// Capital atomically set aside for one execution attempt (both legs).
///
/// Must be given back via [`AccountState::settle`] or
/// [`AccountState::release`]; dropping it silently would leak reserved
/// capital until process restart.
#[must_use = "reservations must be settled or released"]
#[derive(Debug)]
pub struct Reservation {
    amount: Decimal,
}

impl Reservation {
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Outcome of a sizing request.
#[derive(Debug)]
pub enum Sizing {
    /// Trade this size per leg; capital for both legs is already reserved.
    Sized {
        size: Decimal,
        reservation: Reservation,
    },
    /// Below the minimum trade size. Skip quietly; not an error.
    TooSmall,
    /// A hard risk limit blocks trading right now. No risk was taken.
    Refused(Vec<RefusalReason>),
}

impl Sizing {
    pub fn is_sized(&self) -> bool {
        matches!(self, Self::Sized { .. })
    }
}

/// Sizes opportunities with half-Kelly under account-level limits.
pub struct CapitalAllocator {
    risk: RiskConfig,
    trading: TradingConfig,
    account: Arc<AccountState>,
}

impl CapitalAllocator {
    pub fn new(risk: RiskConfig, trading: TradingConfig, account: Arc<AccountState>) -> Self {
        Self {
            risk,
            trading,
            account,
        }
    }

    pub fn account(&self) -> &Arc<AccountState> {
        &self.account
    }

    /// Size one opportunity. Re-evaluated per opportunity; nothing is cached
    /// across a scan cycle.
    pub fn size(&self, opportunity: &Opportunity) -> Sizing {
        let mut inner = self.account.inner.lock();
        inner.roll_over(Utc::now().date_naive());

        let mut reasons = Vec::new();
        if inner.daily_realized_loss >= self.risk.max_daily_loss {
            reasons.push(RefusalReason::DailyLossLimit);
        }
        if inner.open_positions >= self.risk.max_open_positions {
            reasons.push(RefusalReason::MaxOpenPositions);
        }
        if inner.available_capital <= Decimal::ZERO {
            reasons.push(RefusalReason::NoCapital);
        }
        if !reasons.is_empty() {
            warn!(?reasons, "Cannot trade");
            return Sizing::Refused(reasons);
        }

        let win_probability = kelly::execution_probability(
            opportunity.min_liquidity().to_f64().unwrap_or(0.0),
            opportunity.required_capital().to_f64().unwrap_or(0.0),
            opportunity.confidence_score(),
            self.trading.slippage_tolerance.to_f64().unwrap_or(0.0),
        );

        let profit_ratio = opportunity.net_profit_pct().to_f64().unwrap_or(0.0);
        if profit_ratio <= 0.0 {
            return Sizing::TooSmall;
        }

        let fraction = kelly::kelly_fraction(
            win_probability,
            profit_ratio,
            self.risk.max_kelly_fraction,
            self.risk.conservative_factor,
        );

        let kelly_size = inner.available_capital
            * Decimal::from_f64(fraction).unwrap_or(Decimal::ZERO);
        let mut position_size = kelly_size
            .min(self.trading.max_position_size)
            .min(opportunity.required_capital());

        // Both legs need funding.
        let two = Decimal::from(2);
        if position_size * two > inner.available_capital {
            position_size = inner.available_capital / two;
            warn!(
                size = %position_size,
                available = %inner.available_capital,
                "Position size reduced to fit available capital"
            );
        }

        if position_size < self.trading.min_trade_size {
            info!(size = %position_size, "Below minimum trade size, skipping");
            return Sizing::TooSmall;
        }

        // Reserve while still holding the lock, so concurrent sizing
        // requests see the reduced balance.
        let reserved = position_size * two;
        inner.available_capital -= reserved;

        info!(
            event = %opportunity.event_title(),
            size = %position_size,
            win_probability,
            "Position sized"
        );

        Sizing::Sized {
            size: position_size,
            reservation: Reservation { amount: reserved },
        }
    }
}

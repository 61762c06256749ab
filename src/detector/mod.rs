//! Opportunity detection.
//!
//! The detector turns one [`BinaryEvent`] snapshot into at most one scored
//! [`Opportunity`]. Malformed events are rejects, never crashes: upstream
//! data problems (wrong market count, ambiguous labels, out-of-range prices,
//! empty token ids) disqualify the event the same way a too-small spread
//! does.

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, error, info, warn};

use crate::config::{DetectorConfig, TradingConfig};
use crate::domain::{BinaryEvent, MarketQuote, Opportunity, OpportunityBuildError};

/// Slippage floor applied to every trade.
const BASE_SLIPPAGE: Decimal = dec!(0.001);
/// Additional slippage per unit of liquidity utilisation.
const SLIPPAGE_PER_UTILISATION: Decimal = dec!(0.005);

/// Confidence component weights: spread, liquidity depth, book balance,
/// time to expiry.
const WEIGHT_SPREAD: f64 = 0.4;
const WEIGHT_LIQUIDITY: f64 = 0.3;
const WEIGHT_BALANCE: f64 = 0.2;
const WEIGHT_TIME: f64 = 0.1;

/// Placeholder time-decay component; no expiry data in the snapshot.
const TIME_SCORE: f64 = 0.7;

/// Cost model outputs for a candidate at a given capital.
#[derive(Debug, Clone)]
struct ProfitEstimate {
    gross_profit_usd: Decimal,
    fees: Decimal,
    slippage: Decimal,
    net_profit_pct: Decimal,
}

/// Scans binary events for parity deviations worth trading.
pub struct Detector {
    config: DetectorConfig,
    trading: TradingConfig,
}

impl Detector {
    pub fn new(config: DetectorConfig, trading: TradingConfig) -> Self {
        Self { config, trading }
    }

    /// Analyze a single event, returning a scored opportunity if the event
    /// passes every filter.
    pub fn analyze(&self, event: &BinaryEvent) -> Option<Opportunity> {
        match self.try_analyze(event) {
            Ok(opportunity) => opportunity,
            Err(e) => {
                error!(event_id = %event.event_id(), error = %e, "Failed to build opportunity");
                None
            }
        }
    }

    /// Run `analyze` over a batch. One bad event never aborts the scan;
    /// survivors come back sorted by confidence descending, detection order
    /// breaking ties.
    pub fn scan_all(&self, events: &[BinaryEvent]) -> Vec<Opportunity> {
        let mut opportunities: Vec<Opportunity> = Vec::new();

        for event in events {
            if let Some(opportunity) = self.analyze(event) {
                info!(
                    event = %event.title(),
                    spread = %opportunity.spread(),
                    net_profit_pct = %opportunity.net_profit_pct(),
                    confidence = opportunity.confidence_score(),
                    "Found opportunity"
                );
                opportunities.push(opportunity);
            }
        }

        // Stable sort keeps detection order for equal scores.
        opportunities.sort_by(|a, b| {
            b.confidence_score()
                .partial_cmp(&a.confidence_score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(count = opportunities.len(), "Scan complete");
        opportunities
    }

    fn try_analyze(
        &self,
        event: &BinaryEvent,
    ) -> Result<Option<Opportunity>, OpportunityBuildError> {
        // Exactly two quotes, unambiguously labeled YES and NO.
        let Some((yes, no)) = event.labeled_pair() else {
            debug!(event_id = %event.event_id(), "Not an unambiguous binary event");
            return Ok(None);
        };

        // Prices strictly inside (0, 1) and non-empty token ids, or the
        // upstream data is malformed.
        if !yes.has_valid_price() || !no.has_valid_price() {
            warn!(
                event_id = %event.event_id(),
                yes_price = %yes.price(),
                no_price = %no.price(),
                "Invalid prices"
            );
            return Ok(None);
        }
        if yes.token_id().is_empty() || no.token_id().is_empty() {
            debug!(event_id = %event.event_id(), "Missing token ids");
            return Ok(None);
        }

        let price_sum = yes.price() + no.price();
        let spread = (price_sum - Decimal::ONE).abs();

        if spread < self.config.min_discrepancy {
            return Ok(None);
        }

        // Cap capital at half the thinner book, then the configured hard cap.
        let min_liquidity = yes.liquidity().min(no.liquidity());
        let required_capital =
            (min_liquidity * dec!(0.5)).min(self.trading.max_position_size);

        if required_capital < self.config.min_trade_capital {
            debug!(
                event_id = %event.event_id(),
                required_capital = %required_capital,
                "Too little liquidity to cover two legs"
            );
            return Ok(None);
        }

        let profit = self.estimate_profit(spread, required_capital, min_liquidity);

        if profit.net_profit_pct < self.trading.min_profit_threshold {
            return Ok(None);
        }

        let confidence = self.confidence_score(spread, yes, no);

        let opportunity = Opportunity::builder()
            .event(event.event_id().clone(), event.title())
            .yes(yes.token_id().clone(), yes.price(), yes.liquidity())
            .no(no.token_id().clone(), no.price(), no.liquidity())
            .economics(
                profit.gross_profit_usd,
                profit.fees,
                profit.slippage,
                profit.net_profit_pct,
            )
            .required_capital(required_capital)
            .confidence_score(confidence)
            .detected(Utc::now(), self.config.validity_secs)
            .build()?;

        Ok(Some(opportunity))
    }

    /// Profit model: gross = capital × spread, minus flat per-leg fees on
    /// both legs and a liquidity-utilisation slippage estimate clamped to
    /// the slippage tolerance.
    fn estimate_profit(
        &self,
        spread: Decimal,
        capital: Decimal,
        min_liquidity: Decimal,
    ) -> ProfitEstimate {
        let gross_profit_usd = capital * spread;

        let total_fee_rate = self.trading.fee_per_leg() * dec!(2);
        let fees = capital * total_fee_rate;

        let utilisation = if min_liquidity > Decimal::ZERO {
            capital / min_liquidity
        } else {
            Decimal::ONE
        };
        let slippage_rate = (BASE_SLIPPAGE + utilisation * SLIPPAGE_PER_UTILISATION)
            .min(self.trading.slippage_tolerance);
        let slippage = capital * slippage_rate;

        let net_profit_usd = gross_profit_usd - fees - slippage;
        let net_profit_pct = if capital > Decimal::ZERO {
            net_profit_usd / capital
        } else {
            Decimal::ZERO
        };

        ProfitEstimate {
            gross_profit_usd,
            fees,
            slippage,
            net_profit_pct,
        }
    }

    /// Composite [0, 1] quality estimate: spread magnitude (40%), liquidity
    /// depth (30%), book balance (20%), time to expiry placeholder (10%).
    fn confidence_score(&self, spread: Decimal, yes: &MarketQuote, no: &MarketQuote) -> f64 {
        let spread = spread.to_f64().unwrap_or(0.0);
        let yes_liquidity = yes.liquidity().to_f64().unwrap_or(0.0);
        let no_liquidity = no.liquidity().to_f64().unwrap_or(0.0);
        let min_liquidity = yes_liquidity.min(no_liquidity);

        let spread_score = if spread >= 0.05 {
            1.0
        } else if spread >= 0.03 {
            0.3 + (spread - 0.03) / 0.02 * 0.7
        } else {
            0.0
        };

        let liquidity_score = if min_liquidity >= 50_000.0 {
            1.0
        } else if min_liquidity >= 10_000.0 {
            0.6 + (min_liquidity - 10_000.0) / 40_000.0 * 0.4
        } else {
            0.3 + (min_liquidity / 10_000.0) * 0.3
        };

        // Lopsided depth means the thin side moves first.
        let balance_score = if yes_liquidity > 0.0 && no_liquidity > 0.0 {
            (yes_liquidity / no_liquidity).min(no_liquidity / yes_liquidity)
        } else {
            0.0
        };

        let confidence = spread_score * WEIGHT_SPREAD
            + liquidity_score * WEIGHT_LIQUIDITY
            + balance_score * WEIGHT_BALANCE
            + TIME_SCORE * WEIGHT_TIME;

        (confidence * 1000.0).round() / 1000.0
    }
}

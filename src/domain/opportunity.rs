//! Opportunity type with builder pattern.
//!
//! This module provides the `Opportunity` struct representing a detected
//! arbitrage candidate, along with `OpportunityBuilder` for safe
//! construction. An opportunity is created once per scan per event, consumed
//! at most once, and never mutated afterwards.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{EventId, OpportunityId, TokenId};

/// Direction of the mispricing relative to the $1.00 parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArbitrageType {
    /// yes + no > 1: sell both legs, collect the premium.
    Overpriced,
    /// yes + no < 1: buy both legs at the discount.
    Underpriced,
}

impl fmt::Display for ArbitrageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overpriced => write!(f, "OVERPRICED"),
            Self::Underpriced => write!(f, "UNDERPRICED"),
        }
    }
}

/// Error returned when building an Opportunity fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpportunityBuildError {
    /// Event id and title are required but were not provided.
    MissingEvent,
    /// YES quote is required but was not provided.
    MissingYesQuote,
    /// NO quote is required but was not provided.
    MissingNoQuote,
    /// Profit economics are required but were not provided.
    MissingEconomics,
    /// Required capital is required but was not provided.
    MissingCapital,
    /// A leg price was outside the open interval (0, 1).
    PriceOutOfRange,
    /// Confidence score was outside [0, 1].
    ConfidenceOutOfRange,
}

impl fmt::Display for OpportunityBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEvent => write!(f, "event_id and event_title are required"),
            Self::MissingYesQuote => write!(f, "yes token, price and liquidity are required"),
            Self::MissingNoQuote => write!(f, "no token, price and liquidity are required"),
            Self::MissingEconomics => write!(f, "profit economics are required"),
            Self::MissingCapital => write!(f, "required_capital is required"),
            Self::PriceOutOfRange => write!(f, "leg prices must be strictly inside (0, 1)"),
            Self::ConfidenceOutOfRange => write!(f, "confidence_score must be within [0, 1]"),
        }
    }
}

impl std::error::Error for OpportunityBuildError {}

/// A scored, bounded-lifetime arbitrage candidate.
///
/// Use `Opportunity::builder()` to construct instances. The builder derives
/// price_sum, spread, arbitrage type and the validity deadline, and rejects
/// values that violate the type's invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    id: OpportunityId,
    event_id: EventId,
    event_title: String,

    yes_token: TokenId,
    yes_price: Decimal,
    yes_liquidity: Decimal,
    no_token: TokenId,
    no_price: Decimal,
    no_liquidity: Decimal,

    price_sum: Decimal,
    spread: Decimal,
    arbitrage_type: ArbitrageType,

    expected_profit_pct: Decimal,
    expected_profit_usd: Decimal,
    estimated_fees: Decimal,
    estimated_slippage: Decimal,
    net_profit_pct: Decimal,

    required_capital: Decimal,
    confidence_score: f64,

    detected_at: DateTime<Utc>,
    valid_until: DateTime<Utc>,
}

impl Opportunity {
    /// Create a new builder for constructing an Opportunity.
    pub fn builder() -> OpportunityBuilder {
        OpportunityBuilder::default()
    }

    pub fn id(&self) -> &OpportunityId {
        &self.id
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn event_title(&self) -> &str {
        &self.event_title
    }

    pub fn yes_token(&self) -> &TokenId {
        &self.yes_token
    }

    pub fn yes_price(&self) -> Decimal {
        self.yes_price
    }

    pub fn yes_liquidity(&self) -> Decimal {
        self.yes_liquidity
    }

    pub fn no_token(&self) -> &TokenId {
        &self.no_token
    }

    pub fn no_price(&self) -> Decimal {
        self.no_price
    }

    pub fn no_liquidity(&self) -> Decimal {
        self.no_liquidity
    }

    /// Sum of the two leg prices.
    pub fn price_sum(&self) -> Decimal {
        self.price_sum
    }

    /// Absolute deviation of the price sum from 1.0.
    pub fn spread(&self) -> Decimal {
        self.spread
    }

    pub fn arbitrage_type(&self) -> ArbitrageType {
        self.arbitrage_type
    }

    /// Gross profit as a fraction of deployed capital (equals the spread).
    pub fn expected_profit_pct(&self) -> Decimal {
        self.expected_profit_pct
    }

    pub fn expected_profit_usd(&self) -> Decimal {
        self.expected_profit_usd
    }

    pub fn estimated_fees(&self) -> Decimal {
        self.estimated_fees
    }

    pub fn estimated_slippage(&self) -> Decimal {
        self.estimated_slippage
    }

    /// Profit fraction after fees and slippage.
    pub fn net_profit_pct(&self) -> Decimal {
        self.net_profit_pct
    }

    /// Liquidity-bounded pre-execution capital cap.
    pub fn required_capital(&self) -> Decimal {
        self.required_capital
    }

    /// Composite [0, 1] quality estimate.
    pub fn confidence_score(&self) -> f64 {
        self.confidence_score
    }

    pub fn detected_at(&self) -> DateTime<Utc> {
        self.detected_at
    }

    pub fn valid_until(&self) -> DateTime<Utc> {
        self.valid_until
    }

    /// An opportunity outside its validity window is untrustworthy even if
    /// prices have not been explicitly re-checked.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.valid_until
    }

    /// Smaller of the two legs' liquidity.
    pub fn min_liquidity(&self) -> Decimal {
        self.yes_liquidity.min(self.no_liquidity)
    }
}

/// Builder for constructing `Opportunity` instances.
#[derive(Debug, Default)]
pub struct OpportunityBuilder {
    event_id: Option<EventId>,
    event_title: Option<String>,
    yes: Option<(TokenId, Decimal, Decimal)>,
    no: Option<(TokenId, Decimal, Decimal)>,
    economics: Option<Economics>,
    required_capital: Option<Decimal>,
    confidence_score: f64,
    detected_at: Option<DateTime<Utc>>,
    validity_secs: i64,
}

#[derive(Debug)]
struct Economics {
    expected_profit_usd: Decimal,
    estimated_fees: Decimal,
    estimated_slippage: Decimal,
    net_profit_pct: Decimal,
}

impl OpportunityBuilder {
    /// Set the event identifier and title.
    pub fn event(mut self, event_id: impl Into<EventId>, title: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self.event_title = Some(title.into());
        self
    }

    /// Set the YES token, its price and liquidity.
    pub fn yes(mut self, token: TokenId, price: Decimal, liquidity: Decimal) -> Self {
        self.yes = Some((token, price, liquidity));
        self
    }

    /// Set the NO token, its price and liquidity.
    pub fn no(mut self, token: TokenId, price: Decimal, liquidity: Decimal) -> Self {
        self.no = Some((token, price, liquidity));
        self
    }

    /// Set the cost model outputs.
    pub fn economics(
        mut self,
        expected_profit_usd: Decimal,
        estimated_fees: Decimal,
        estimated_slippage: Decimal,
        net_profit_pct: Decimal,
    ) -> Self {
        self.economics = Some(Economics {
            expected_profit_usd,
            estimated_fees,
            estimated_slippage,
            net_profit_pct,
        });
        self
    }

    /// Set the liquidity-bounded capital cap.
    pub fn required_capital(mut self, capital: Decimal) -> Self {
        self.required_capital = Some(capital);
        self
    }

    /// Set the confidence score. Finalized before the opportunity is handed
    /// out; there is no setter on the built value.
    pub fn confidence_score(mut self, score: f64) -> Self {
        self.confidence_score = score;
        self
    }

    /// Set the detection timestamp and validity window.
    pub fn detected(mut self, at: DateTime<Utc>, validity_secs: i64) -> Self {
        self.detected_at = Some(at);
        self.validity_secs = validity_secs;
        self
    }

    /// Build the Opportunity, deriving spread and classification.
    ///
    /// # Errors
    ///
    /// Returns `OpportunityBuildError` if a required field is missing or an
    /// invariant (price range, confidence range) is violated.
    pub fn build(self) -> Result<Opportunity, OpportunityBuildError> {
        let event_id = self.event_id.ok_or(OpportunityBuildError::MissingEvent)?;
        let event_title = self.event_title.ok_or(OpportunityBuildError::MissingEvent)?;
        let (yes_token, yes_price, yes_liquidity) =
            self.yes.ok_or(OpportunityBuildError::MissingYesQuote)?;
        let (no_token, no_price, no_liquidity) =
            self.no.ok_or(OpportunityBuildError::MissingNoQuote)?;
        let economics = self
            .economics
            .ok_or(OpportunityBuildError::MissingEconomics)?;
        let required_capital = self
            .required_capital
            .ok_or(OpportunityBuildError::MissingCapital)?;

        let in_range =
            |p: Decimal| p > Decimal::ZERO && p < Decimal::ONE;
        if !in_range(yes_price) || !in_range(no_price) {
            return Err(OpportunityBuildError::PriceOutOfRange);
        }
        if !(0.0..=1.0).contains(&self.confidence_score) {
            return Err(OpportunityBuildError::ConfidenceOutOfRange);
        }

        let price_sum = yes_price + no_price;
        let spread = (price_sum - Decimal::ONE).abs();
        let arbitrage_type = if price_sum > Decimal::ONE {
            ArbitrageType::Overpriced
        } else {
            ArbitrageType::Underpriced
        };

        let detected_at = self.detected_at.unwrap_or_else(Utc::now);
        let validity_secs = if self.validity_secs > 0 {
            self.validity_secs
        } else {
            60
        };
        let valid_until = detected_at + Duration::seconds(validity_secs);

        Ok(Opportunity {
            id: OpportunityId::generate(),
            event_id,
            event_title,
            yes_token,
            yes_price,
            yes_liquidity,
            no_token,
            no_price,
            no_liquidity,
            price_sum,
            spread,
            arbitrage_type,
            expected_profit_pct: spread,
            expected_profit_usd: economics.expected_profit_usd,
            estimated_fees: economics.estimated_fees,
            estimated_slippage: economics.estimated_slippage,
            net_profit_pct: economics.net_profit_pct,
            required_capital,
            confidence_score: self.confidence_score,
            detected_at,
            valid_until,
        })
    }
}

//! Market snapshot types supplied by the external feed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{EventId, TokenId};

/// The two complementary outcomes of a binary market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Yes,
    No,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "YES"),
            Self::No => write!(f, "NO"),
        }
    }
}

/// Immutable view of one outcome's quote at scan time.
///
/// Supplied externally by the market feed; never mutated by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketQuote {
    token_id: TokenId,
    outcome: Outcome,
    price: Decimal,
    liquidity: Decimal,
}

impl MarketQuote {
    pub fn new(
        token_id: impl Into<TokenId>,
        outcome: Outcome,
        price: Decimal,
        liquidity: Decimal,
    ) -> Self {
        Self {
            token_id: token_id.into(),
            outcome,
            price,
            liquidity,
        }
    }

    pub fn token_id(&self) -> &TokenId {
        &self.token_id
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn liquidity(&self) -> Decimal {
        self.liquidity
    }

    /// Prices at or outside [0, 1] indicate malformed upstream data.
    pub fn has_valid_price(&self) -> bool {
        self.price > Decimal::ZERO && self.price < Decimal::ONE
    }
}

/// One binary event and its outcome quotes.
///
/// Binary-ness (exactly two quotes, one per outcome) is an invariant the
/// detector enforces rather than assumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryEvent {
    event_id: EventId,
    title: String,
    markets: Vec<MarketQuote>,
}

impl BinaryEvent {
    pub fn new(
        event_id: impl Into<EventId>,
        title: impl Into<String>,
        markets: Vec<MarketQuote>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            title: title.into(),
            markets,
        }
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn markets(&self) -> &[MarketQuote] {
        &self.markets
    }

    /// Split the quotes into (YES, NO) if they are unambiguously labeled.
    ///
    /// Returns `None` unless there are exactly two quotes carrying one YES
    /// and one NO label.
    pub fn labeled_pair(&self) -> Option<(&MarketQuote, &MarketQuote)> {
        if self.markets.len() != 2 {
            return None;
        }

        let mut yes = None;
        let mut no = None;
        for quote in &self.markets {
            match quote.outcome() {
                Outcome::Yes => yes = Some(quote),
                Outcome::No => no = Some(quote),
            }
        }

        match (yes, no) {
            (Some(y), Some(n)) => Some((y, n)),
            _ => None,
        }
    }
}

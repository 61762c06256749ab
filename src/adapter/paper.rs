//! Paper-trading venue.
//!
//! Fills orders instantly against a configurable quote table, with optional
//! price jitter and a fill ratio to imitate thin books. Used for dry runs
//! and end-to-end tests; never touches a network.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::{BinaryEvent, TokenId};
use crate::error::{Error, Result};
use crate::exchange::{MarketFeed, OrderGateway, OrderRequest, OrderResult};

pub struct PaperGateway {
    quotes: RwLock<HashMap<TokenId, Decimal>>,
    /// Fraction of the requested size that gets filled, 1 by default.
    fill_ratio: Decimal,
    /// Maximum relative price movement applied to each quote read.
    price_jitter: f64,
}

impl PaperGateway {
    pub fn new() -> Self {
        Self {
            quotes: RwLock::new(HashMap::new()),
            fill_ratio: Decimal::ONE,
            price_jitter: 0.0,
        }
    }

    pub fn with_quote(self, token: impl Into<TokenId>, price: Decimal) -> Self {
        self.quotes.write().insert(token.into(), price);
        self
    }

    pub fn with_fill_ratio(mut self, ratio: Decimal) -> Self {
        self.fill_ratio = ratio;
        self
    }

    pub fn with_price_jitter(mut self, jitter: f64) -> Self {
        self.price_jitter = jitter;
        self
    }

    /// Replace a quote after construction, e.g. to simulate price drift.
    pub fn set_quote(&self, token: impl Into<TokenId>, price: Decimal) {
        self.quotes.write().insert(token.into(), price);
    }

    fn quote(&self, token_id: &TokenId) -> Result<Decimal> {
        self.quotes
            .read()
            .get(token_id)
            .copied()
            .ok_or_else(|| Error::Gateway(format!("no quote for token {token_id}")))
    }

    fn jittered(&self, price: Decimal) -> Decimal {
        if self.price_jitter == 0.0 {
            return price;
        }
        let shift = rand::thread_rng().gen_range(-self.price_jitter..=self.price_jitter);
        let factor = Decimal::from_f64(1.0 + shift).unwrap_or(Decimal::ONE);
        (price * factor).round_dp(6)
    }
}

impl Default for PaperGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderGateway for PaperGateway {
    async fn price(&self, token_id: &TokenId) -> Result<Decimal> {
        Ok(self.jittered(self.quote(token_id)?))
    }

    async fn submit(&self, order: &OrderRequest) -> Result<OrderResult> {
        // Unknown tokens still reject rather than error: the venue answered,
        // it just said no.
        if self.quotes.read().get(&order.token_id).is_none() {
            return Ok(OrderResult::rejected(format!(
                "unknown token {}",
                order.token_id
            )));
        }

        let filled = (order.size * self.fill_ratio).round_dp(6);
        let avg_price = self.jittered(order.price);
        debug!(
            token = %order.token_id,
            side = %order.side,
            requested = %order.size,
            filled = %filled,
            avg_price = %avg_price,
            "Paper fill"
        );
        Ok(OrderResult::filled(filled, avg_price))
    }

    fn venue_name(&self) -> &'static str {
        "paper"
    }
}

/// Serves a fixed snapshot on every scan.
pub struct StaticFeed {
    events: Vec<BinaryEvent>,
}

impl StaticFeed {
    pub fn new(events: Vec<BinaryEvent>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl MarketFeed for StaticFeed {
    async fn active_events(&self) -> Result<Vec<BinaryEvent>> {
        Ok(self.events.clone())
    }
}

//! External collaborator trait definitions.
//!
//! These traits define the seams between the core pipeline and the trading
//! venue: quote/order access, the market snapshot feed, and the ledger that
//! persists results. Implementations live behind [`crate::adapter`] or in
//! downstream crates.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{BinaryEvent, ExecutionResult, Opportunity, OrderSide, TokenId};
use crate::error::Result;

/// An order to be submitted to the venue.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub token_id: TokenId,
    pub side: OrderSide,
    /// Limit price recorded at detection time.
    pub price: Decimal,
    pub size: Decimal,
}

/// The gateway's verdict on one submitted order.
#[derive(Debug, Clone)]
pub struct OrderResult {
    pub success: bool,
    pub filled_size: Decimal,
    pub avg_price: Decimal,
    pub error: Option<String>,
}

impl OrderResult {
    pub fn filled(filled_size: Decimal, avg_price: Decimal) -> Self {
        Self {
            success: true,
            filled_size,
            avg_price,
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            filled_size: Decimal::ZERO,
            avg_price: Decimal::ZERO,
            error: Some(error.into()),
        }
    }
}

/// Order submission and quote lookup on the venue.
///
/// Implementations must tolerate being called twice concurrently for the
/// same logical operation: the executor dispatches both legs of a trade so
/// they are in flight simultaneously.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Current price for an outcome token.
    async fn price(&self, token_id: &TokenId) -> Result<Decimal>;

    /// Submit one order and wait for its terminal gateway verdict.
    async fn submit(&self, order: &OrderRequest) -> Result<OrderResult>;

    /// Venue name for logging.
    fn venue_name(&self) -> &'static str;
}

/// Source of market snapshots to scan.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    async fn active_events(&self) -> Result<Vec<BinaryEvent>>;
}

/// Durable audit sink for completed execution attempts.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Record a completed attempt together with the opportunity that
    /// produced it.
    async fn record(&self, result: &ExecutionResult, opportunity: &Opportunity) -> Result<()>;
}

//! Scripted order gateway for driving the executor through exact outcomes.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use paritybot::domain::TokenId;
use paritybot::error::{Error, Result};
use paritybot::exchange::{OrderGateway, OrderRequest, OrderResult};
use rust_decimal::Decimal;

enum Script {
    Fill(OrderResult),
    Error(String),
}

/// Answers quotes and orders from a per-token script and records every
/// submission it receives.
#[derive(Default)]
pub struct ScriptedGateway {
    quotes: Mutex<HashMap<TokenId, Decimal>>,
    scripts: Mutex<HashMap<TokenId, Script>>,
    submissions: Mutex<Vec<OrderRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(self, token: &str, price: Decimal) -> Self {
        self.quotes.lock().insert(TokenId::from(token), price);
        self
    }

    /// Script the submit verdict for one token. Unscripted tokens fill in
    /// full at the order's limit price.
    pub fn with_fill(self, token: &str, result: OrderResult) -> Self {
        self.scripts
            .lock()
            .insert(TokenId::from(token), Script::Fill(result));
        self
    }

    /// Script a transport-level error for one token's submit.
    pub fn with_submit_error(self, token: &str, message: &str) -> Self {
        self.scripts
            .lock()
            .insert(TokenId::from(token), Script::Error(message.to_string()));
        self
    }

    pub fn set_quote(&self, token: &str, price: Decimal) {
        self.quotes.lock().insert(TokenId::from(token), price);
    }

    pub fn submissions(&self) -> Vec<OrderRequest> {
        self.submissions.lock().clone()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().len()
    }
}

#[async_trait]
impl OrderGateway for ScriptedGateway {
    async fn price(&self, token_id: &TokenId) -> Result<Decimal> {
        self.quotes
            .lock()
            .get(token_id)
            .copied()
            .ok_or_else(|| Error::Gateway(format!("no scripted quote for {token_id}")))
    }

    async fn submit(&self, order: &OrderRequest) -> Result<OrderResult> {
        self.submissions.lock().push(order.clone());
        match self.scripts.lock().get(&order.token_id) {
            Some(Script::Fill(result)) => Ok(result.clone()),
            Some(Script::Error(message)) => Err(Error::Gateway(message.clone())),
            None => Ok(OrderResult::filled(order.size, order.price)),
        }
    }

    fn venue_name(&self) -> &'static str {
        "scripted"
    }
}

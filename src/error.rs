use rust_decimal::Decimal;
use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Validation errors raised locally, before any gateway call.
#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("position size {size} exceeds max {max}")]
    SizeAboveMax { size: Decimal, max: Decimal },

    #[error("invalid position size: {size}")]
    SizeNotPositive { size: Decimal },
}

/// Execution-related errors with structured variants.
#[derive(Error, Debug, Clone)]
pub enum ExecutionError {
    /// Price moved beyond tolerance between detection and verification.
    /// Raised strictly before any order is submitted.
    #[error("{outcome} price moved {moved_pct:.2}% (tolerance {tolerance_pct:.2}%): {detected} -> {current}")]
    PriceStale {
        outcome: &'static str,
        detected: Decimal,
        current: Decimal,
        moved_pct: f64,
        tolerance_pct: f64,
    },

    #[error("opportunity {opportunity_id} expired at {valid_until}")]
    OpportunityExpired {
        opportunity_id: String,
        valid_until: chrono::DateTime<chrono::Utc>,
    },

    #[error("quote unavailable for token {token_id}: {reason}")]
    QuoteUnavailable { token_id: String, reason: String },

    #[error("order rejected: {0}")]
    OrderRejected(String),

    #[error("order submission failed: {0}")]
    SubmissionFailed(String),
}

/// A single reason the capital allocator refused to size an opportunity.
///
/// Refusals are pre-trade: no order was placed and no capital was risked,
/// which callers must keep distinguishable from an executed-but-failed trade.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefusalReason {
    #[error("daily loss limit exceeded")]
    DailyLossLimit,

    #[error("max open positions reached")]
    MaxOpenPositions,

    #[error("insufficient capital")]
    NoCapital,
}

/// Risk management errors.
#[derive(Error, Debug, Clone)]
pub enum RiskError {
    #[error("cannot trade: {}", format_reasons(.reasons))]
    LimitExceeded { reasons: Vec<RefusalReason> },
}

fn format_reasons(reasons: &[RefusalReason]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Risk(#[from] RiskError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("ledger error: {0}")]
    Ledger(String),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Venue-agnostic domain types.

mod execution;
mod ids;
mod market;
mod opportunity;

pub use execution::{ExecutionLeg, ExecutionResult, LegStatus, OrderSide};
pub use ids::{EventId, OpportunityId, TokenId};
pub use market::{BinaryEvent, MarketQuote, Outcome};
pub use opportunity::{ArbitrageType, Opportunity, OpportunityBuildError, OpportunityBuilder};

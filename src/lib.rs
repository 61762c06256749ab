//! Paritybot - intra-market arbitrage for binary prediction markets.
//!
//! In a binary market the YES and NO outcome prices should sum to $1.00.
//! When they transiently diverge, buying (or selling) both sides locks in
//! the difference. This crate implements the detection, sizing and execution
//! pipeline for that trade:
//!
//! - [`detector`] - turns raw market quotes into scored, bounded-lifetime
//!   [`domain::Opportunity`] candidates
//! - [`risk`] - converts a candidate into a bounded position size under hard
//!   risk limits using half-Kelly sizing
//! - [`executor`] - commits capital by issuing both legs concurrently and
//!   reconciling partial or failed outcomes into an auditable
//!   [`domain::ExecutionResult`]
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with serde defaults
//! - [`domain`] - quotes, opportunities, execution reports
//! - [`error`] - error taxonomy for the crate
//! - [`exchange`] - trait seams for the order gateway, market feed and ledger
//! - [`adapter`] - in-process paper-trading gateway and in-memory ledger
//! - [`app`] - scan-cycle orchestration
//!
//! # Example
//!
//! ```
//! use paritybot::config::{DetectorConfig, TradingConfig};
//! use paritybot::detector::Detector;
//! use paritybot::domain::{BinaryEvent, MarketQuote, Outcome};
//! use rust_decimal_macros::dec;
//!
//! let detector = Detector::new(DetectorConfig::default(), TradingConfig::default());
//! let event = BinaryEvent::new(
//!     "event-1",
//!     "Will it rain tomorrow?",
//!     vec![
//!         MarketQuote::new("yes-token", Outcome::Yes, dec!(0.55), dec!(50000)),
//!         MarketQuote::new("no-token", Outcome::No, dec!(0.50), dec!(50000)),
//!     ],
//! );
//!
//! let opportunity = detector.analyze(&event);
//! assert!(opportunity.is_some());
//! ```

pub mod adapter;
pub mod app;
pub mod config;
pub mod detector;
pub mod domain;
pub mod error;
pub mod exchange;
pub mod executor;
pub mod risk;

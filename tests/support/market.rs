//! Market fixtures shared across integration tests.

use paritybot::config::{Config, DetectorConfig, TradingConfig};
use paritybot::detector::Detector;
use paritybot::domain::{BinaryEvent, MarketQuote, Opportunity, Outcome};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Binary event with one quote per outcome and shared liquidity.
pub fn make_binary_event(
    event_id: &str,
    yes_token: &str,
    yes_price: Decimal,
    no_token: &str,
    no_price: Decimal,
    liquidity: Decimal,
) -> BinaryEvent {
    BinaryEvent::new(
        event_id,
        format!("Event {event_id}?"),
        vec![
            MarketQuote::new(yes_token, Outcome::Yes, yes_price, liquidity),
            MarketQuote::new(no_token, Outcome::No, no_price, liquidity),
        ],
    )
}

/// The canonical overpriced pair: 0.55 + 0.50 on deep books.
pub fn make_overpriced_event() -> BinaryEvent {
    make_binary_event(
        "evt-over",
        "yes-tok",
        dec!(0.55),
        "no-tok",
        dec!(0.50),
        dec!(50000),
    )
}

/// Run the default detector over one event and take its opportunity.
pub fn make_opportunity(event: &BinaryEvent) -> Opportunity {
    let detector = Detector::new(DetectorConfig::default(), TradingConfig::default());
    detector
        .analyze(event)
        .expect("fixture event should produce an opportunity")
}

pub fn make_config() -> Config {
    Config::default()
}

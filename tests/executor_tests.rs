//! Executor behavior against a scripted venue.

mod support;

use std::sync::Arc;

use paritybot::config::TradingConfig;
use paritybot::domain::{LegStatus, OrderSide};
use paritybot::error::Error;
use paritybot::executor::Executor;
use paritybot::exchange::OrderResult;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use support::gateway::ScriptedGateway;
use support::market::{make_binary_event, make_opportunity, make_overpriced_event};

fn executor(gateway: ScriptedGateway) -> (Executor<ScriptedGateway>, Arc<ScriptedGateway>) {
    let gateway = Arc::new(gateway);
    (
        Executor::new(Arc::clone(&gateway), TradingConfig::default()),
        gateway,
    )
}

#[tokio::test]
async fn full_fills_on_both_legs_succeed() {
    let (executor, gateway) = executor(
        ScriptedGateway::new()
            .with_quote("yes-tok", dec!(0.55))
            .with_quote("no-tok", dec!(0.50)),
    );
    let opportunity = make_opportunity(&make_overpriced_event());

    let result = executor.execute(&opportunity, dec!(100)).await.unwrap();

    assert!(result.success);
    assert!(!result.partial_fill_risk);
    assert_eq!(result.yes_leg.status, LegStatus::Filled);
    assert_eq!(result.no_leg.status, LegStatus::Filled);
    // sold both sides at 0.55 + 0.50, pays out $1 per matched share
    assert_eq!(result.profit_usd, dec!(5.00));
    assert_eq!(result.total_capital_used, dec!(100));
    assert!(result.execution_time_ms >= 0.0);

    // both legs SELL for an overpriced pair, submitted at detection prices
    let submissions = gateway.submissions();
    assert_eq!(submissions.len(), 2);
    assert!(submissions.iter().all(|o| o.side == OrderSide::Sell));
}

#[tokio::test]
async fn underpriced_pair_buys_both_legs() {
    let event = make_binary_event(
        "evt-under",
        "yes-tok",
        dec!(0.44),
        "no-tok",
        dec!(0.50),
        dec!(50000),
    );
    let opportunity = make_opportunity(&event);
    let (executor, gateway) = executor(
        ScriptedGateway::new()
            .with_quote("yes-tok", dec!(0.44))
            .with_quote("no-tok", dec!(0.50)),
    );

    let result = executor.execute(&opportunity, dec!(100)).await.unwrap();

    assert!(result.success);
    // paid 0.94 per pair, $1 back at resolution
    assert_eq!(result.total_capital_used, dec!(94.00));
    assert_eq!(result.profit_usd, dec!(6.00));
    assert!(gateway
        .submissions()
        .iter()
        .all(|o| o.side == OrderSide::Buy));
}

#[tokio::test]
async fn one_sided_fill_is_flagged_and_not_successful() {
    let (executor, _gateway) = executor(
        ScriptedGateway::new()
            .with_quote("yes-tok", dec!(0.55))
            .with_quote("no-tok", dec!(0.50))
            .with_fill("yes-tok", OrderResult::filled(dec!(100), dec!(0.55)))
            .with_fill("no-tok", OrderResult::filled(dec!(0), dec!(0))),
    );
    let opportunity = make_opportunity(&make_overpriced_event());

    let result = executor.execute(&opportunity, dec!(100)).await.unwrap();

    assert!(!result.success);
    assert!(result.partial_fill_risk);
    assert_eq!(result.yes_leg.status, LegStatus::Filled);
    assert_eq!(result.no_leg.status, LegStatus::Pending);
    // nothing matched, so nothing booked
    assert_eq!(result.profit_usd, Decimal::ZERO);
    assert_eq!(result.total_capital_used, Decimal::ZERO);
}

#[tokio::test]
async fn balanced_half_fills_are_partial_without_risk() {
    let (executor, _gateway) = executor(
        ScriptedGateway::new()
            .with_quote("yes-tok", dec!(0.55))
            .with_quote("no-tok", dec!(0.50))
            .with_fill("yes-tok", OrderResult::filled(dec!(50), dec!(0.55)))
            .with_fill("no-tok", OrderResult::filled(dec!(50), dec!(0.50))),
    );
    let opportunity = make_opportunity(&make_overpriced_event());

    let result = executor.execute(&opportunity, dec!(100)).await.unwrap();

    assert!(!result.success);
    assert!(!result.partial_fill_risk);
    assert_eq!(result.yes_leg.status, LegStatus::Partial);
    assert_eq!(result.no_leg.status, LegStatus::Partial);
    // matched size is 50 per leg
    assert_eq!(result.profit_usd, dec!(2.50));
    assert_eq!(result.total_capital_used, dec!(50));
}

#[tokio::test]
async fn both_legs_rejected_reports_both_errors() {
    let (executor, _gateway) = executor(
        ScriptedGateway::new()
            .with_quote("yes-tok", dec!(0.55))
            .with_quote("no-tok", dec!(0.50))
            .with_fill("yes-tok", OrderResult::rejected("insufficient balance"))
            .with_fill("no-tok", OrderResult::rejected("market paused")),
    );
    let opportunity = make_opportunity(&make_overpriced_event());

    let result = executor.execute(&opportunity, dec!(100)).await.unwrap();

    assert!(!result.success);
    assert!(!result.partial_fill_risk);
    assert_eq!(result.yes_leg.status, LegStatus::Failed);
    assert_eq!(result.no_leg.status, LegStatus::Failed);
    assert_eq!(result.total_capital_used, Decimal::ZERO);

    let message = result.error_message.unwrap();
    assert!(message.contains("YES: insufficient balance"), "{message}");
    assert!(message.contains("NO: market paused"), "{message}");
}

#[tokio::test]
async fn gateway_error_on_one_leg_becomes_failed_leg() {
    let (executor, _gateway) = executor(
        ScriptedGateway::new()
            .with_quote("yes-tok", dec!(0.55))
            .with_quote("no-tok", dec!(0.50))
            .with_submit_error("no-tok", "connection reset"),
    );
    let opportunity = make_opportunity(&make_overpriced_event());

    let result = executor.execute(&opportunity, dec!(100)).await.unwrap();

    assert!(!result.success);
    // the YES fill still landed, so the book is one-sided
    assert!(result.partial_fill_risk);
    assert_eq!(result.yes_leg.status, LegStatus::Filled);
    assert_eq!(result.no_leg.status, LegStatus::Failed);
    assert!(result
        .error_message
        .unwrap()
        .contains("NO: connection reset"));
}

#[tokio::test]
async fn expired_opportunity_aborts_before_any_order() {
    use chrono::{Duration, Utc};
    use paritybot::domain::{Opportunity, TokenId};

    // stamped two minutes in the past with a 60s validity window
    let opportunity = Opportunity::builder()
        .event("evt-old", "Stale?")
        .yes(TokenId::from("yes-tok"), dec!(0.55), dec!(50000))
        .no(TokenId::from("no-tok"), dec!(0.50), dec!(50000))
        .economics(dec!(50), dec!(8), dec!(1.1), dec!(0.0409))
        .required_capital(dec!(1000))
        .confidence_score(0.9)
        .detected(Utc::now() - Duration::seconds(120), 60)
        .build()
        .unwrap();

    let (executor, gateway) = executor(
        ScriptedGateway::new()
            .with_quote("yes-tok", dec!(0.55))
            .with_quote("no-tok", dec!(0.50)),
    );

    let result = executor.execute(&opportunity, dec!(100)).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.total_capital_used, Decimal::ZERO);
    assert!(result.error_message.unwrap().contains("expired"));
    assert_eq!(gateway.submission_count(), 0);
}

#[tokio::test]
async fn moved_price_aborts_before_any_order() {
    let gateway = ScriptedGateway::new()
        .with_quote("yes-tok", dec!(0.60)) // detected at 0.55, ~9% move
        .with_quote("no-tok", dec!(0.50));
    let (executor, gateway) = executor(gateway);
    let opportunity = make_opportunity(&make_overpriced_event());

    let result = executor.execute(&opportunity, dec!(100)).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.total_capital_used, Decimal::ZERO);
    assert_eq!(result.yes_leg.status, LegStatus::Failed);
    assert_eq!(result.no_leg.status, LegStatus::Failed);
    assert!(result.error_message.unwrap().contains("moved"));
    // no orders reached the venue
    assert_eq!(gateway.submission_count(), 0);
}

#[tokio::test]
async fn drift_within_tolerance_proceeds() {
    // 0.55 -> 0.5545 is under the 1% default tolerance
    let (executor, gateway) = executor(
        ScriptedGateway::new()
            .with_quote("yes-tok", dec!(0.5545))
            .with_quote("no-tok", dec!(0.50)),
    );
    let opportunity = make_opportunity(&make_overpriced_event());

    let result = executor.execute(&opportunity, dec!(100)).await.unwrap();
    assert!(result.success);
    assert_eq!(gateway.submission_count(), 2);
}

#[tokio::test]
async fn missing_quote_aborts_before_any_order() {
    let (executor, gateway) = executor(ScriptedGateway::new().with_quote("yes-tok", dec!(0.55)));
    let opportunity = make_opportunity(&make_overpriced_event());

    let result = executor.execute(&opportunity, dec!(100)).await.unwrap();

    assert!(!result.success);
    assert_eq!(gateway.submission_count(), 0);
    assert!(result.error_message.unwrap().contains("no-tok"));
}

#[tokio::test]
async fn invalid_sizes_error_without_touching_the_gateway() {
    let (executor, gateway) = executor(
        ScriptedGateway::new()
            .with_quote("yes-tok", dec!(0.55))
            .with_quote("no-tok", dec!(0.50)),
    );
    let opportunity = make_opportunity(&make_overpriced_event());

    let err = executor.execute(&opportunity, dec!(0)).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // default max position size is 1000
    let err = executor.execute(&opportunity, dec!(1001)).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    assert_eq!(gateway.submission_count(), 0);
}

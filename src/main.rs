use paritybot::adapter::{PaperGateway, StaticFeed};
use paritybot::app::App;
use paritybot::config::Config;
use paritybot::domain::{BinaryEvent, MarketQuote, Outcome};
use rust_decimal_macros::dec;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let config = match Config::load("config.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    config.init_logging();
    info!("paritybot starting");

    let (feed, gateway) = paper_universe();
    let app = App::paper(&config, feed, gateway);

    tokio::select! {
        result = app.run() => {
            if let Err(e) = result {
                error!(error = %e, "Fatal error");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("paritybot stopped");
}

/// Small simulated market universe for paper runs: one overpriced pair, one
/// underpriced pair, one fairly priced pair.
fn paper_universe() -> (StaticFeed, PaperGateway) {
    let events = vec![
        BinaryEvent::new(
            "evt-rates",
            "Will the Fed cut rates in September?",
            vec![
                MarketQuote::new("rates-yes", Outcome::Yes, dec!(0.58), dec!(40000)),
                MarketQuote::new("rates-no", Outcome::No, dec!(0.47), dec!(35000)),
            ],
        ),
        BinaryEvent::new(
            "evt-etf",
            "Will the ETF be approved by year end?",
            vec![
                MarketQuote::new("etf-yes", Outcome::Yes, dec!(0.44), dec!(60000)),
                MarketQuote::new("etf-no", Outcome::No, dec!(0.51), dec!(55000)),
            ],
        ),
        BinaryEvent::new(
            "evt-election",
            "Will turnout exceed 60%?",
            vec![
                MarketQuote::new("turnout-yes", Outcome::Yes, dec!(0.50), dec!(80000)),
                MarketQuote::new("turnout-no", Outcome::No, dec!(0.50), dec!(75000)),
            ],
        ),
    ];

    let gateway = PaperGateway::new()
        .with_quote("rates-yes", dec!(0.58))
        .with_quote("rates-no", dec!(0.47))
        .with_quote("etf-yes", dec!(0.44))
        .with_quote("etf-no", dec!(0.51))
        .with_quote("turnout-yes", dec!(0.50))
        .with_quote("turnout-no", dec!(0.50))
        .with_price_jitter(0.002);

    (StaticFeed::new(events), gateway)
}

//! Configuration loading.
//!
//! All trading parameters live in an explicit [`Config`] value loaded once
//! at startup and passed into each component's constructor. Nothing reads
//! settings from process-global state after that point.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::Path;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Detection thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
    /// Minimum |yes + no - 1| spread to consider an opportunity.
    #[serde(default = "default_min_discrepancy")]
    pub min_discrepancy: Decimal,

    /// Opportunities needing less capital than this are not worth the
    /// fixed cost of two legs.
    #[serde(default = "default_min_trade_capital")]
    pub min_trade_capital: Decimal,

    /// How long a detected opportunity stays trustworthy.
    #[serde(default = "default_validity_secs")]
    pub validity_secs: i64,
}

fn default_min_discrepancy() -> Decimal {
    dec!(0.03)
}

fn default_min_trade_capital() -> Decimal {
    dec!(100)
}

fn default_validity_secs() -> i64 {
    60
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_discrepancy: default_min_discrepancy(),
            min_trade_capital: default_min_trade_capital(),
            validity_secs: default_validity_secs(),
        }
    }
}

/// Per-trade parameters shared by the detector's profit model and the
/// executor.
#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    /// Minimum net profit (after fees and slippage) as a fraction of capital.
    #[serde(default = "default_min_profit_threshold")]
    pub min_profit_threshold: Decimal,

    /// Hard cap on position size in dollars.
    #[serde(default = "default_max_position_size")]
    pub max_position_size: Decimal,

    /// Maximum tolerated price movement between detection and execution.
    #[serde(default = "default_slippage_tolerance")]
    pub slippage_tolerance: Decimal,

    /// Venue maker fee per leg.
    #[serde(default = "default_fee")]
    pub maker_fee: Decimal,

    /// Venue taker fee per leg.
    #[serde(default = "default_fee")]
    pub taker_fee: Decimal,

    /// Positions below this are dust and skipped.
    #[serde(default = "default_min_trade_size")]
    pub min_trade_size: Decimal,
}

fn default_min_profit_threshold() -> Decimal {
    dec!(0.02)
}

fn default_max_position_size() -> Decimal {
    dec!(1000)
}

fn default_slippage_tolerance() -> Decimal {
    dec!(0.01)
}

fn default_fee() -> Decimal {
    dec!(0.002)
}

fn default_min_trade_size() -> Decimal {
    dec!(10)
}

impl TradingConfig {
    /// Combined maker + taker fee for one leg.
    pub fn fee_per_leg(&self) -> Decimal {
        self.maker_fee + self.taker_fee
    }
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            min_profit_threshold: default_min_profit_threshold(),
            max_position_size: default_max_position_size(),
            slippage_tolerance: default_slippage_tolerance(),
            maker_fee: default_fee(),
            taker_fee: default_fee(),
            min_trade_size: default_min_trade_size(),
        }
    }
}

/// Account-level limits enforced by the capital allocator.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    #[serde(default = "default_max_daily_loss")]
    pub max_daily_loss: Decimal,

    #[serde(default = "default_max_open_positions")]
    pub max_open_positions: usize,

    /// Kelly multiplier; 0.5 is half-Kelly.
    #[serde(default = "default_conservative_factor")]
    pub conservative_factor: f64,

    /// Hard cap on the Kelly fraction.
    #[serde(default = "default_max_kelly_fraction")]
    pub max_kelly_fraction: f64,

    /// Starting capital when no ledger balance is available.
    #[serde(default = "default_initial_capital")]
    pub initial_capital: Decimal,
}

fn default_max_daily_loss() -> Decimal {
    dec!(100)
}

fn default_max_open_positions() -> usize {
    10
}

fn default_conservative_factor() -> f64 {
    0.5
}

fn default_max_kelly_fraction() -> f64 {
    0.25
}

fn default_initial_capital() -> Decimal {
    dec!(10000)
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_daily_loss: default_max_daily_loss(),
            max_open_positions: default_max_open_positions(),
            conservative_factor: default_conservative_factor(),
            max_kelly_fraction: default_max_kelly_fraction(),
            initial_capital: default_initial_capital(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Seconds between market scans.
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

fn default_scan_interval_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.detector.min_discrepancy <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "detector.min_discrepancy",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.trading.max_position_size <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "trading.max_position_size",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.trading.slippage_tolerance <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "trading.slippage_tolerance",
                reason: "must be positive".into(),
            }
            .into());
        }
        if !(0.0..=1.0).contains(&self.risk.conservative_factor)
            || self.risk.conservative_factor == 0.0
        {
            return Err(ConfigError::InvalidValue {
                field: "risk.conservative_factor",
                reason: "must be in (0, 1]".into(),
            }
            .into());
        }
        if !(0.0..=1.0).contains(&self.risk.max_kelly_fraction)
            || self.risk.max_kelly_fraction == 0.0
        {
            return Err(ConfigError::InvalidValue {
                field: "risk.max_kelly_fraction",
                reason: "must be in (0, 1]".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize the global tracing subscriber from the logging section.
    pub fn init_logging(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.logging.level.clone()));

        if self.logging.format == "json" {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .init();
        } else {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.detector.min_discrepancy, dec!(0.03));
        assert_eq!(config.detector.min_trade_capital, dec!(100));
        assert_eq!(config.detector.validity_secs, 60);
        assert_eq!(config.trading.min_profit_threshold, dec!(0.02));
        assert_eq!(config.trading.max_position_size, dec!(1000));
        assert_eq!(config.trading.slippage_tolerance, dec!(0.01));
        assert_eq!(config.trading.fee_per_leg(), dec!(0.004));
        assert_eq!(config.trading.min_trade_size, dec!(10));
        assert_eq!(config.risk.max_daily_loss, dec!(100));
        assert_eq!(config.risk.max_open_positions, 10);
        assert_eq!(config.risk.conservative_factor, 0.5);
        assert_eq!(config.risk.max_kelly_fraction, 0.25);
        assert_eq!(config.app.scan_interval_secs, 30);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [detector]
            min_discrepancy = "0.05"

            [risk]
            max_open_positions = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.detector.min_discrepancy, dec!(0.05));
        assert_eq!(config.detector.validity_secs, 60);
        assert_eq!(config.risk.max_open_positions, 3);
        assert_eq!(config.trading.max_position_size, dec!(1000));
    }

    #[test]
    fn zero_conservative_factor_rejected() {
        let config = Config {
            risk: RiskConfig {
                conservative_factor: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[trading]\nmax_position_size = \"500\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.trading.max_position_size, dec!(500));
    }
}

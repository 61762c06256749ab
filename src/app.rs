//! App orchestration module.
//!
//! Wires the feed, detector, allocator and executor into the periodic scan
//! loop. Each tick pulls a market snapshot, ranks the detected
//! opportunities, and pushes every sized candidate through execution,
//! settling the capital reservation from the result.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::adapter::{MemoryLedger, PaperGateway, StaticFeed};
use crate::config::Config;
use crate::detector::Detector;
use crate::error::Result;
use crate::exchange::{Ledger, MarketFeed, OrderGateway};
use crate::executor::Executor;
use crate::risk::{AccountState, CapitalAllocator, Sizing};

/// What one scan tick did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    pub detected: usize,
    pub executed: usize,
    pub skipped: usize,
}

/// Main application struct.
pub struct App<G: OrderGateway, F: MarketFeed, L: Ledger> {
    detector: Detector,
    allocator: CapitalAllocator,
    executor: Executor<G>,
    feed: F,
    ledger: L,
    scan_interval: Duration,
}

impl App<PaperGateway, StaticFeed, MemoryLedger> {
    /// Paper-trading stack: simulated venue, fixed feed, in-memory ledger.
    pub fn paper(config: &Config, feed: StaticFeed, gateway: PaperGateway) -> Self {
        Self::new(config, Arc::new(gateway), feed, MemoryLedger::new())
    }
}

impl<G: OrderGateway, F: MarketFeed, L: Ledger> App<G, F, L> {
    pub fn new(config: &Config, gateway: Arc<G>, feed: F, ledger: L) -> Self {
        let account = Arc::new(AccountState::new(config.risk.initial_capital));
        Self {
            detector: Detector::new(config.detector.clone(), config.trading.clone()),
            allocator: CapitalAllocator::new(
                config.risk.clone(),
                config.trading.clone(),
                account,
            ),
            executor: Executor::new(gateway, config.trading.clone()),
            feed,
            ledger,
            scan_interval: Duration::from_secs(config.app.scan_interval_secs),
        }
    }

    pub fn account(&self) -> &Arc<AccountState> {
        self.allocator.account()
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Run the scan loop until the task is cancelled.
    pub async fn run(&self) -> Result<()> {
        info!(
            interval_secs = self.scan_interval.as_secs(),
            capital = %self.account().available_capital(),
            "Scan loop starting"
        );
        let mut ticker = tokio::time::interval(self.scan_interval);
        loop {
            ticker.tick().await;
            match self.scan_once().await {
                Ok(report) if report.detected > 0 => {
                    info!(
                        detected = report.detected,
                        executed = report.executed,
                        skipped = report.skipped,
                        "Scan tick done"
                    );
                }
                Ok(_) => debug!("Scan tick done, nothing detected"),
                Err(e) => error!(error = %e, "Scan tick failed"),
            }
        }
    }

    /// One full detect/size/execute pass over the current snapshot.
    pub async fn scan_once(&self) -> Result<ScanReport> {
        let events = self.feed.active_events().await?;
        let opportunities = self.detector.scan_all(&events);

        let mut report = ScanReport {
            detected: opportunities.len(),
            ..ScanReport::default()
        };

        for opportunity in &opportunities {
            match self.allocator.size(opportunity) {
                Sizing::Sized { size, reservation } => {
                    match self.executor.execute(opportunity, size).await {
                        Ok(result) => {
                            self.account().settle(reservation, &result);
                            if result.success {
                                report.executed += 1;
                            }
                            self.ledger.record(&result, opportunity).await?;
                        }
                        Err(e) => {
                            // Rejected before any order went out; hand the
                            // reserved capital straight back.
                            self.account().release(reservation);
                            warn!(
                                opportunity = %opportunity.id(),
                                error = %e,
                                "Execution rejected"
                            );
                            report.skipped += 1;
                        }
                    }
                }
                Sizing::TooSmall => {
                    debug!(opportunity = %opportunity.id(), "Sized below minimum, skipping");
                    report.skipped += 1;
                }
                Sizing::Refused(reasons) => {
                    warn!(
                        opportunity = %opportunity.id(),
                        reasons = ?reasons,
                        "Risk limits refused trade"
                    );
                    report.skipped += 1;
                }
            }
        }

        Ok(report)
    }
}

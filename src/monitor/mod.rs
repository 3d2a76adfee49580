//! Periodic aggregate → decide → route loop.
//!
//! One tick runs the full pipeline for every configured symbol and
//! completes before the next tick's work begins; aggregation and
//! evaluator execution inside a tick are concurrent. Cancellation is
//! cooperative: the shutdown signal is only observed between ticks, so
//! an in-flight tick (and any order submission inside it) always runs to
//! completion.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::aggregator::Aggregator;
use crate::conductor::Conductor;
use crate::domain::{Decision, ExecutionOrder, MarketSnapshot, Symbol};
use crate::error::{ConfigError, Result};
use crate::router::ExecutionRouter;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub symbols: Vec<Symbol>,
    pub tick_interval: Duration,
    pub per_call_timeout: Duration,
    /// Absolute best-price move (percent) between consecutive cycles
    /// that raises an alert.
    pub alert_threshold_pct: Decimal,
    /// Stop after this many ticks; `None` runs until cancelled.
    pub max_ticks: Option<u64>,
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(ConfigError::MissingField {
                field: "monitor.symbols",
            }
            .into());
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "monitor.tick_interval_ms",
                reason: "must be positive".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Significant price movement between two consecutive cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub symbol: Symbol,
    pub previous_price: Decimal,
    pub current_price: Decimal,
    pub change_pct: Decimal,
    pub raised_at: DateTime<Utc>,
}

/// Everything one tick produced, for logging/compliance/UI consumers.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub snapshots: Vec<MarketSnapshot>,
    pub decisions: Vec<Decision>,
    pub orders: Vec<ExecutionOrder>,
    pub alerts: Vec<Alert>,
    /// Symbols skipped this tick because no venue responded.
    pub degraded: Vec<Symbol>,
}

pub struct MonitorLoop {
    aggregator: Aggregator,
    conductor: Conductor,
    router: Arc<ExecutionRouter>,
    config: MonitorConfig,
}

impl MonitorLoop {
    #[must_use]
    pub fn new(
        aggregator: Aggregator,
        conductor: Conductor,
        router: Arc<ExecutionRouter>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            aggregator,
            conductor,
            router,
            config,
        }
    }

    /// Run until cancelled or `max_ticks` is reached.
    ///
    /// Reports are pushed per tick; a consumer that falls behind or goes
    /// away does not stall the loop.
    pub async fn run(
        self,
        mut shutdown: watch::Receiver<bool>,
        reports: mpsc::Sender<CycleReport>,
    ) -> Result<()> {
        let mut interval = tokio::time::interval(self.config.tick_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        // Last known best price per symbol. Owned by the loop, scoped to
        // its lifetime; nothing else reads or writes it.
        let mut last_prices: HashMap<Symbol, Decimal> = HashMap::new();
        let mut cycle: u64 = 0;

        info!(
            symbols = self.config.symbols.len(),
            tick_interval_ms = self.config.tick_interval.as_millis() as u64,
            evaluators = ?self.conductor.evaluator_ids(),
            "Monitor loop starting"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    cycle += 1;
                    let report = self.run_tick(cycle, &mut last_prices).await;
                    if reports.try_send(report).is_err() {
                        debug!(cycle, "Report channel full or closed, dropping cycle report");
                    }

                    if self.config.max_ticks.is_some_and(|max| cycle >= max) {
                        info!(cycle, "Tick budget exhausted, stopping");
                        return Ok(());
                    }
                }
                changed = shutdown.changed() => {
                    // A dropped sender counts as a shutdown request.
                    if changed.is_err() || *shutdown.borrow() {
                        info!(cycle, "Shutdown requested, monitor loop stopping");
                        return Ok(());
                    }
                }
            }
        }
    }

    /// One full tick: aggregate, decide and route every symbol.
    async fn run_tick(
        &self,
        cycle: u64,
        last_prices: &mut HashMap<Symbol, Decimal>,
    ) -> CycleReport {
        let mut report = CycleReport {
            cycle,
            snapshots: Vec::new(),
            decisions: Vec::new(),
            orders: Vec::new(),
            alerts: Vec::new(),
            degraded: Vec::new(),
        };

        for symbol in &self.config.symbols {
            let snapshot = match self
                .aggregator
                .aggregate(symbol, self.config.per_call_timeout)
                .await
            {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    // Degraded, not fatal; other symbols continue.
                    warn!(cycle, symbol = %symbol, error = %error, "Symbol degraded this tick");
                    report.degraded.push(symbol.clone());
                    continue;
                }
            };

            if let Some(alert) = self.check_movement(symbol, &snapshot, last_prices) {
                info!(
                    cycle,
                    symbol = %symbol,
                    change_pct = %alert.change_pct,
                    "Price movement alert"
                );
                report.alerts.push(alert);
            }

            let decisions = self.conductor.conduct(&snapshot).await;
            for decision in &decisions {
                if !decision.is_approved() {
                    continue;
                }
                match self.router.route(decision, &snapshot).await {
                    Ok(order) => report.orders.push(order),
                    Err(error) => {
                        warn!(cycle, symbol = %symbol, error = %error, "Routing failed");
                    }
                }
            }

            report.decisions.extend(decisions);
            report.snapshots.push(snapshot);
        }

        debug!(
            cycle,
            snapshots = report.snapshots.len(),
            decisions = report.decisions.len(),
            orders = report.orders.len(),
            alerts = report.alerts.len(),
            degraded = report.degraded.len(),
            "Tick complete"
        );
        report
    }

    /// Compare the new best price against the previous cycle's.
    fn check_movement(
        &self,
        symbol: &Symbol,
        snapshot: &MarketSnapshot,
        last_prices: &mut HashMap<Symbol, Decimal>,
    ) -> Option<Alert> {
        let current = snapshot.reference_price()?;
        let previous = last_prices.insert(symbol.clone(), current)?;

        if previous.is_zero() {
            return None;
        }
        let change_pct = (current - previous) / previous * Decimal::ONE_HUNDRED;
        if change_pct.abs() <= self.config.alert_threshold_pct {
            return None;
        }

        Some(Alert {
            symbol: symbol.clone(),
            previous_price: previous,
            current_price: current,
            change_pct: change_pct.round_dp(4),
            raised_at: Utc::now(),
        })
    }
}

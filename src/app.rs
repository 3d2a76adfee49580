//! Application wiring.
//!
//! Builds the connector registry, evaluators, router and monitor loop
//! from a validated [`Config`] and runs the pipeline until shutdown.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::aggregator::Aggregator;
use crate::conductor::evaluators::{MomentumEvaluator, SpreadReversionEvaluator};
use crate::conductor::{Conductor, Evaluator};
use crate::config::{Config, VenueConfig, VenueKind};
use crate::connector::{
    BtcMarketsConnector, Connector, ConnectorRegistry, OkxConnector, PaperConnector,
};
use crate::domain::Symbol;
use crate::error::Result;
use crate::monitor::{CycleReport, MonitorLoop};
use crate::router::ExecutionRouter;

/// Main application struct.
pub struct App;

impl App {
    /// Run the monitor loop until Ctrl-C or the configured tick budget.
    pub async fn run(config: Config) -> Result<()> {
        let registry = Arc::new(build_connector_registry(&config.venues));
        info!(
            venues = ?registry.venue_ids().iter().map(ToString::to_string).collect::<Vec<_>>(),
            "Connectors initialized"
        );

        let evaluators = build_evaluators(&config);
        info!(
            strategies = ?evaluators.iter().map(|e| e.strategy_id()).collect::<Vec<_>>(),
            "Evaluators loaded"
        );

        let aggregator = Aggregator::new(registry.clone());
        let conductor = Conductor::new(evaluators, config.gate_config());
        let router = Arc::new(ExecutionRouter::new(registry, config.router_config()));
        let monitor = MonitorLoop::new(aggregator, conductor, router, config.monitor_config());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received, finishing in-flight tick");
                let _ = shutdown_tx.send(true);
            }
        });

        let (report_tx, report_rx) = mpsc::channel(16);
        let reporter = tokio::spawn(log_reports(report_rx));

        let result = monitor.run(shutdown_rx, report_tx).await;
        let _ = reporter.await;
        result
    }
}

/// Log a structured per-cycle summary for downstream consumers.
///
/// Stands in for the compliance/UI collaborators that would normally
/// subscribe to the report channel.
async fn log_reports(mut reports: mpsc::Receiver<CycleReport>) {
    while let Some(report) = reports.recv().await {
        info!(
            cycle = report.cycle,
            snapshots = report.snapshots.len(),
            decisions = report.decisions.len(),
            orders = report.orders.len(),
            alerts = report.alerts.len(),
            degraded = report.degraded.len(),
            "Cycle complete"
        );
        for decision in &report.decisions {
            info!(
                strategy = decision.intent().strategy_id(),
                symbol = %decision.intent().symbol(),
                side = %decision.intent().side(),
                verdict = %decision.verdict(),
                reason = decision.reason(),
                "Decision"
            );
        }
    }
}

/// Build one connector per configured venue.
pub fn build_connector_registry(venues: &[VenueConfig]) -> ConnectorRegistry {
    let mut registry = ConnectorRegistry::new();
    for venue in venues {
        let connector: Arc<dyn Connector> = match venue.kind {
            VenueKind::Paper => {
                let base_prices: HashMap<Symbol, _> = venue
                    .base_prices
                    .iter()
                    .map(|(symbol, price)| (symbol.as_str().into(), *price))
                    .collect();
                Arc::new(PaperConnector::new(venue.id.as_str().into(), base_prices))
            }
            VenueKind::BtcMarkets => match &venue.api_url {
                Some(url) => Arc::new(BtcMarketsConnector::with_base_url(
                    venue.id.as_str().into(),
                    url.clone(),
                )),
                None => Arc::new(BtcMarketsConnector::new(venue.id.as_str().into())),
            },
            VenueKind::Okx => match &venue.api_url {
                Some(url) => Arc::new(OkxConnector::with_base_url(
                    venue.id.as_str().into(),
                    url.clone(),
                )),
                None => Arc::new(OkxConnector::new(venue.id.as_str().into())),
            },
        };
        registry.register(connector);
    }
    registry
}

/// Build the evaluator set named in the config.
fn build_evaluators(config: &Config) -> Vec<Arc<dyn Evaluator>> {
    let mut evaluators: Vec<Arc<dyn Evaluator>> = Vec::new();
    for name in &config.conductor.strategies {
        match name.as_str() {
            "momentum" => evaluators.push(Arc::new(MomentumEvaluator::default())),
            "spread_reversion" => evaluators.push(Arc::new(SpreadReversionEvaluator::default())),
            unknown => {
                warn!(strategy = unknown, "Unknown strategy in config, skipping");
            }
        }
    }
    evaluators
}

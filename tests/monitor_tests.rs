//! Integration tests for the monitor loop.

use std::sync::Arc;
use std::time::Duration;

use lyrebird::aggregator::Aggregator;
use lyrebird::conductor::{Conductor, GateConfig};
use lyrebird::connector::ConnectorRegistry;
use lyrebird::monitor::{CycleReport, MonitorConfig, MonitorLoop};
use lyrebird::router::{ExecutionRouter, RouterConfig};
use lyrebird::testkit::connector::MockConnector;
use lyrebird::testkit::domain::symbol;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::{mpsc, watch};

fn monitor_with(
    connectors: Vec<MockConnector>,
    symbols: Vec<&str>,
    alert_threshold_pct: Decimal,
    max_ticks: Option<u64>,
) -> MonitorLoop {
    let mut registry = ConnectorRegistry::new();
    for connector in connectors {
        registry.register(Arc::new(connector));
    }
    let registry = Arc::new(registry);

    MonitorLoop::new(
        Aggregator::new(registry.clone()),
        Conductor::new(Vec::new(), GateConfig::default()),
        Arc::new(ExecutionRouter::new(registry, RouterConfig::default())),
        MonitorConfig {
            symbols: symbols.into_iter().map(symbol).collect(),
            tick_interval: Duration::from_millis(10),
            per_call_timeout: Duration::from_millis(50),
            alert_threshold_pct,
            max_ticks,
        },
    )
}

async fn collect_reports(
    monitor: MonitorLoop,
    expected: usize,
) -> Vec<CycleReport> {
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let (report_tx, mut report_rx) = mpsc::channel(16);

    let handle = tokio::spawn(monitor.run(shutdown_rx, report_tx));

    let mut reports = Vec::new();
    while let Some(report) = report_rx.recv().await {
        reports.push(report);
    }
    handle.await.unwrap().unwrap();

    assert_eq!(reports.len(), expected);
    reports
}

#[tokio::test]
async fn tick_budget_produces_one_report_per_tick() {
    let monitor = monitor_with(
        vec![MockConnector::new("alpha").with_price("BTC-AUD", dec!(100))],
        vec!["BTC-AUD"],
        dec!(2),
        Some(3),
    );

    let reports = collect_reports(monitor, 3).await;

    for (i, report) in reports.iter().enumerate() {
        assert_eq!(report.cycle, i as u64 + 1);
        assert_eq!(report.snapshots.len(), 1);
        assert!(report.degraded.is_empty());
    }
}

#[tokio::test]
async fn dead_symbol_is_degraded_without_halting_others() {
    let monitor = monitor_with(
        vec![MockConnector::new("alpha").with_price("BTC-AUD", dec!(100))],
        vec!["BTC-AUD", "ETH-AUD"],
        dec!(2),
        Some(2),
    );

    let reports = collect_reports(monitor, 2).await;

    for report in &reports {
        assert_eq!(report.snapshots.len(), 1, "live symbol still aggregates");
        assert_eq!(report.degraded, vec![symbol("ETH-AUD")]);
    }
}

#[tokio::test]
async fn movement_beyond_threshold_raises_an_alert() {
    // 100 -> 110 is a 10% jump against a 2% threshold.
    let monitor = monitor_with(
        vec![MockConnector::new("alpha")
            .with_price_sequence("BTC-AUD", vec![dec!(100), dec!(110)])],
        vec!["BTC-AUD"],
        dec!(2),
        Some(2),
    );

    let reports = collect_reports(monitor, 2).await;

    assert!(reports[0].alerts.is_empty(), "no baseline on the first tick");
    assert_eq!(reports[1].alerts.len(), 1);
    let alert = &reports[1].alerts[0];
    assert_eq!(alert.previous_price, dec!(100));
    assert_eq!(alert.current_price, dec!(110));
    assert_eq!(alert.change_pct, dec!(10));
}

#[tokio::test]
async fn small_movement_stays_quiet() {
    let monitor = monitor_with(
        vec![MockConnector::new("alpha")
            .with_price_sequence("BTC-AUD", vec![dec!(100), dec!(101)])],
        vec!["BTC-AUD"],
        dec!(2),
        Some(2),
    );

    let reports = collect_reports(monitor, 2).await;

    assert!(reports.iter().all(|r| r.alerts.is_empty()));
}

#[tokio::test]
async fn shutdown_stops_the_loop_after_the_inflight_tick() {
    let monitor = monitor_with(
        vec![MockConnector::new("alpha").with_price("BTC-AUD", dec!(100))],
        vec!["BTC-AUD"],
        dec!(2),
        None,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (report_tx, mut report_rx) = mpsc::channel(16);
    let handle = tokio::spawn(monitor.run(shutdown_rx, report_tx));

    // Let at least one full tick happen, then cancel.
    let first = report_rx.recv().await.expect("first report");
    assert_eq!(first.cycle, 1);
    shutdown_tx.send(true).unwrap();

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("loop must stop after cancellation")
        .unwrap()
        .unwrap();
}

//! Integration tests for cross-venue aggregation.

use std::sync::Arc;
use std::time::Duration;

use lyrebird::aggregator::Aggregator;
use lyrebird::connector::ConnectorRegistry;
use lyrebird::error::{AggregationError, ConnectorError};
use lyrebird::testkit::connector::MockConnector;
use lyrebird::testkit::domain::symbol;
use rust_decimal_macros::dec;

const TIMEOUT: Duration = Duration::from_millis(50);

fn registry_of(connectors: Vec<MockConnector>) -> Arc<ConnectorRegistry> {
    let mut registry = ConnectorRegistry::new();
    for connector in connectors {
        registry.register(Arc::new(connector));
    }
    Arc::new(registry)
}

#[tokio::test]
async fn responding_venues_are_included_and_stragglers_dropped() {
    let sym = symbol("BTC-AUD");
    let registry = registry_of(vec![
        MockConnector::new("alpha").with_price("BTC-AUD", dec!(100)),
        MockConnector::new("beta").with_price("BTC-AUD", dec!(101)),
        // Never answers within the deadline.
        MockConnector::new("gamma")
            .with_price("BTC-AUD", dec!(99))
            .with_latency(Duration::from_millis(500)),
    ]);

    let snapshot = Aggregator::new(registry)
        .aggregate(&sym, TIMEOUT)
        .await
        .expect("two venues responded");

    assert_eq!(snapshot.venue_count(), 2);
    assert!(snapshot.spread_pct().is_some(), "spread defined with 2 venues");
    assert_eq!(snapshot.failures().len(), 1);
    assert_eq!(snapshot.failures()[0].venue_id.as_str(), "gamma");
    assert!(matches!(
        snapshot.failures()[0].error,
        ConnectorError::Timeout { .. }
    ));
}

#[tokio::test]
async fn single_responder_yields_undefined_spread() {
    let sym = symbol("BTC-AUD");
    let registry = registry_of(vec![
        MockConnector::new("alpha").with_price("BTC-AUD", dec!(100)),
        MockConnector::new("beta")
            .with_failure("BTC-AUD", ConnectorError::Unavailable("down".into())),
    ]);

    let snapshot = Aggregator::new(registry)
        .aggregate(&sym, TIMEOUT)
        .await
        .unwrap();

    assert_eq!(snapshot.venue_count(), 1);
    assert_eq!(snapshot.spread_pct(), None, "spread undefined, not zero");
    assert_eq!(snapshot.best_bid_venue().unwrap().as_str(), "alpha");
    assert_eq!(snapshot.best_ask_venue().unwrap().as_str(), "alpha");
}

#[tokio::test]
async fn all_venues_failing_is_no_liquidity_source() {
    let sym = symbol("BTC-AUD");
    let registry = registry_of(vec![
        MockConnector::new("alpha")
            .with_failure("BTC-AUD", ConnectorError::Unavailable("down".into())),
        MockConnector::new("beta")
            .with_price("BTC-AUD", dec!(100))
            .with_latency(Duration::from_millis(500)),
    ]);

    let result = Aggregator::new(registry).aggregate(&sym, TIMEOUT).await;

    assert!(matches!(
        result,
        Err(AggregationError::NoLiquiditySource { .. })
    ));
}

#[tokio::test]
async fn exact_price_tie_breaks_to_lexicographically_smaller_venue() {
    let sym = symbol("BTC-AUD");

    // Repeated runs must land on the same venue.
    for _ in 0..10 {
        let registry = registry_of(vec![
            MockConnector::new("zulu").with_price("BTC-AUD", dec!(100)),
            MockConnector::new("alpha").with_price("BTC-AUD", dec!(100)),
            MockConnector::new("mike").with_price("BTC-AUD", dec!(100)),
        ]);

        let snapshot = Aggregator::new(registry)
            .aggregate(&sym, TIMEOUT)
            .await
            .unwrap();

        assert_eq!(snapshot.best_bid_venue().unwrap().as_str(), "alpha");
        assert_eq!(snapshot.best_ask_venue().unwrap().as_str(), "alpha");
    }
}

#[tokio::test]
async fn spread_is_computed_from_extreme_quotes() {
    let sym = symbol("BTC-AUD");
    let registry = registry_of(vec![
        MockConnector::new("a").with_price("BTC-AUD", dec!(100)),
        MockConnector::new("b").with_price("BTC-AUD", dec!(101)),
        MockConnector::new("c").with_price("BTC-AUD", dec!(99.5)),
    ]);

    let snapshot = Aggregator::new(registry)
        .aggregate(&sym, TIMEOUT)
        .await
        .unwrap();

    assert_eq!(snapshot.best_bid_venue().unwrap().as_str(), "b");
    assert_eq!(snapshot.best_ask_venue().unwrap().as_str(), "c");

    // (99.5 - 101) / 101 * 100
    let spread = snapshot.spread_pct().unwrap();
    assert_eq!(spread.round_dp(4), dec!(-1.4851));
}

#[tokio::test]
async fn unknown_symbol_is_tagged_per_venue() {
    let sym = symbol("DOGE-AUD");
    let registry = registry_of(vec![
        MockConnector::new("alpha").with_price("BTC-AUD", dec!(100)),
        MockConnector::new("beta").with_price("DOGE-AUD", dec!(0.5)),
    ]);

    let snapshot = Aggregator::new(registry)
        .aggregate(&sym, TIMEOUT)
        .await
        .unwrap();

    assert_eq!(snapshot.venue_count(), 1);
    assert!(matches!(
        snapshot.failures()[0].error,
        ConnectorError::InvalidSymbol { .. }
    ));
}

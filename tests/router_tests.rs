//! Integration tests for the execution router.

use std::sync::Arc;
use std::time::Duration;

use lyrebird::connector::{ConnectorRegistry, TradeMode};
use lyrebird::domain::{
    Decision, ExecutionAck, OrderStatus, Side, Signal, TradingIntent, Verdict,
};
use lyrebird::error::{ConnectorError, ExecutionError};
use lyrebird::router::{ExecutionRouter, RouterConfig};
use lyrebird::testkit::connector::MockConnector;
use lyrebird::testkit::domain::{approved, buy_intent, snapshot, symbol};
use rust_decimal_macros::dec;

fn fast_config() -> RouterConfig {
    RouterConfig {
        size_ceiling: dec!(1),
        max_retry_count: 2,
        retry_backoff: Duration::from_millis(5),
        submit_timeout: Duration::from_millis(100),
        mode: TradeMode::Paper,
    }
}

fn router_with(connector: Arc<MockConnector>) -> ExecutionRouter {
    let mut registry = ConnectorRegistry::new();
    registry.register(connector);
    ExecutionRouter::new(Arc::new(registry), fast_config())
}

#[tokio::test]
async fn duplicate_routing_returns_existing_order_without_resubmitting() {
    let sym = symbol("BTC-AUD");
    let connector = Arc::new(MockConnector::new("alpha").with_price("BTC-AUD", dec!(100)));
    let router = router_with(connector.clone());
    let snap = snapshot(&sym, &[("alpha", dec!(100))]);

    let decision = approved(buy_intent(&sym, dec!(0.5), 0.8));

    let first = router.route(&decision, &snap).await.unwrap();
    let second = router.route(&decision, &snap).await.unwrap();

    assert_eq!(first, second, "second call returns the first order unchanged");
    assert_eq!(second.attempts(), first.attempts());
    assert_eq!(
        connector.submissions().len(),
        1,
        "the venue saw exactly one submission"
    );
}

#[tokio::test]
async fn oversized_intent_is_downgraded_to_ceiling_and_flagged() {
    let sym = symbol("BTC-AUD");
    let connector = Arc::new(MockConnector::new("alpha").with_price("BTC-AUD", dec!(100)));
    let router = router_with(connector.clone());
    let snap = snapshot(&sym, &[("alpha", dec!(100))]);

    let order = router
        .route(&approved(buy_intent(&sym, dec!(10), 0.8)), &snap)
        .await
        .unwrap();

    assert_eq!(order.size(), dec!(1));
    assert!(order.capped());
    assert_eq!(connector.submissions()[0].size, dec!(1));
}

#[tokio::test]
async fn buy_routes_to_lowest_priced_venue() {
    let sym = symbol("BTC-AUD");
    let mut registry = ConnectorRegistry::new();
    let alpha = Arc::new(MockConnector::new("alpha").with_price("BTC-AUD", dec!(101)));
    let cheap = Arc::new(MockConnector::new("cheap").with_price("BTC-AUD", dec!(99)));
    registry.register(alpha.clone());
    registry.register(cheap.clone());
    let router = ExecutionRouter::new(Arc::new(registry), fast_config());

    let snap = snapshot(&sym, &[("alpha", dec!(101)), ("cheap", dec!(99))]);
    let order = router
        .route(&approved(buy_intent(&sym, dec!(0.5), 0.8)), &snap)
        .await
        .unwrap();

    assert_eq!(order.venue_id().as_str(), "cheap");
    assert!(alpha.submissions().is_empty());
    assert_eq!(cheap.submissions().len(), 1);
}

#[tokio::test]
async fn transient_failure_is_retried_then_succeeds() {
    let sym = symbol("BTC-AUD");
    let connector = Arc::new(
        MockConnector::new("alpha")
            .with_price("BTC-AUD", dec!(100))
            .with_submit_script(vec![
                Err(ConnectorError::Timeout { timeout_ms: 100 }),
                Ok(ExecutionAck {
                    order_id: "ord-2".to_string(),
                    filled: true,
                }),
            ]),
    );
    let router = router_with(connector.clone());
    let snap = snapshot(&sym, &[("alpha", dec!(100))]);

    let order = router
        .route(&approved(buy_intent(&sym, dec!(0.5), 0.8)), &snap)
        .await
        .unwrap();

    assert_eq!(order.attempts(), 2);
    assert!(matches!(order.status(), OrderStatus::Filled { .. }));
    assert_eq!(connector.submissions().len(), 2);
}

#[tokio::test]
async fn unfilled_ack_leaves_the_order_submitted() {
    let sym = symbol("BTC-AUD");
    let connector = Arc::new(
        MockConnector::new("alpha")
            .with_price("BTC-AUD", dec!(100))
            .with_submit_script(vec![Ok(ExecutionAck {
                order_id: "ord-1".to_string(),
                filled: false,
            })]),
    );
    let router = router_with(connector.clone());
    let snap = snapshot(&sym, &[("alpha", dec!(100))]);

    let order = router
        .route(&approved(buy_intent(&sym, dec!(0.5), 0.8)), &snap)
        .await
        .unwrap();

    assert!(matches!(
        order.status(),
        OrderStatus::Submitted { order_id } if order_id == "ord-1"
    ));
    assert!(!order.status().is_terminal());
    assert_eq!(order.attempts(), 1);
}

#[tokio::test]
async fn rejection_is_terminal_with_no_retry() {
    let sym = symbol("BTC-AUD");
    let connector = Arc::new(
        MockConnector::new("alpha")
            .with_price("BTC-AUD", dec!(100))
            .with_submit_script(vec![Err(ConnectorError::Rejected("nope".to_string()))]),
    );
    let router = router_with(connector.clone());
    let snap = snapshot(&sym, &[("alpha", dec!(100))]);

    let order = router
        .route(&approved(buy_intent(&sym, dec!(0.5), 0.8)), &snap)
        .await
        .unwrap();

    assert_eq!(order.attempts(), 1);
    assert!(matches!(
        order.status(),
        OrderStatus::Failed {
            error: ConnectorError::Rejected(_)
        }
    ));
    assert_eq!(connector.submissions().len(), 1);
}

#[tokio::test]
async fn retries_are_bounded() {
    let sym = symbol("BTC-AUD");
    let connector = Arc::new(
        MockConnector::new("alpha")
            .with_price("BTC-AUD", dec!(100))
            .with_submit_script(vec![
                Err(ConnectorError::RateLimited),
                Err(ConnectorError::RateLimited),
                Err(ConnectorError::RateLimited),
                Err(ConnectorError::RateLimited),
            ]),
    );
    let router = router_with(connector.clone());
    let snap = snapshot(&sym, &[("alpha", dec!(100))]);

    let order = router
        .route(&approved(buy_intent(&sym, dec!(0.5), 0.8)), &snap)
        .await
        .unwrap();

    // One initial attempt plus max_retry_count retries.
    assert_eq!(order.attempts(), 3);
    assert!(matches!(order.status(), OrderStatus::Failed { .. }));
    assert_eq!(connector.submissions().len(), 3);
}

#[tokio::test]
async fn non_approved_decisions_never_reach_a_venue() {
    let sym = symbol("BTC-AUD");
    let connector = Arc::new(MockConnector::new("alpha").with_price("BTC-AUD", dec!(100)));
    let router = router_with(connector.clone());
    let snap = snapshot(&sym, &[("alpha", dec!(100))]);

    for verdict in [Verdict::Hold, Verdict::Reject] {
        let intent = buy_intent(&sym, dec!(0.5), 0.5);
        let decision = Decision::new(intent, verdict, "not approved");
        let result = router.route(&decision, &snap).await;
        assert!(matches!(result, Err(ExecutionError::NotApproved { .. })));
    }

    assert!(connector.submissions().is_empty());
}

#[tokio::test]
async fn concurrent_duplicate_routing_submits_at_most_once() {
    let sym = symbol("BTC-AUD");
    let connector = Arc::new(
        MockConnector::new("alpha")
            .with_price("BTC-AUD", dec!(100))
            .with_latency(Duration::from_millis(20)),
    );
    let router = Arc::new(router_with(connector.clone()));
    let snap = snapshot(&sym, &[("alpha", dec!(100))]);

    let decision = Arc::new(approved(buy_intent(&sym, dec!(0.5), 0.8)));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let router = router.clone();
        let decision = decision.clone();
        let snap = snap.clone();
        handles.push(tokio::spawn(async move {
            router.route(&decision, &snap).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(
        connector.submissions().len(),
        1,
        "idempotency must hold under concurrent routing"
    );

    let registered = router
        .order_for(decision.intent().id())
        .expect("order registered");
    assert_eq!(registered.parent_intent_id(), decision.intent().id());
}

#[tokio::test]
async fn intent_with_same_signals_but_new_id_is_a_new_order() {
    let sym = symbol("BTC-AUD");
    let connector = Arc::new(MockConnector::new("alpha").with_price("BTC-AUD", dec!(100)));
    let router = router_with(connector.clone());
    let snap = snapshot(&sym, &[("alpha", dec!(100))]);

    let first = approved(buy_intent(&sym, dec!(0.5), 0.8));
    let second = approved(buy_intent(&sym, dec!(0.5), 0.8));

    router.route(&first, &snap).await.unwrap();
    router.route(&second, &snap).await.unwrap();

    assert_eq!(connector.submissions().len(), 2);
}

#[tokio::test]
async fn replayed_intent_id_dedupes_across_decision_objects() {
    let sym = symbol("BTC-AUD");
    let connector = Arc::new(MockConnector::new("alpha").with_price("BTC-AUD", dec!(100)));
    let router = router_with(connector.clone());
    let snap = snapshot(&sym, &[("alpha", dec!(100))]);

    let original = buy_intent(&sym, dec!(0.5), 0.8);
    let replayed = TradingIntent::with_id(
        original.id(),
        "test-strategy",
        sym.clone(),
        Side::Buy,
        dec!(0.5),
        0.8,
        "replay",
        vec![Signal::Momentum],
    );

    router.route(&approved(original), &snap).await.unwrap();
    router.route(&approved(replayed), &snap).await.unwrap();

    assert_eq!(connector.submissions().len(), 1);
}

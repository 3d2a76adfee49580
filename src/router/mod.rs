//! Decision-gated execution routing.
//!
//! The router is the single authority over [`ExecutionOrder`] state. It
//! enforces idempotency per intent key, downgrades oversized orders to
//! the configured ceiling, picks the venue from the snapshot that
//! produced the decision, and retries transient submission failures a
//! bounded number of times with backoff. `Rejected` and `InvalidSymbol`
//! are terminal on first sight.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::connector::{Connector, ConnectorRegistry, TradeMode};
use crate::domain::{Decision, ExecutionOrder, IntentId, MarketSnapshot, Side};
use crate::error::{ConfigError, ConnectorError, ExecutionError, Result};

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Hard cap on order size; larger intents are downgraded, never
    /// silently executed at full size.
    pub size_ceiling: Decimal,
    /// Retries after the first attempt, for transient failures only.
    pub max_retry_count: u32,
    /// Base backoff between attempts; scales linearly with the attempt
    /// number.
    pub retry_backoff: Duration,
    /// Deadline for a single submission call.
    pub submit_timeout: Duration,
    pub mode: TradeMode,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            size_ceiling: Decimal::ONE,
            max_retry_count: 2,
            retry_backoff: Duration::from_millis(250),
            submit_timeout: Duration::from_secs(5),
            mode: TradeMode::Paper,
        }
    }
}

impl RouterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.size_ceiling <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "router.size_ceiling",
                reason: "must be positive".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

pub struct ExecutionRouter {
    registry: Arc<ConnectorRegistry>,
    orders: DashMap<IntentId, ExecutionOrder>,
    config: RouterConfig,
}

impl ExecutionRouter {
    #[must_use]
    pub fn new(registry: Arc<ConnectorRegistry>, config: RouterConfig) -> Self {
        Self {
            registry,
            orders: DashMap::new(),
            config,
        }
    }

    /// Turn an approved decision into an execution order and submit it.
    ///
    /// Routing the same intent key twice returns the already-registered
    /// order unchanged; no second submission reaches any connector. The
    /// registry entry is claimed before the first submission starts, so
    /// concurrent duplicate calls serialize on the key.
    pub async fn route(
        &self,
        decision: &Decision,
        snapshot: &MarketSnapshot,
    ) -> std::result::Result<ExecutionOrder, ExecutionError> {
        let intent = decision.intent();
        if !decision.is_approved() {
            return Err(ExecutionError::NotApproved {
                intent_id: intent.id().to_string(),
            });
        }

        // Buys fill where the price is lowest, sells where it is highest.
        let venue = match intent.side() {
            Side::Buy => snapshot.best_ask_venue(),
            Side::Sell => snapshot.best_bid_venue(),
        }
        .ok_or_else(|| ExecutionError::NoVenue {
            symbol: intent.symbol().clone(),
            side: intent.side().as_str(),
        })?;

        let connector = self
            .registry
            .get(venue)
            .ok_or_else(|| ExecutionError::UnknownVenue(venue.clone()))?;

        let capped = intent.size() > self.config.size_ceiling;
        let size = if capped {
            warn!(
                intent = %intent.id(),
                requested = %intent.size(),
                ceiling = %self.config.size_ceiling,
                "Order size downgraded to ceiling"
            );
            self.config.size_ceiling
        } else {
            intent.size()
        };

        // Claim the key. Whoever loses the race observes the existing
        // order and returns it untouched.
        let order = match self.orders.entry(intent.id()) {
            Entry::Occupied(existing) => {
                debug!(intent = %intent.id(), "Duplicate routing call, returning existing order");
                return Ok(existing.get().clone());
            }
            Entry::Vacant(slot) => {
                let order = ExecutionOrder::new(
                    intent.id(),
                    venue.clone(),
                    intent.symbol().clone(),
                    intent.side(),
                    size,
                    capped,
                );
                slot.insert(order.clone());
                order
            }
        };

        let order = self.submit_with_retry(order, connector).await;
        self.orders.insert(intent.id(), order.clone());
        Ok(order)
    }

    /// Look up the order registered for an intent key, if any.
    #[must_use]
    pub fn order_for(&self, intent_id: IntentId) -> Option<ExecutionOrder> {
        self.orders.get(&intent_id).map(|o| o.value().clone())
    }

    /// Drive one order through submission and bounded retries.
    async fn submit_with_retry(
        &self,
        mut order: ExecutionOrder,
        connector: Arc<dyn Connector>,
    ) -> ExecutionOrder {
        loop {
            order.begin_attempt();

            let result = tokio::time::timeout(
                self.config.submit_timeout,
                connector.submit_order(
                    order.symbol(),
                    order.side(),
                    order.size(),
                    self.config.mode,
                    self.config.submit_timeout,
                ),
            )
            .await
            .unwrap_or(Err(ConnectorError::Timeout {
                timeout_ms: self.config.submit_timeout.as_millis() as u64,
            }));

            match result {
                Ok(ack) => {
                    order.mark_submitted(ack.order_id.clone());
                    if ack.filled {
                        order.mark_filled(ack.order_id);
                    }
                    info!(
                        intent = %order.parent_intent_id(),
                        venue = %order.venue_id(),
                        attempts = order.attempts(),
                        status = ?order.status(),
                        "Order submitted"
                    );
                    return order;
                }
                Err(error) => {
                    order.mark_failed(error.clone());

                    let retries_left = order.attempts() <= self.config.max_retry_count;
                    if error.is_transient() && retries_left {
                        let backoff = self.config.retry_backoff * order.attempts();
                        warn!(
                            intent = %order.parent_intent_id(),
                            venue = %order.venue_id(),
                            attempt = order.attempts(),
                            error = %error,
                            backoff_ms = backoff.as_millis() as u64,
                            "Transient submission failure, retrying"
                        );
                        // The only path back to pending.
                        order.reset_for_retry();
                        self.orders
                            .insert(order.parent_intent_id(), order.clone());
                        tokio::time::sleep(backoff).await;
                    } else {
                        warn!(
                            intent = %order.parent_intent_id(),
                            venue = %order.venue_id(),
                            attempts = order.attempts(),
                            error = %error,
                            "Submission failed terminally"
                        );
                        return order;
                    }
                }
            }
        }
    }
}

//! Cross-venue quote aggregation.
//!
//! One aggregation cycle fans a ticker call out to every registered
//! venue, bounds each call by the per-call timeout, and reconciles
//! whatever came back into a single immutable [`MarketSnapshot`]. A
//! venue that fails or times out is dropped from the snapshot's quotes
//! and recorded as a [`VenueFailure`] so the exclusion stays auditable;
//! the cycle only fails when not a single venue responded.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::connector::ConnectorRegistry;
use crate::domain::{MarketSnapshot, Quote, Symbol, VenueFailure, VenueId};
use crate::error::{AggregationError, ConnectorError};

pub struct Aggregator {
    registry: Arc<ConnectorRegistry>,
}

impl Aggregator {
    #[must_use]
    pub fn new(registry: Arc<ConnectorRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectorRegistry> {
        &self.registry
    }

    /// Poll all venues for `symbol` and reconcile the responses.
    ///
    /// Completes as soon as every per-venue call has either returned or
    /// hit `per_call_timeout`; a slow venue can never stall the cycle
    /// past the deadline. The timeout is enforced here at the barrier as
    /// well as inside the adapters, so a misbehaving connector is still
    /// bounded.
    pub async fn aggregate(
        &self,
        symbol: &Symbol,
        per_call_timeout: Duration,
    ) -> Result<MarketSnapshot, AggregationError> {
        let calls = self.registry.all().map(|(venue, connector)| {
            let connector = Arc::clone(connector);
            let venue = venue.clone();
            let symbol = symbol.clone();
            async move {
                let result = tokio::time::timeout(
                    per_call_timeout,
                    connector.get_ticker(&symbol, per_call_timeout),
                )
                .await
                .unwrap_or(Err(ConnectorError::Timeout {
                    timeout_ms: per_call_timeout.as_millis() as u64,
                }));
                (venue, result)
            }
        });

        let results: Vec<(VenueId, Result<Quote, ConnectorError>)> = join_all(calls).await;

        let mut quotes = Vec::new();
        let mut failures = Vec::new();
        for (venue, result) in results {
            match result {
                Ok(quote) => quotes.push(quote),
                Err(error) => {
                    warn!(venue = %venue, symbol = %symbol, error = %error, "Venue excluded from cycle");
                    failures.push(VenueFailure::new(venue, error));
                }
            }
        }

        if quotes.is_empty() {
            return Err(AggregationError::NoLiquiditySource {
                symbol: symbol.clone(),
            });
        }

        let snapshot = MarketSnapshot::from_quotes(symbol.clone(), quotes, failures, Utc::now());
        debug!(
            symbol = %symbol,
            venues = snapshot.venue_count(),
            excluded = snapshot.failures().len(),
            spread_pct = ?snapshot.spread_pct(),
            "Aggregated snapshot"
        );
        Ok(snapshot)
    }
}

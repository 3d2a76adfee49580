//! Venue connector boundary.
//!
//! A connector is the capability-polymorphic adapter to one exchange:
//! market data reads plus order submission. Wire protocol and
//! authentication live entirely inside the adapter; the core only sees
//! the four operations of [`Connector`] and their typed failures.
//!
//! Every operation takes a caller-supplied deadline and must resolve
//! within it (the aggregator additionally enforces the deadline at the
//! fan-out barrier, so a misbehaving adapter cannot stall a cycle).

mod btcmarkets;
mod okx;
mod paper;
mod registry;

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use btcmarkets::BtcMarketsConnector;
pub use okx::OkxConnector;
pub use paper::PaperConnector;
pub use registry::ConnectorRegistry;

use crate::domain::{ExecutionAck, OrderBookSnapshot, Quote, Side, Symbol, TradeRecord, VenueId};
use crate::error::ConnectorError;

/// Whether order submission hits the venue or is simulated locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeMode {
    Paper,
    Live,
}

impl TradeMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Live => "live",
        }
    }
}

/// Capability set every venue adapter must provide.
///
/// Implementations confine side effects to their own network session and
/// never touch shared aggregator or conductor state.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Venue this connector serves.
    fn venue_id(&self) -> &VenueId;

    /// Fetch the current ticker for a symbol.
    async fn get_ticker(
        &self,
        symbol: &Symbol,
        deadline: Duration,
    ) -> Result<Quote, ConnectorError>;

    /// Fetch the order book to the given depth.
    async fn get_orderbook(
        &self,
        symbol: &Symbol,
        depth: usize,
        deadline: Duration,
    ) -> Result<OrderBookSnapshot, ConnectorError>;

    /// Fetch recent trades, most recent first.
    async fn get_trades(
        &self,
        symbol: &Symbol,
        limit: usize,
        deadline: Duration,
    ) -> Result<Vec<TradeRecord>, ConnectorError>;

    /// Submit an order, paper or live.
    async fn submit_order(
        &self,
        symbol: &Symbol,
        side: Side,
        size: Decimal,
        mode: TradeMode,
        deadline: Duration,
    ) -> Result<ExecutionAck, ConnectorError>;
}

/// Bound a connector-internal future by the caller's deadline.
///
/// Adapters wrap their network I/O in this so a dead venue resolves to
/// [`ConnectorError::Timeout`] instead of hanging.
pub(crate) async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T, ConnectorError>
where
    F: std::future::Future<Output = Result<T, ConnectorError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(ConnectorError::Timeout {
            timeout_ms: deadline.as_millis() as u64,
        }),
    }
}

/// Refuse a venue-reported book whose best bid meets or exceeds its best
/// ask. A crossed book is a venue fault and never reaches the core.
pub(crate) fn reject_crossed(
    snapshot: OrderBookSnapshot,
) -> Result<OrderBookSnapshot, ConnectorError> {
    if snapshot.is_crossed() {
        return Err(ConnectorError::Unavailable(
            "venue returned a crossed book".to_string(),
        ));
    }
    Ok(snapshot)
}

//! Execution orders and their lifecycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{IntentId, Symbol, VenueId};
use super::intent::Side;
use crate::error::ConnectorError;

/// Venue acknowledgement for a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionAck {
    /// Venue-assigned order identifier.
    pub order_id: String,
    /// Whether the venue reported an immediate full fill.
    pub filled: bool,
}

/// Lifecycle state of an execution order.
///
/// Legal transitions: `Pending -> Submitted -> {Filled | Failed}`. An
/// attempt that fails before the venue acknowledges moves `Pending ->
/// Failed` directly, since no submission exists to name. `Failed`
/// re-enters `Pending` only through the router's bounded retry path,
/// never through a caller re-routing the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum OrderStatus {
    Pending,
    Submitted { order_id: String },
    Filled { order_id: String },
    Failed { error: ConnectorError },
}

impl OrderStatus {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled { .. } | Self::Failed { .. })
    }
}

/// An order derived from an approved decision, keyed by the intent that
/// produced it.
///
/// State transitions are owned exclusively by the execution router; other
/// components observe orders but never advance them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOrder {
    parent_intent_id: IntentId,
    venue_id: VenueId,
    symbol: Symbol,
    side: Side,
    size: Decimal,
    capped: bool,
    status: OrderStatus,
    attempts: u32,
}

impl ExecutionOrder {
    #[must_use]
    pub const fn new(
        parent_intent_id: IntentId,
        venue_id: VenueId,
        symbol: Symbol,
        side: Side,
        size: Decimal,
        capped: bool,
    ) -> Self {
        Self {
            parent_intent_id,
            venue_id,
            symbol,
            side,
            size,
            capped,
            status: OrderStatus::Pending,
            attempts: 0,
        }
    }

    /// Idempotency key; at most one live submission ever happens per key.
    #[must_use]
    pub const fn parent_intent_id(&self) -> IntentId {
        self.parent_intent_id
    }

    #[must_use]
    pub const fn venue_id(&self) -> &VenueId {
        &self.venue_id
    }

    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    #[must_use]
    pub const fn size(&self) -> Decimal {
        self.size
    }

    /// Whether the requested size was downgraded to the configured ceiling.
    #[must_use]
    pub const fn capped(&self) -> bool {
        self.capped
    }

    #[must_use]
    pub const fn status(&self) -> &OrderStatus {
        &self.status
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record the start of one submission attempt.
    pub(crate) fn begin_attempt(&mut self) {
        self.attempts += 1;
    }

    pub(crate) fn mark_submitted(&mut self, order_id: String) {
        self.status = OrderStatus::Submitted { order_id };
    }

    pub(crate) fn mark_filled(&mut self, order_id: String) {
        self.status = OrderStatus::Filled { order_id };
    }

    pub(crate) fn mark_failed(&mut self, error: ConnectorError) {
        self.status = OrderStatus::Failed { error };
    }

    /// Re-enter `Pending` ahead of a bounded retry.
    pub(crate) fn reset_for_retry(&mut self) {
        self.status = OrderStatus::Pending;
    }
}

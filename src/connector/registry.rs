//! Registry of venue connectors.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::Connector;
use crate::domain::VenueId;

/// Holds one connector per venue, keyed and iterated in venue order.
///
/// Built once at startup; the aggregator fans out over `all()` and the
/// router looks venues up by id when dispatching orders.
#[derive(Default)]
pub struct ConnectorRegistry {
    connectors: BTreeMap<VenueId, Arc<dyn Connector>>,
}

impl ConnectorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector under its own venue id.
    ///
    /// A second registration for the same venue replaces the first.
    pub fn register(&mut self, connector: Arc<dyn Connector>) {
        self.connectors
            .insert(connector.venue_id().clone(), connector);
    }

    #[must_use]
    pub fn get(&self, venue: &VenueId) -> Option<Arc<dyn Connector>> {
        self.connectors.get(venue).cloned()
    }

    /// All connectors in ascending venue order.
    pub fn all(&self) -> impl Iterator<Item = (&VenueId, &Arc<dyn Connector>)> {
        self.connectors.iter()
    }

    #[must_use]
    pub fn venue_ids(&self) -> Vec<VenueId> {
        self.connectors.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

//! Reconciled cross-venue market view.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{Symbol, VenueId};
use super::quote::Quote;
use crate::error::ConnectorError;

/// Why a venue was excluded from a cycle's snapshot.
///
/// Kept on the snapshot so downstream consumers can audit exactly which
/// venues were reachable when a decision was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueFailure {
    pub venue_id: VenueId,
    pub error: ConnectorError,
}

impl VenueFailure {
    #[must_use]
    pub const fn new(venue_id: VenueId, error: ConnectorError) -> Self {
        Self { venue_id, error }
    }
}

/// Per-symbol reconciliation of all responding venues for one poll cycle.
///
/// Built fresh every cycle and never mutated afterwards; concurrent
/// evaluators read the same immutable view. Quotes are keyed by venue in
/// a `BTreeMap` so iteration order is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    symbol: Symbol,
    quotes: BTreeMap<VenueId, Quote>,
    best_bid_venue: Option<VenueId>,
    best_ask_venue: Option<VenueId>,
    spread_pct: Option<Decimal>,
    failures: Vec<VenueFailure>,
    as_of: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Reconcile a non-empty set of quotes into a snapshot.
    ///
    /// Best-bid selection picks the numerically highest price and
    /// best-ask the lowest; an exact price tie breaks to the
    /// lexicographically smallest `VenueId`, which the `BTreeMap`
    /// iteration order provides for free. `spread_pct` is left undefined
    /// (not zero) unless at least two distinct venues responded.
    #[must_use]
    pub fn from_quotes(
        symbol: Symbol,
        quotes: Vec<Quote>,
        failures: Vec<VenueFailure>,
        as_of: DateTime<Utc>,
    ) -> Self {
        let quotes: BTreeMap<VenueId, Quote> = quotes
            .into_iter()
            .map(|q| (q.venue_id().clone(), q))
            .collect();

        let mut best_bid: Option<(&VenueId, Decimal)> = None;
        let mut best_ask: Option<(&VenueId, Decimal)> = None;

        // Ascending venue order, strict comparisons: the first venue seen
        // at a given price wins the tie.
        for (venue, quote) in &quotes {
            let price = quote.price();
            if best_bid.map_or(true, |(_, p)| price > p) {
                best_bid = Some((venue, price));
            }
            if best_ask.map_or(true, |(_, p)| price < p) {
                best_ask = Some((venue, price));
            }
        }

        let spread_pct = if quotes.len() >= 2 {
            match (best_bid, best_ask) {
                (Some((_, bid)), Some((_, ask))) if !bid.is_zero() => {
                    Some((ask - bid) / bid * Decimal::ONE_HUNDRED)
                }
                _ => None,
            }
        } else {
            None
        };

        let best_bid_venue = best_bid.map(|(v, _)| v.clone());
        let best_ask_venue = best_ask.map(|(v, _)| v.clone());

        Self {
            symbol,
            quotes,
            best_bid_venue,
            best_ask_venue,
            spread_pct,
            failures,
            as_of,
        }
    }

    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    #[must_use]
    pub const fn quotes(&self) -> &BTreeMap<VenueId, Quote> {
        &self.quotes
    }

    /// Number of venues that responded this cycle.
    #[must_use]
    pub fn venue_count(&self) -> usize {
        self.quotes.len()
    }

    /// Venue quoting the highest price (where a sell fills best).
    #[must_use]
    pub const fn best_bid_venue(&self) -> Option<&VenueId> {
        self.best_bid_venue.as_ref()
    }

    /// Venue quoting the lowest price (where a buy fills best).
    #[must_use]
    pub const fn best_ask_venue(&self) -> Option<&VenueId> {
        self.best_ask_venue.as_ref()
    }

    /// Cross-venue spread in percent of the best bid.
    ///
    /// `None` when fewer than two venues responded; a negative value
    /// means the cheapest venue sits below the dearest one.
    #[must_use]
    pub const fn spread_pct(&self) -> Option<Decimal> {
        self.spread_pct
    }

    /// Venues excluded from this cycle, with the reason each was dropped.
    #[must_use]
    pub fn failures(&self) -> &[VenueFailure] {
        &self.failures
    }

    #[must_use]
    pub const fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    #[must_use]
    pub fn quote_for(&self, venue: &VenueId) -> Option<&Quote> {
        self.quotes.get(venue)
    }

    /// Reference price for movement tracking: the best-bid venue's quote.
    #[must_use]
    pub fn reference_price(&self) -> Option<Decimal> {
        self.best_bid_venue
            .as_ref()
            .and_then(|v| self.quotes.get(v))
            .map(Quote::price)
    }
}

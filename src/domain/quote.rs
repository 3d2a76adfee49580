//! Ticker quotes and trade records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{Symbol, VenueId};
use super::intent::Side;

/// A single venue's ticker for one symbol, captured once per poll cycle.
///
/// Immutable once produced; the aggregator replaces quotes wholesale each
/// cycle rather than editing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    venue_id: VenueId,
    symbol: Symbol,
    price: Decimal,
    volume_24h: Decimal,
    high_24h: Decimal,
    low_24h: Decimal,
    change_pct: Decimal,
    observed_at: DateTime<Utc>,
}

impl Quote {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub const fn new(
        venue_id: VenueId,
        symbol: Symbol,
        price: Decimal,
        volume_24h: Decimal,
        high_24h: Decimal,
        low_24h: Decimal,
        change_pct: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            venue_id,
            symbol,
            price,
            volume_24h,
            high_24h,
            low_24h,
            change_pct,
            observed_at,
        }
    }

    #[must_use]
    pub const fn venue_id(&self) -> &VenueId {
        &self.venue_id
    }

    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Last traded price in the venue's native quote currency.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    #[must_use]
    pub const fn volume_24h(&self) -> Decimal {
        self.volume_24h
    }

    #[must_use]
    pub const fn high_24h(&self) -> Decimal {
        self.high_24h
    }

    #[must_use]
    pub const fn low_24h(&self) -> Decimal {
        self.low_24h
    }

    /// 24h price change in percent, signed.
    #[must_use]
    pub const fn change_pct(&self) -> Decimal {
        self.change_pct
    }

    #[must_use]
    pub const fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// 24h high/low range relative to the low, in percent.
    ///
    /// Zero when the low is zero (a venue reporting no range).
    #[must_use]
    pub fn range_pct(&self) -> Decimal {
        if self.low_24h.is_zero() {
            return Decimal::ZERO;
        }
        (self.high_24h - self.low_24h) / self.low_24h * Decimal::ONE_HUNDRED
    }
}

/// One executed trade reported by a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub price: Decimal,
    pub size: Decimal,
    pub side: Side,
    pub executed_at: DateTime<Utc>,
}

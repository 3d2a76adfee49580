//! Builders for domain primitives used across tests.
//!
//! Concise factory functions for quotes, snapshots, intents and
//! decisions so tests focus on assertions rather than construction
//! boilerplate.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{
    Decision, MarketSnapshot, Quote, Side, Signal, Symbol, TradingIntent, Verdict, VenueId,
};

/// A quote with a flat 24h history around `price`.
pub fn quote(venue: &VenueId, symbol: &Symbol, price: Decimal) -> Quote {
    Quote::new(
        venue.clone(),
        symbol.clone(),
        price,
        dec!(100),
        price * dec!(1.02),
        price * dec!(0.98),
        Decimal::ZERO,
        Utc::now(),
    )
}

/// A quote with an explicit signed 24h change.
pub fn quote_with_change(
    venue: &VenueId,
    symbol: &Symbol,
    price: Decimal,
    change_pct: Decimal,
) -> Quote {
    Quote::new(
        venue.clone(),
        symbol.clone(),
        price,
        dec!(100),
        price * dec!(1.02),
        price * dec!(0.98),
        change_pct,
        Utc::now(),
    )
}

/// Snapshot over `(venue, price)` pairs for one symbol, no failures.
pub fn snapshot(symbol: &Symbol, prices: &[(&str, Decimal)]) -> MarketSnapshot {
    let quotes = prices
        .iter()
        .map(|(venue, price)| quote(&VenueId::from(*venue), symbol, *price))
        .collect();
    MarketSnapshot::from_quotes(symbol.clone(), quotes, Vec::new(), Utc::now())
}

/// A buy intent with the given confidence, claiming a momentum signal.
pub fn buy_intent(symbol: &Symbol, size: Decimal, confidence: f64) -> TradingIntent {
    TradingIntent::new(
        "test-strategy",
        symbol.clone(),
        Side::Buy,
        size,
        confidence,
        "test rationale",
        vec![Signal::Momentum, Signal::Volatility],
    )
}

/// An approved decision wrapping `intent`.
pub fn approved(intent: TradingIntent) -> Decision {
    Decision::new(intent, Verdict::Approve, "approved by test")
}

pub fn symbol(s: &str) -> Symbol {
    Symbol::from(s)
}

pub fn venue(v: &str) -> VenueId {
    VenueId::from(v)
}

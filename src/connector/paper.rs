//! In-process simulated venue.
//!
//! Serves tickers, books and trades derived from configured base prices
//! with a little random walk on top, and accepts paper orders
//! unconditionally. This is what the engine runs against when no real
//! venue is configured, mirroring a demo/testnet exchange account.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::{Connector, TradeMode};
use crate::domain::{
    ExecutionAck, OrderBookSnapshot, PriceLevel, Quote, Side, Symbol, TradeRecord, VenueId,
};
use crate::error::ConnectorError;

/// Maximum per-poll price drift, in percent.
const DRIFT_PCT: f64 = 0.2;

/// A simulated venue with a fixed symbol universe.
pub struct PaperConnector {
    venue_id: VenueId,
    base_prices: HashMap<Symbol, Decimal>,
    // Current walked price per symbol; drifts a little on every ticker poll.
    prices: Mutex<HashMap<Symbol, Decimal>>,
}

impl PaperConnector {
    #[must_use]
    pub fn new(venue_id: VenueId, base_prices: HashMap<Symbol, Decimal>) -> Self {
        Self {
            venue_id,
            prices: Mutex::new(base_prices.clone()),
            base_prices,
        }
    }

    /// Builder-style helper for tests and demos.
    #[must_use]
    pub fn with_price(venue_id: impl Into<VenueId>, symbol: impl Into<Symbol>, price: Decimal) -> Self {
        let mut base = HashMap::new();
        base.insert(symbol.into(), price);
        Self::new(venue_id.into(), base)
    }

    fn walked_price(&self, symbol: &Symbol) -> Result<Decimal, ConnectorError> {
        let mut prices = self.prices.lock();
        let price = prices
            .get_mut(symbol)
            .ok_or_else(|| ConnectorError::InvalidSymbol {
                symbol: symbol.to_string(),
            })?;

        let drift = rand::thread_rng().gen_range(-DRIFT_PCT..=DRIFT_PCT) / 100.0;
        let factor = Decimal::from_f64(1.0 + drift).unwrap_or(Decimal::ONE);
        *price = (*price * factor).round_dp(2);
        Ok(*price)
    }

    fn base_price(&self, symbol: &Symbol) -> Result<Decimal, ConnectorError> {
        self.base_prices
            .get(symbol)
            .copied()
            .ok_or_else(|| ConnectorError::InvalidSymbol {
                symbol: symbol.to_string(),
            })
    }
}

#[async_trait]
impl Connector for PaperConnector {
    fn venue_id(&self) -> &VenueId {
        &self.venue_id
    }

    async fn get_ticker(
        &self,
        symbol: &Symbol,
        _deadline: Duration,
    ) -> Result<Quote, ConnectorError> {
        let price = self.walked_price(symbol)?;
        let base = self.base_price(symbol)?;

        let change_pct = if base.is_zero() {
            Decimal::ZERO
        } else {
            ((price - base) / base * Decimal::ONE_HUNDRED).round_dp(3)
        };

        Ok(Quote::new(
            self.venue_id.clone(),
            symbol.clone(),
            price,
            dec!(250) + price.round_dp(0) / dec!(100),
            price * dec!(1.01),
            price * dec!(0.99),
            change_pct,
            Utc::now(),
        ))
    }

    async fn get_orderbook(
        &self,
        symbol: &Symbol,
        depth: usize,
        _deadline: Duration,
    ) -> Result<OrderBookSnapshot, ConnectorError> {
        let mid = self.walked_price(symbol)?;
        let step = (mid / dec!(1000)).round_dp(2).max(dec!(0.01));

        let mut bids = Vec::with_capacity(depth);
        let mut asks = Vec::with_capacity(depth);
        for i in 0..depth {
            let offset = step * Decimal::from(i as u64 + 1);
            bids.push(PriceLevel::new(mid - offset, dec!(0.5)));
            asks.push(PriceLevel::new(mid + offset, dec!(0.5)));
        }

        Ok(OrderBookSnapshot::new(
            self.venue_id.clone(),
            symbol.clone(),
            bids,
            asks,
            Utc::now(),
        ))
    }

    async fn get_trades(
        &self,
        symbol: &Symbol,
        limit: usize,
        _deadline: Duration,
    ) -> Result<Vec<TradeRecord>, ConnectorError> {
        let price = self.walked_price(symbol)?;
        let now = Utc::now();

        Ok((0..limit)
            .map(|i| TradeRecord {
                price,
                size: dec!(0.1),
                side: if i % 2 == 0 { Side::Buy } else { Side::Sell },
                executed_at: now - chrono::Duration::seconds(i as i64),
            })
            .collect())
    }

    async fn submit_order(
        &self,
        symbol: &Symbol,
        side: Side,
        size: Decimal,
        mode: TradeMode,
        _deadline: Duration,
    ) -> Result<ExecutionAck, ConnectorError> {
        // Validates the symbol even for paper fills.
        let _ = self.base_price(symbol)?;

        match mode {
            TradeMode::Paper => {
                tracing::debug!(
                    venue = %self.venue_id,
                    symbol = %symbol,
                    side = %side,
                    size = %size,
                    "Paper order filled"
                );
                Ok(ExecutionAck {
                    order_id: format!("paper-{}", Uuid::new_v4()),
                    filled: true,
                })
            }
            TradeMode::Live => Err(ConnectorError::Rejected(
                "paper venue cannot accept live orders".to_string(),
            )),
        }
    }
}

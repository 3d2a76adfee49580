//! Scriptable mock venue connector.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::connector::{Connector, TradeMode};
use crate::domain::{
    ExecutionAck, OrderBookSnapshot, Quote, Side, Symbol, TradeRecord, VenueId,
};
use crate::error::ConnectorError;

/// One recorded order submission.
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    pub symbol: Symbol,
    pub side: Side,
    pub size: Decimal,
    pub mode: TradeMode,
}

/// A venue whose every response is scripted by the test.
///
/// Ticker responses are fixed per symbol; submissions pop from a script
/// queue (defaulting to an immediate fill once the queue is empty) and
/// are recorded so tests can assert how many reached the venue.
pub struct MockConnector {
    venue_id: VenueId,
    quotes: HashMap<Symbol, Result<Quote, ConnectorError>>,
    // Successive ticker prices; the last one repeats forever.
    price_sequences: Mutex<HashMap<Symbol, VecDeque<Decimal>>>,
    latency: Option<Duration>,
    submit_script: Mutex<VecDeque<Result<ExecutionAck, ConnectorError>>>,
    submissions: Mutex<Vec<RecordedSubmission>>,
}

impl MockConnector {
    #[must_use]
    pub fn new(venue_id: impl Into<VenueId>) -> Self {
        Self {
            venue_id: venue_id.into(),
            quotes: HashMap::new(),
            price_sequences: Mutex::new(HashMap::new()),
            latency: None,
            submit_script: Mutex::new(VecDeque::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Serve a fixed price for a symbol.
    #[must_use]
    pub fn with_price(mut self, symbol: impl Into<Symbol>, price: Decimal) -> Self {
        let symbol = symbol.into();
        let quote = super::domain::quote(&self.venue_id, &symbol, price);
        self.quotes.insert(symbol, Ok(quote));
        self
    }

    /// Serve a full custom quote for a symbol.
    #[must_use]
    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quotes.insert(quote.symbol().clone(), Ok(quote));
        self
    }

    /// Fail every ticker call for a symbol.
    #[must_use]
    pub fn with_failure(mut self, symbol: impl Into<Symbol>, error: ConnectorError) -> Self {
        self.quotes.insert(symbol.into(), Err(error));
        self
    }

    /// Serve successive prices across ticker polls; the final price
    /// repeats once the sequence is exhausted.
    #[must_use]
    pub fn with_price_sequence(
        mut self,
        symbol: impl Into<Symbol>,
        prices: Vec<Decimal>,
    ) -> Self {
        let symbol = symbol.into();
        if let Some(first) = prices.first() {
            let quote = super::domain::quote(&self.venue_id, &symbol, *first);
            self.quotes.insert(symbol.clone(), Ok(quote));
        }
        self.price_sequences.lock().insert(symbol, prices.into());
        self
    }

    /// Delay every call; combined with a shorter per-call timeout this
    /// simulates a straggler venue.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Script the outcome of successive submissions, first to last.
    #[must_use]
    pub fn with_submit_script(
        self,
        script: Vec<Result<ExecutionAck, ConnectorError>>,
    ) -> Self {
        *self.submit_script.lock() = script.into();
        self
    }

    /// Submissions that reached this venue, in order.
    #[must_use]
    pub fn submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions.lock().clone()
    }

    async fn apply_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl Connector for MockConnector {
    fn venue_id(&self) -> &VenueId {
        &self.venue_id
    }

    async fn get_ticker(
        &self,
        symbol: &Symbol,
        _deadline: Duration,
    ) -> Result<Quote, ConnectorError> {
        self.apply_latency().await;

        let sequenced = {
            let mut sequences = self.price_sequences.lock();
            sequences.get_mut(symbol).and_then(|prices| {
                if prices.len() > 1 {
                    prices.pop_front()
                } else {
                    prices.front().copied()
                }
            })
        };
        if let Some(price) = sequenced {
            return Ok(super::domain::quote(&self.venue_id, symbol, price));
        }

        match self.quotes.get(symbol) {
            Some(result) => result.clone(),
            None => Err(ConnectorError::InvalidSymbol {
                symbol: symbol.to_string(),
            }),
        }
    }

    async fn get_orderbook(
        &self,
        symbol: &Symbol,
        _depth: usize,
        deadline: Duration,
    ) -> Result<OrderBookSnapshot, ConnectorError> {
        let quote = self.get_ticker(symbol, deadline).await?;
        let mid = quote.price();
        Ok(OrderBookSnapshot::new(
            self.venue_id.clone(),
            symbol.clone(),
            vec![crate::domain::PriceLevel::new(mid - dec!(0.5), dec!(1))],
            vec![crate::domain::PriceLevel::new(mid + dec!(0.5), dec!(1))],
            Utc::now(),
        ))
    }

    async fn get_trades(
        &self,
        symbol: &Symbol,
        limit: usize,
        deadline: Duration,
    ) -> Result<Vec<TradeRecord>, ConnectorError> {
        let quote = self.get_ticker(symbol, deadline).await?;
        Ok((0..limit)
            .map(|_| TradeRecord {
                price: quote.price(),
                size: dec!(0.1),
                side: Side::Buy,
                executed_at: Utc::now(),
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
        self.apply_latency().await;
        self.submissions.lock().push(RecordedSubmission {
            symbol: symbol.clone(),
            side,
            size,
            mode,
        });

        self.submit_script.lock().pop_front().unwrap_or_else(|| {
            Ok(ExecutionAck {
                order_id: format!("mock-{}", self.submissions.lock().len()),
                filled: true,
            })
        })
    }
}

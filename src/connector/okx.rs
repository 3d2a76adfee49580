//! OKX venue adapter (public market data).
//!
//! Talks to the v5 public REST API. Responses arrive in a
//! `{code, msg, data}` envelope with every number serialized as a
//! string; `code` other than `"0"` is a venue-reported failure.
//! Live submission needs signed requests and is therefore rejected
//! here; paper submissions fill locally, as with BTC Markets.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use super::{with_deadline, Connector, TradeMode};
use crate::domain::{
    ExecutionAck, OrderBookSnapshot, PriceLevel, Quote, Side, Symbol, TradeRecord, VenueId,
};
use crate::error::ConnectorError;

const DEFAULT_API_URL: &str = "https://www.okx.com";

/// OKX error code for an unknown instrument.
const CODE_UNKNOWN_INSTRUMENT: &str = "51001";

pub struct OkxConnector {
    venue_id: VenueId,
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: String,
    #[serde(default)]
    msg: String,
    // `default = "Vec::new"` keeps the derive from demanding `T: Default`.
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TickerData {
    #[serde(with = "rust_decimal::serde::str")]
    last: Decimal,
    #[serde(with = "rust_decimal::serde::str", rename = "open24h")]
    open_24h: Decimal,
    #[serde(with = "rust_decimal::serde::str", rename = "high24h")]
    high_24h: Decimal,
    #[serde(with = "rust_decimal::serde::str", rename = "low24h")]
    low_24h: Decimal,
    #[serde(with = "rust_decimal::serde::str", rename = "vol24h")]
    vol_24h: Decimal,
}

#[derive(Debug, Deserialize)]
struct BookData {
    bids: Vec<Vec<String>>,
    asks: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TradeData {
    #[serde(with = "rust_decimal::serde::str")]
    px: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    sz: Decimal,
    side: String,
    ts: String,
}

impl OkxConnector {
    #[must_use]
    pub fn new(venue_id: VenueId) -> Self {
        Self::with_base_url(venue_id, DEFAULT_API_URL.to_string())
    }

    #[must_use]
    pub fn with_base_url(venue_id: VenueId, base_url: String) -> Self {
        Self {
            venue_id,
            client: Client::new(),
            base_url,
        }
    }

    /// Fetch one envelope and unwrap the venue-level error code.
    async fn get_data<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        symbol: &Symbol,
    ) -> Result<Vec<T>, ConnectorError> {
        let url = format!("{}{path}", self.base_url);
        debug!(venue = %self.venue_id, url = %url, "GET");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ConnectorError::Timeout { timeout_ms: 0 }
            } else {
                ConnectorError::Unavailable(e.to_string())
            }
        })?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ConnectorError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(ConnectorError::Unavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ConnectorError::Unavailable(format!("bad response body: {e}")))?;

        match envelope.code.as_str() {
            "0" => Ok(envelope.data),
            CODE_UNKNOWN_INSTRUMENT => Err(ConnectorError::InvalidSymbol {
                symbol: symbol.to_string(),
            }),
            code => Err(ConnectorError::Unavailable(format!(
                "venue error {code}: {}",
                envelope.msg
            ))),
        }
    }
}

fn parse_levels(raw: &[Vec<String>], depth: usize) -> Result<Vec<PriceLevel>, ConnectorError> {
    raw.iter()
        .take(depth)
        .map(|level| {
            // Book levels are [price, size, liquidated_orders, order_count].
            let (price, size) = match level.as_slice() {
                [price, size, ..] => (price, size),
                _ => {
                    return Err(ConnectorError::Unavailable(
                        "malformed book level".to_string(),
                    ))
                }
            };
            let price = Decimal::from_str(price)
                .map_err(|e| ConnectorError::Unavailable(format!("bad price level: {e}")))?;
            let size = Decimal::from_str(size)
                .map_err(|e| ConnectorError::Unavailable(format!("bad level size: {e}")))?;
            Ok(PriceLevel::new(price, size))
        })
        .collect()
}

#[async_trait]
impl Connector for OkxConnector {
    fn venue_id(&self) -> &VenueId {
        &self.venue_id
    }

    async fn get_ticker(
        &self,
        symbol: &Symbol,
        deadline: Duration,
    ) -> Result<Quote, ConnectorError> {
        let path = format!("/api/v5/market/ticker?instId={symbol}");
        let mut data: Vec<TickerData> =
            with_deadline(deadline, self.get_data(&path, symbol)).await?;

        let ticker = data.pop().ok_or_else(|| ConnectorError::InvalidSymbol {
            symbol: symbol.to_string(),
        })?;

        let change_pct = if ticker.open_24h.is_zero() {
            Decimal::ZERO
        } else {
            ((ticker.last - ticker.open_24h) / ticker.open_24h * Decimal::ONE_HUNDRED).round_dp(3)
        };

        Ok(Quote::new(
            self.venue_id.clone(),
            symbol.clone(),
            ticker.last,
            ticker.vol_24h,
            ticker.high_24h,
            ticker.low_24h,
            change_pct,
            Utc::now(),
        ))
    }

    async fn get_orderbook(
        &self,
        symbol: &Symbol,
        depth: usize,
        deadline: Duration,
    ) -> Result<OrderBookSnapshot, ConnectorError> {
        let path = format!("/api/v5/market/books?instId={symbol}&sz={depth}");
        let mut data: Vec<BookData> =
            with_deadline(deadline, self.get_data(&path, symbol)).await?;

        let book = data.pop().ok_or_else(|| ConnectorError::InvalidSymbol {
            symbol: symbol.to_string(),
        })?;

        super::reject_crossed(OrderBookSnapshot::new(
            self.venue_id.clone(),
            symbol.clone(),
            parse_levels(&book.bids, depth)?,
            parse_levels(&book.asks, depth)?,
            Utc::now(),
        ))
    }

    async fn get_trades(
        &self,
        symbol: &Symbol,
        limit: usize,
        deadline: Duration,
    ) -> Result<Vec<TradeRecord>, ConnectorError> {
        let path = format!("/api/v5/market/trades?instId={symbol}&limit={limit}");
        let data: Vec<TradeData> = with_deadline(deadline, self.get_data(&path, symbol)).await?;

        Ok(data
            .into_iter()
            .map(|t| {
                let millis = t.ts.parse::<i64>().unwrap_or_default();
                TradeRecord {
                    price: t.px,
                    size: t.sz,
                    side: if t.side == "buy" { Side::Buy } else { Side::Sell },
                    executed_at: chrono::DateTime::from_timestamp_millis(millis)
                        .unwrap_or_else(Utc::now),
                }
            })
            .collect())
    }

    async fn submit_order(
        &self,
        symbol: &Symbol,
        side: Side,
        size: Decimal,
        mode: TradeMode,
        deadline: Duration,
    ) -> Result<ExecutionAck, ConnectorError> {
        match mode {
            TradeMode::Paper => {
                let quote = self.get_ticker(symbol, deadline).await?;
                debug!(
                    venue = %self.venue_id,
                    symbol = %symbol,
                    side = %side,
                    size = %size,
                    price = %quote.price(),
                    "Paper order filled against live data"
                );
                Ok(ExecutionAck {
                    order_id: format!("paper-{}", Uuid::new_v4()),
                    filled: true,
                })
            }
            TradeMode::Live => Err(ConnectorError::Rejected(
                "live submission requires signed requests, no credentials configured".to_string(),
            )),
        }
    }
}

//! BTC Markets venue adapter (public market data, AUD pairs).
//!
//! Uses the public v3 REST API for tickers, order books and trades.
//! Order submission requires API credentials, which are out of scope
//! here: live submissions are rejected with a typed failure and paper
//! submissions are filled locally against live data.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
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

const DEFAULT_API_URL: &str = "https://api.btcmarkets.net";

pub struct BtcMarketsConnector {
    venue_id: VenueId,
    client: Client,
    base_url: String,
}

// The venue serializes all numbers as strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickerResponse {
    #[serde(with = "rust_decimal::serde::str")]
    last_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    volume24h: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    price24h: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    low24h: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    high24h: Decimal,
}

#[derive(Debug, Deserialize)]
struct OrderbookResponse {
    bids: Vec<(String, String)>,
    asks: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct TradeResponse {
    #[serde(with = "rust_decimal::serde::str")]
    price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
    timestamp: DateTime<Utc>,
    side: String,
}

fn parse_level(price: &str, size: &str) -> Result<PriceLevel, ConnectorError> {
    use std::str::FromStr;
    let price = Decimal::from_str(price)
        .map_err(|e| ConnectorError::Unavailable(format!("bad price level: {e}")))?;
    let size = Decimal::from_str(size)
        .map_err(|e| ConnectorError::Unavailable(format!("bad level size: {e}")))?;
    Ok(PriceLevel::new(price, size))
}

impl BtcMarketsConnector {
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

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        symbol: &Symbol,
    ) -> Result<T, ConnectorError> {
        let url = format!("{}{path}", self.base_url);
        debug!(venue = %self.venue_id, url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| map_transport_error(&e))?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(ConnectorError::RateLimited),
            s if s == StatusCode::BAD_REQUEST || s == StatusCode::NOT_FOUND => {
                return Err(ConnectorError::InvalidSymbol {
                    symbol: symbol.to_string(),
                })
            }
            s if !s.is_success() => {
                return Err(ConnectorError::Unavailable(format!("HTTP {s}")));
            }
            _ => {}
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ConnectorError::Unavailable(format!("bad response body: {e}")))
    }
}

fn map_transport_error(e: &reqwest::Error) -> ConnectorError {
    if e.is_timeout() {
        ConnectorError::Timeout { timeout_ms: 0 }
    } else {
        ConnectorError::Unavailable(e.to_string())
    }
}

fn parse_side(s: &str) -> Side {
    // BTC Markets reports the aggressor side as Bid/Ask.
    if s.eq_ignore_ascii_case("bid") {
        Side::Buy
    } else {
        Side::Sell
    }
}

#[async_trait]
impl Connector for BtcMarketsConnector {
    fn venue_id(&self) -> &VenueId {
        &self.venue_id
    }

    async fn get_ticker(
        &self,
        symbol: &Symbol,
        deadline: Duration,
    ) -> Result<Quote, ConnectorError> {
        let path = format!("/v3/markets/{symbol}/ticker");
        let ticker: TickerResponse =
            with_deadline(deadline, self.get_json(&path, symbol)).await?;

        // price24h is the absolute move over the trailing 24h.
        let open = ticker.last_price - ticker.price24h;
        let change_pct = if open.is_zero() {
            Decimal::ZERO
        } else {
            (ticker.price24h / open * Decimal::ONE_HUNDRED).round_dp(3)
        };

        Ok(Quote::new(
            self.venue_id.clone(),
            symbol.clone(),
            ticker.last_price,
            ticker.volume24h,
            ticker.high24h,
            ticker.low24h,
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
        let path = format!("/v3/markets/{symbol}/orderbook");
        let book: OrderbookResponse =
            with_deadline(deadline, self.get_json(&path, symbol)).await?;

        let bids = book
            .bids
            .iter()
            .take(depth)
            .map(|(price, size)| parse_level(price, size))
            .collect::<Result<Vec<_>, _>>()?;
        let asks = book
            .asks
            .iter()
            .take(depth)
            .map(|(price, size)| parse_level(price, size))
            .collect::<Result<Vec<_>, _>>()?;

        super::reject_crossed(OrderBookSnapshot::new(
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
        deadline: Duration,
    ) -> Result<Vec<TradeRecord>, ConnectorError> {
        let path = format!("/v3/markets/{symbol}/trades?limit={limit}");
        let trades: Vec<TradeResponse> =
            with_deadline(deadline, self.get_json(&path, symbol)).await?;

        Ok(trades
            .into_iter()
            .map(|t| TradeRecord {
                price: t.price,
                size: t.amount,
                side: parse_side(&t.side),
                executed_at: t.timestamp,
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
                // Validate the symbol against the live venue, then fill
                // locally at the current price.
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
                "live submission requires API credentials, none configured".to_string(),
            )),
        }
    }
}

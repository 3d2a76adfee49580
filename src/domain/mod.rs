//! Venue-agnostic domain types.
//!
//! Everything here is immutable once constructed (quotes, snapshots,
//! intents, decisions) or has its mutation confined to a single owner
//! (execution orders, advanced only by the router).

mod decision;
mod ids;
mod intent;
mod order;
mod order_book;
mod quote;
mod snapshot;

pub use decision::{Decision, Verdict};
pub use ids::{IntentId, Symbol, VenueId};
pub use intent::{Side, Signal, TradingIntent};
pub use order::{ExecutionAck, ExecutionOrder, OrderStatus};
pub use order_book::{OrderBookSnapshot, PriceLevel};
pub use quote::{Quote, TradeRecord};
pub use snapshot::{MarketSnapshot, VenueFailure};

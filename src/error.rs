use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Symbol, VenueId};

/// Failures a venue connector can return from a single call.
///
/// Every connector operation resolves to one of these instead of blocking
/// indefinitely; the aggregator and router decide what is retryable.
/// Serializable because snapshots carry them as per-venue audit tags.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectorError {
    #[error("venue unavailable: {0}")]
    Unavailable(String),

    #[error("rate limited by venue")]
    RateLimited,

    #[error("invalid symbol '{symbol}'")]
    InvalidSymbol { symbol: String },

    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl ConnectorError {
    /// Whether a later attempt at the same call can reasonably succeed.
    ///
    /// `Rejected` and `InvalidSymbol` are terminal; resubmitting them
    /// would produce the same answer.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::RateLimited)
    }
}

/// Aggregation-level failures, scoped to one symbol and one cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    /// Every registered venue failed or timed out for this symbol.
    #[error("no venue produced a quote for {symbol}")]
    NoLiquiditySource { symbol: Symbol },
}

/// Routing and execution failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("decision for intent {intent_id} is not approved")]
    NotApproved { intent_id: String },

    #[error("snapshot has no venue to fill a {side} of {symbol}")]
    NoVenue { symbol: Symbol, side: &'static str },

    #[error("no connector registered for venue '{0}'")]
    UnknownVenue(VenueId),
}

/// Configuration-related errors with structured variants.
///
/// Any of these is fatal at startup; no cycle runs on an invalid config.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

pub type Result<T> = std::result::Result<T, Error>;

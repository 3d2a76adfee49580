//! Trading intents proposed by strategy evaluators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{IntentId, Symbol};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A market condition an evaluator claims supports its intent.
///
/// The conductor re-checks the claimed signals against the snapshot that
/// produced the intent; an intent whose signals cannot be corroborated is
/// never approved, regardless of confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Cross-venue price divergence exceeds the corroboration band.
    SpreadDivergence,
    /// 24h price change points the same way as the intent's side.
    Momentum,
    /// 24h high/low range is wide enough to trade.
    Volatility,
}

impl Signal {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SpreadDivergence => "spread_divergence",
            Self::Momentum => "momentum",
            Self::Volatility => "volatility",
        }
    }
}

/// A proposed trade produced by one evaluator from one snapshot.
///
/// Read-only downstream of the evaluator; the conductor and router never
/// alter it. Carries its own idempotency key from birth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingIntent {
    id: IntentId,
    strategy_id: String,
    symbol: Symbol,
    side: Side,
    size: Decimal,
    confidence: f64,
    rationale: String,
    signals: Vec<Signal>,
}

impl TradingIntent {
    /// Create an intent with a freshly minted [`IntentId`].
    ///
    /// Confidence is clamped into `[0, 1]`.
    #[must_use]
    pub fn new(
        strategy_id: impl Into<String>,
        symbol: Symbol,
        side: Side,
        size: Decimal,
        confidence: f64,
        rationale: impl Into<String>,
        signals: Vec<Signal>,
    ) -> Self {
        Self::with_id(
            IntentId::generate(),
            strategy_id,
            symbol,
            side,
            size,
            confidence,
            rationale,
            signals,
        )
    }

    /// Create an intent with an explicit key.
    ///
    /// Used when replaying a previously recorded intent; the router
    /// dedupes on this key.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn with_id(
        id: IntentId,
        strategy_id: impl Into<String>,
        symbol: Symbol,
        side: Side,
        size: Decimal,
        confidence: f64,
        rationale: impl Into<String>,
        signals: Vec<Signal>,
    ) -> Self {
        Self {
            id,
            strategy_id: strategy_id.into(),
            symbol,
            side,
            size,
            confidence: confidence.clamp(0.0, 1.0),
            rationale: rationale.into(),
            signals,
        }
    }

    #[must_use]
    pub const fn id(&self) -> IntentId {
        self.id
    }

    #[must_use]
    pub fn strategy_id(&self) -> &str {
        &self.strategy_id
    }

    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    #[must_use]
    pub const fn size(&self) -> Decimal {
        self.size
    }

    /// Evaluator confidence in `[0, 1]`.
    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    #[must_use]
    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    /// Signals the evaluator claims corroborate this intent.
    #[must_use]
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }
}

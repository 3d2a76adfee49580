//! Decision conductor: evaluator fan-out and the approval gate.
//!
//! Evaluators are the strategy plug-in boundary: anything implementing
//! [`Evaluator`] can propose intents, and the conductor imposes no
//! strategy-specific logic on them. It runs all evaluators concurrently
//! against one immutable snapshot, then gates each intent into a
//! [`Decision`] whose `reason` records which condition drove the
//! verdict. The conductor holds no state across cycles; strategies that
//! want history must carry it themselves.

pub mod evaluators;

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::domain::{Decision, MarketSnapshot, Side, Signal, TradingIntent, Verdict};
use crate::error::{ConfigError, Result};

/// A pluggable strategy evaluator.
///
/// Must be pure with respect to the snapshot: evaluators share no
/// mutable state and may run concurrently. Returning `None` means the
/// strategy sees nothing to do this cycle.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Identifier used in intents, decisions and logs.
    fn strategy_id(&self) -> &'static str;

    /// Propose at most one intent for this snapshot.
    async fn evaluate(&self, snapshot: &MarketSnapshot) -> Option<TradingIntent>;
}

/// Gate thresholds. All validated at startup.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Minimum confidence for approval (inclusive).
    pub approval_threshold: f64,
    /// Confidence at or above this (but failing approval) holds instead
    /// of rejecting.
    pub hold_threshold: f64,
    /// Minimum |cross-venue spread| for the spread-divergence signal.
    pub corroboration_spread_pct: Decimal,
    /// Minimum 24h range for the volatility signal.
    pub corroboration_volatility_pct: Decimal,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            approval_threshold: 0.6,
            hold_threshold: 0.4,
            corroboration_spread_pct: dec!(0.1),
            corroboration_volatility_pct: dec!(1.0),
        }
    }
}

impl GateConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.approval_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "conductor.approval_threshold",
                reason: "must be within [0, 1]".to_string(),
            }
            .into());
        }
        if !(0.0..=1.0).contains(&self.hold_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "conductor.hold_threshold",
                reason: "must be within [0, 1]".to_string(),
            }
            .into());
        }
        if self.hold_threshold > self.approval_threshold {
            return Err(ConfigError::InvalidValue {
                field: "conductor.hold_threshold",
                reason: "must not exceed approval_threshold".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

pub struct Conductor {
    evaluators: Vec<Arc<dyn Evaluator>>,
    gate: GateConfig,
}

impl Conductor {
    #[must_use]
    pub fn new(evaluators: Vec<Arc<dyn Evaluator>>, gate: GateConfig) -> Self {
        Self { evaluators, gate }
    }

    #[must_use]
    pub fn evaluator_ids(&self) -> Vec<&'static str> {
        self.evaluators.iter().map(|e| e.strategy_id()).collect()
    }

    /// Run every evaluator against the snapshot and gate the results.
    ///
    /// All evaluators see the identical immutable snapshot; their order
    /// in the output follows registration order.
    pub async fn conduct(&self, snapshot: &MarketSnapshot) -> Vec<Decision> {
        let intents = join_all(
            self.evaluators
                .iter()
                .map(|evaluator| evaluator.evaluate(snapshot)),
        )
        .await;

        intents
            .into_iter()
            .flatten()
            .map(|intent| self.gate(snapshot, intent))
            .collect()
    }

    /// Apply the gate policy to one intent.
    fn gate(&self, snapshot: &MarketSnapshot, intent: TradingIntent) -> Decision {
        let confidence = intent.confidence();
        let corroboration = self.corroborate(snapshot, &intent);

        let (verdict, reason) = if confidence >= self.gate.approval_threshold {
            match corroboration {
                Some(signal) => (
                    Verdict::Approve,
                    format!(
                        "confidence {confidence:.2} >= {:.2} and {} signal corroborated by snapshot",
                        self.gate.approval_threshold,
                        signal.as_str(),
                    ),
                ),
                None => (
                    Verdict::Hold,
                    format!(
                        "confidence {confidence:.2} sufficient but no claimed signal corroborated by snapshot"
                    ),
                ),
            }
        } else if confidence >= self.gate.hold_threshold {
            (
                Verdict::Hold,
                format!(
                    "confidence {confidence:.2} below approval threshold {:.2}, within hold band",
                    self.gate.approval_threshold,
                ),
            )
        } else {
            (
                Verdict::Reject,
                format!(
                    "confidence {confidence:.2} below hold threshold {:.2}",
                    self.gate.hold_threshold,
                ),
            )
        };

        debug!(
            strategy = intent.strategy_id(),
            symbol = %intent.symbol(),
            side = %intent.side(),
            verdict = %verdict,
            reason = %reason,
            "Gated intent"
        );
        Decision::new(intent, verdict, reason)
    }

    /// Re-check the intent's claimed signals against the snapshot.
    ///
    /// Returns the first signal the market data actually backs, in the
    /// order the evaluator listed them.
    fn corroborate(&self, snapshot: &MarketSnapshot, intent: &TradingIntent) -> Option<Signal> {
        intent
            .signals()
            .iter()
            .copied()
            .find(|signal| match signal {
                Signal::SpreadDivergence => snapshot
                    .spread_pct()
                    .map_or(false, |s| s.abs() >= self.gate.corroboration_spread_pct),
                Signal::Momentum => snapshot.quotes().values().any(|q| match intent.side() {
                    Side::Buy => q.change_pct() > Decimal::ZERO,
                    Side::Sell => q.change_pct() < Decimal::ZERO,
                }),
                Signal::Volatility => snapshot
                    .quotes()
                    .values()
                    .any(|q| q.range_pct() >= self.gate.corroboration_volatility_pct),
            })
    }
}

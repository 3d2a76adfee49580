//! Built-in strategy evaluators.
//!
//! These are ordinary [`Evaluator`] implementations with no special
//! standing; they exist so a default configuration trades something and
//! as worked examples of the plug-in boundary.

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::Evaluator;
use crate::domain::{MarketSnapshot, Side, Signal, TradingIntent};

/// Strategy ids the configuration may enable.
pub const BUILTIN_STRATEGY_IDS: &[&str] = &["momentum", "spread_reversion"];

/// Trades in the direction of the average 24h move across venues.
pub struct MomentumEvaluator {
    min_change_pct: Decimal,
    order_size: Decimal,
}

impl MomentumEvaluator {
    #[must_use]
    pub fn new(min_change_pct: Decimal, order_size: Decimal) -> Self {
        Self {
            min_change_pct,
            order_size,
        }
    }
}

impl Default for MomentumEvaluator {
    fn default() -> Self {
        Self::new(dec!(0.5), dec!(0.01))
    }
}

#[async_trait]
impl Evaluator for MomentumEvaluator {
    fn strategy_id(&self) -> &'static str {
        "momentum"
    }

    async fn evaluate(&self, snapshot: &MarketSnapshot) -> Option<TradingIntent> {
        let quotes = snapshot.quotes();
        if quotes.is_empty() {
            return None;
        }

        let sum: Decimal = quotes.values().map(|q| q.change_pct()).sum();
        let avg = sum / Decimal::from(quotes.len() as u64);

        let side = if avg >= self.min_change_pct {
            Side::Buy
        } else if avg <= -self.min_change_pct {
            Side::Sell
        } else {
            return None;
        };

        // Confidence grows with the move, saturating well before 1.0 so
        // the gate still has room to discriminate.
        let magnitude = avg.abs().to_f64().unwrap_or(0.0);
        let confidence = (0.5 + magnitude / 10.0).min(0.95);

        Some(TradingIntent::new(
            self.strategy_id(),
            snapshot.symbol().clone(),
            side,
            self.order_size,
            confidence,
            format!("average 24h change {avg:.3}% across {} venues", quotes.len()),
            vec![Signal::Momentum, Signal::Volatility],
        ))
    }
}

/// Buys the cheap venue when cross-venue prices diverge.
///
/// A wide (or inverted) cross-venue spread means at least one venue is
/// off-market; the reversion trade is to buy where the price is lowest.
pub struct SpreadReversionEvaluator {
    min_spread_pct: Decimal,
    order_size: Decimal,
}

impl SpreadReversionEvaluator {
    #[must_use]
    pub fn new(min_spread_pct: Decimal, order_size: Decimal) -> Self {
        Self {
            min_spread_pct,
            order_size,
        }
    }
}

impl Default for SpreadReversionEvaluator {
    fn default() -> Self {
        Self::new(dec!(0.25), dec!(0.01))
    }
}

#[async_trait]
impl Evaluator for SpreadReversionEvaluator {
    fn strategy_id(&self) -> &'static str {
        "spread_reversion"
    }

    async fn evaluate(&self, snapshot: &MarketSnapshot) -> Option<TradingIntent> {
        let spread = snapshot.spread_pct()?;
        if spread.abs() < self.min_spread_pct {
            return None;
        }

        let cheap_venue = snapshot.best_ask_venue()?;
        let magnitude = spread.abs().to_f64().unwrap_or(0.0);
        let confidence = (0.55 + magnitude / 5.0).min(0.95);

        Some(TradingIntent::new(
            self.strategy_id(),
            snapshot.symbol().clone(),
            Side::Buy,
            self.order_size,
            confidence,
            format!("cross-venue spread {spread:.3}%, cheapest venue {cheap_venue}"),
            vec![Signal::SpreadDivergence],
        ))
    }
}

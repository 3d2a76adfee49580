//! Gated verdicts on trading intents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::intent::TradingIntent;

/// Outcome of the conductor's gate policy for one intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Approve,
    Hold,
    Reject,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Approve => "approve",
            Self::Hold => "hold",
            Self::Reject => "reject",
        };
        f.write_str(s)
    }
}

/// One decision per intent, created only by the conductor.
///
/// The `reason` string is mandatory audit output: it names the condition
/// that drove the verdict so a later reader does not have to re-derive it
/// from thresholds and market data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    intent: TradingIntent,
    verdict: Verdict,
    reason: String,
    decided_at: DateTime<Utc>,
}

impl Decision {
    #[must_use]
    pub fn new(intent: TradingIntent, verdict: Verdict, reason: impl Into<String>) -> Self {
        Self {
            intent,
            verdict,
            reason: reason.into(),
            decided_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn intent(&self) -> &TradingIntent {
        &self.intent
    }

    #[must_use]
    pub const fn verdict(&self) -> Verdict {
        self.verdict
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    #[must_use]
    pub const fn decided_at(&self) -> DateTime<Utc> {
        self.decided_at
    }

    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self.verdict, Verdict::Approve)
    }
}

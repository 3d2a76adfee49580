//! Configuration loading and validation.
//!
//! All tunables arrive from a TOML file (plus `RUST_LOG` overrides for
//! logging). Validation runs once at startup and any failure is fatal
//! before the first cycle.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::conductor::evaluators::BUILTIN_STRATEGY_IDS;
use crate::conductor::GateConfig;
use crate::connector::TradeMode;
use crate::error::{ConfigError, Result};
use crate::monitor::MonitorConfig;
use crate::router::RouterConfig;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub conductor: ConductorConfig,
    #[serde(default)]
    pub router: RouterSection,
    pub monitor: MonitorSection,
    pub venues: Vec<VenueConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregationConfig {
    /// Deadline for one venue call within a cycle.
    #[serde(default = "default_per_call_timeout_ms")]
    pub per_call_timeout_ms: u64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            per_call_timeout_ms: default_per_call_timeout_ms(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConductorConfig {
    #[serde(default = "default_approval_threshold")]
    pub approval_threshold: f64,
    #[serde(default = "default_hold_threshold")]
    pub hold_threshold: f64,
    #[serde(default = "default_corroboration_spread_pct")]
    pub corroboration_spread_pct: Decimal,
    #[serde(default = "default_corroboration_volatility_pct")]
    pub corroboration_volatility_pct: Decimal,
    /// Evaluators to enable, by strategy id.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<String>,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            approval_threshold: default_approval_threshold(),
            hold_threshold: default_hold_threshold(),
            corroboration_spread_pct: default_corroboration_spread_pct(),
            corroboration_volatility_pct: default_corroboration_volatility_pct(),
            strategies: default_strategies(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterSection {
    #[serde(default = "default_size_ceiling")]
    pub size_ceiling: Decimal,
    #[serde(default = "default_max_retry_count")]
    pub max_retry_count: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_submit_timeout_ms")]
    pub submit_timeout_ms: u64,
    #[serde(default = "default_mode")]
    pub mode: TradeMode,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            size_ceiling: default_size_ceiling(),
            max_retry_count: default_max_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            submit_timeout_ms: default_submit_timeout_ms(),
            mode: default_mode(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSection {
    pub symbols: Vec<String>,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_alert_threshold_pct")]
    pub alert_threshold_pct: Decimal,
    /// Omit to run until cancelled.
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

/// One venue entry in the config file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VenueConfig {
    pub id: String,
    pub kind: VenueKind,
    /// Base prices for paper venues, keyed by symbol.
    #[serde(default)]
    pub base_prices: HashMap<String, Decimal>,
    /// Override the venue API URL (real venues only).
    #[serde(default)]
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueKind {
    Paper,
    BtcMarkets,
    Okx,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_per_call_timeout_ms() -> u64 {
    2000
}

fn default_approval_threshold() -> f64 {
    0.6
}

fn default_hold_threshold() -> f64 {
    0.4
}

fn default_corroboration_spread_pct() -> Decimal {
    Decimal::new(1, 1) // 0.1
}

fn default_corroboration_volatility_pct() -> Decimal {
    Decimal::ONE
}

fn default_strategies() -> Vec<String> {
    vec!["momentum".to_string(), "spread_reversion".to_string()]
}

fn default_size_ceiling() -> Decimal {
    Decimal::ONE
}

fn default_max_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    250
}

fn default_submit_timeout_ms() -> u64 {
    5000
}

fn default_mode() -> TradeMode {
    TradeMode::Paper
}

fn default_tick_interval_ms() -> u64 {
    5000
}

fn default_alert_threshold_pct() -> Decimal {
    Decimal::TWO
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.venues.is_empty() {
            return Err(ConfigError::MissingField { field: "venues" }.into());
        }
        let mut seen = std::collections::HashSet::new();
        for venue in &self.venues {
            if venue.id.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "venues.id",
                    reason: "venue id cannot be empty".to_string(),
                }
                .into());
            }
            if !seen.insert(venue.id.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "venues.id",
                    reason: format!("duplicate venue id '{}'", venue.id),
                }
                .into());
            }
            if venue.kind == VenueKind::Paper && venue.base_prices.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "venues.base_prices",
                    reason: format!("paper venue '{}' needs at least one base price", venue.id),
                }
                .into());
            }
        }
        if self.aggregation.per_call_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "aggregation.per_call_timeout_ms",
                reason: "must be positive".to_string(),
            }
            .into());
        }
        if self.conductor.strategies.is_empty() {
            return Err(ConfigError::MissingField {
                field: "conductor.strategies",
            }
            .into());
        }
        for name in &self.conductor.strategies {
            if !BUILTIN_STRATEGY_IDS.contains(&name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "conductor.strategies",
                    reason: format!(
                        "unknown strategy '{name}', expected one of {BUILTIN_STRATEGY_IDS:?}"
                    ),
                }
                .into());
            }
        }

        self.gate_config().validate()?;
        self.router_config().validate()?;
        self.monitor_config().validate()?;
        Ok(())
    }

    #[must_use]
    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            approval_threshold: self.conductor.approval_threshold,
            hold_threshold: self.conductor.hold_threshold,
            corroboration_spread_pct: self.conductor.corroboration_spread_pct,
            corroboration_volatility_pct: self.conductor.corroboration_volatility_pct,
        }
    }

    #[must_use]
    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            size_ceiling: self.router.size_ceiling,
            max_retry_count: self.router.max_retry_count,
            retry_backoff: Duration::from_millis(self.router.retry_backoff_ms),
            submit_timeout: Duration::from_millis(self.router.submit_timeout_ms),
            mode: self.router.mode,
        }
    }

    #[must_use]
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            symbols: self
                .monitor
                .symbols
                .iter()
                .map(|s| s.as_str().into())
                .collect(),
            tick_interval: Duration::from_millis(self.monitor.tick_interval_ms),
            per_call_timeout: Duration::from_millis(self.aggregation.per_call_timeout_ms),
            alert_threshold_pct: self.monitor.alert_threshold_pct,
            max_ticks: self.monitor.max_ticks,
        }
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

//! Lyrebird - multi-venue market data aggregation and decision-gated
//! execution.
//!
//! The pipeline polls several independent venues, reconciles their
//! quotes into one immutable view per symbol, runs that view through
//! pluggable strategy evaluators, gates the resulting intents, and
//! routes approved decisions to a paper/live execution path with
//! idempotency guarantees.
//!
//! Data flows strictly downstream:
//!
//! ```text
//! connector -> aggregator -> conductor -> router
//! ```
//!
//! with the [`monitor`] loop driving the cadence and owning
//! cancellation.
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with startup validation
//! - [`domain`] - venue-agnostic types: quotes, snapshots, intents,
//!   decisions, orders
//! - [`connector`] - venue adapter trait plus paper, BTC Markets and
//!   OKX implementations
//! - [`aggregator`] - concurrent fan-out and snapshot reconciliation
//! - [`conductor`] - evaluator boundary and the approval gate
//! - [`router`] - idempotent order routing with bounded retries
//! - [`monitor`] - the cancellable periodic loop
//! - [`error`] - error taxonomy for the crate
//!
//! # Example
//!
//! ```no_run
//! use lyrebird::conductor::evaluators::MomentumEvaluator;
//! use lyrebird::conductor::{Conductor, GateConfig};
//! use std::sync::Arc;
//!
//! let conductor = Conductor::new(
//!     vec![Arc::new(MomentumEvaluator::default())],
//!     GateConfig::default(),
//! );
//! ```

pub mod aggregator;
pub mod app;
pub mod cli;
pub mod conductor;
pub mod config;
pub mod connector;
pub mod domain;
pub mod error;
pub mod monitor;
pub mod router;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`connector`] - [`MockConnector`](connector::MockConnector), a
//!   scriptable venue: fixed quotes, injected failures, artificial
//!   latency, and a submission log for idempotency assertions.
//! - [`domain`] - builders for quotes, snapshots, intents and decisions.

pub mod connector;
pub mod domain;

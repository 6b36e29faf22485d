//! # Bracket Server
//!
//! HTTP front for [`bracket_engine`]: tournament registration, bracket
//! generation and match reporting over a JSON API.
//!
//! - [`api`]: Router, handlers and middleware
//! - [`config`]: Environment and CLI configuration
//! - [`logging`]: `tracing` subscriber setup
//! - [`metrics`]: Prometheus exporter and counters

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;

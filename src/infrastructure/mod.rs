//! Infrastructure layer modules
//!
//! This module contains shared infrastructure components:
//! - `config`: Endpoint and logging settings
//! - `error`: Unified error types
//! - `metrics`: Prometheus classification counters

pub mod config;
pub mod error;
pub mod metrics;

//! Prometheus metrics for delivery outcome classification.
//!
//! - Classified outcomes by provider and canonical kind
//! - Token rotations and evictions by provider

mod helpers;

pub use helpers::{encode_metrics, ClassificationMetrics};

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "pushgate";

lazy_static! {
    /// Failed-message records classified, by provider and outcome
    pub static ref CLASSIFIED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_classified_total", METRIC_PREFIX),
        "Total delivery outcomes classified",
        &["provider", "outcome"]
    ).unwrap();

    /// Replacement tokens reported by providers
    pub static ref TOKEN_UPDATES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_token_updates_total", METRIC_PREFIX),
        "Total destination tokens rotated by providers",
        &["provider"]
    ).unwrap();

    /// Tokens reported permanently invalid
    pub static ref TOKENS_EVICTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_tokens_evicted_total", METRIC_PREFIX),
        "Total destination tokens reported invalid",
        &["provider"]
    ).unwrap();
}

//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{CLASSIFIED_TOTAL, TOKENS_EVICTED_TOTAL, TOKEN_UPDATES_TOTAL};
use crate::delivery::{OutcomeKind, Provider};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording classification metrics
pub struct ClassificationMetrics;

impl ClassificationMetrics {
    /// Record one classified record
    pub fn record(provider: Provider, kind: OutcomeKind) {
        CLASSIFIED_TOTAL
            .with_label_values(&[provider.as_str(), kind.as_str()])
            .inc();
        match kind {
            OutcomeKind::TokenUpdated => {
                TOKEN_UPDATES_TOTAL
                    .with_label_values(&[provider.as_str()])
                    .inc();
            }
            OutcomeKind::InvalidToken => {
                TOKENS_EVICTED_TOTAL
                    .with_label_values(&[provider.as_str()])
                    .inc();
            }
            _ => {}
        }
    }

    pub fn classified(provider: Provider, kind: OutcomeKind) -> u64 {
        CLASSIFIED_TOTAL
            .with_label_values(&[provider.as_str(), kind.as_str()])
            .get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_increments_counters() {
        let before = ClassificationMetrics::classified(Provider::WebPush, OutcomeKind::InvalidToken);
        let evicted_before = TOKENS_EVICTED_TOTAL
            .with_label_values(&[Provider::WebPush.as_str()])
            .get();

        ClassificationMetrics::record(Provider::WebPush, OutcomeKind::InvalidToken);

        assert!(
            ClassificationMetrics::classified(Provider::WebPush, OutcomeKind::InvalidToken)
                > before
        );
        assert!(
            TOKENS_EVICTED_TOTAL
                .with_label_values(&[Provider::WebPush.as_str()])
                .get()
                > evicted_before
        );
    }

    #[test]
    fn test_encode_metrics() {
        ClassificationMetrics::record(Provider::Adm, OutcomeKind::Transport);
        let text = encode_metrics().unwrap();
        assert!(text.contains("pushgate_classified_total"));
    }
}

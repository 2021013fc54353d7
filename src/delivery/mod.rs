//! Cross-provider delivery outcome model.
//!
//! Every provider worker reports its results as a [`Response`] of
//! [`FailedMessage`] records. Each record answers the same four questions
//! regardless of which provider produced it:
//!
//! - did the message reach the provider ([`FailedMessage::is_success`])
//! - is it worth sending again ([`FailedMessage::can_retry`])
//! - should the destination token be evicted ([`FailedMessage::is_garbage_token`])
//! - does the stored token need replacing ([`FailedMessage::updated_token`])
//!
//! Provider-specific error taxonomies plug in through [`ProviderError`].

mod failed;

pub use failed::{FailedMessage, OutcomeSummary, Response};

use serde::{Deserialize, Serialize};

/// Classification surface implemented by every provider's native error type.
///
/// Implementations must be pure: the same value always classifies the same way.
pub trait ProviderError {
    /// The destination token is permanently unusable and should be evicted.
    fn invalid_token(&self) -> bool;

    /// The failure is transient and the message may be sent again later.
    fn temporary(&self) -> bool;
}

/// What happened to a single destination token.
///
/// Exactly one of these holds per record; callers match instead of probing
/// optional fields in a prescribed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Delivery<E> {
    /// Failure outside the push protocol (DNS, connect, TLS, timeout).
    Transport(String),
    /// The provider answered with a protocol-level failure.
    Rejected(E),
    /// Delivered, and the provider reported a replacement token.
    TokenUpdated(String),
}

/// Canonical outcome the dispatcher acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Delivered with nothing to do.
    Delivered,
    /// Delivered; persist the replacement token.
    TokenUpdated,
    /// Token is gone; evict it and never retry.
    InvalidToken,
    /// Provider-side transient failure; retry with backoff.
    Temporary,
    /// Malformed request or rejected credentials; log and drop.
    RequestError,
    /// Non-protocol failure; always retryable.
    Transport,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Delivered => "delivered",
            OutcomeKind::TokenUpdated => "token_updated",
            OutcomeKind::InvalidToken => "invalid_token",
            OutcomeKind::Temporary => "temporary",
            OutcomeKind::RequestError => "request_error",
            OutcomeKind::Transport => "transport",
        }
    }

    /// Whether the dispatcher should schedule another attempt
    pub fn can_retry(&self) -> bool {
        matches!(self, OutcomeKind::Temporary | OutcomeKind::Transport)
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Push provider families handled by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Adm,
    Apns,
    Fcm,
    WebPush,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Adm => "adm",
            Provider::Apns => "apns",
            Provider::Fcm => "fcm",
            Provider::WebPush => "webpush",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything addressed to a single destination token.
pub trait Destination {
    /// The token the message was sent to, in its stored string form.
    fn destination(&self) -> String;
}

/// Notifications per second a worker may send for one request.
///
/// Zero or negative means unlimited. Enforcement happens in the workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bandwidth(pub i32);

impl Bandwidth {
    pub const UNLIMITED: Bandwidth = Bandwidth(0);

    /// Per-second budget, or `None` when unlimited
    pub fn per_second(&self) -> Option<u32> {
        u32::try_from(self.0).ok().filter(|n| *n > 0)
    }

    pub fn is_unlimited(&self) -> bool {
        self.per_second().is_none()
    }
}

impl From<i32> for Bandwidth {
    fn from(value: i32) -> Self {
        Bandwidth(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bandwidth_unlimited() {
        assert!(Bandwidth::UNLIMITED.is_unlimited());
        assert!(Bandwidth(-5).is_unlimited());
        assert_eq!(Bandwidth(-5).per_second(), None);
        assert_eq!(Bandwidth(250).per_second(), Some(250));
    }

    #[test]
    fn test_outcome_kind_retry() {
        assert!(OutcomeKind::Transport.can_retry());
        assert!(OutcomeKind::Temporary.can_retry());
        assert!(!OutcomeKind::InvalidToken.can_retry());
        assert!(!OutcomeKind::RequestError.can_retry());
        assert!(!OutcomeKind::TokenUpdated.can_retry());
        assert!(!OutcomeKind::Delivered.can_retry());
    }

    #[test]
    fn test_delivery_serialization() {
        let d: Delivery<String> = Delivery::Transport("no such host".to_string());
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json, serde_json::json!({"type": "transport", "value": "no such host"}));
    }
}

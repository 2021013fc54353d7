//! Per-token outcome records and the response aggregate

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::{Delivery, Destination, OutcomeKind, Provider, ProviderError};
use crate::metrics::ClassificationMetrics;

/// Outcome for one destination token that did not cleanly succeed, or that
/// succeeded with a token rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedMessage<M, E> {
    /// Token the message was addressed to
    pub token: String,
    /// What the provider (or the transport) reported
    pub outcome: Delivery<E>,
    /// The message that was sent
    pub message: M,
}

impl<M, E> FailedMessage<M, E>
where
    E: ProviderError,
{
    /// Record for an explicit token, used when one message fans out to
    /// several registration IDs.
    pub fn for_token(message: M, token: impl Into<String>, outcome: Delivery<E>) -> Self {
        Self {
            token: token.into(),
            outcome,
            message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Delivery::TokenUpdated(_))
    }

    pub fn can_retry(&self) -> bool {
        match &self.outcome {
            Delivery::Transport(_) => true,
            Delivery::Rejected(e) => e.temporary(),
            Delivery::TokenUpdated(_) => false,
        }
    }

    /// The token should never be sent to again
    pub fn is_garbage_token(&self) -> bool {
        match &self.outcome {
            Delivery::Rejected(e) => e.invalid_token(),
            _ => false,
        }
    }

    /// Replacement token, only when it differs from the one that was sent
    pub fn updated_token(&self) -> Option<&str> {
        match &self.outcome {
            Delivery::TokenUpdated(new) if !new.is_empty() && *new != self.token => {
                Some(new.as_str())
            }
            _ => None,
        }
    }

    /// The provider's native error, if the provider rejected the message
    pub fn provider_error(&self) -> Option<&E> {
        match &self.outcome {
            Delivery::Rejected(e) => Some(e),
            _ => None,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match &self.outcome {
            Delivery::Transport(_) => OutcomeKind::Transport,
            Delivery::Rejected(e) if e.invalid_token() => OutcomeKind::InvalidToken,
            Delivery::Rejected(e) if e.temporary() => OutcomeKind::Temporary,
            Delivery::Rejected(_) => OutcomeKind::RequestError,
            Delivery::TokenUpdated(_) if self.updated_token().is_some() => {
                OutcomeKind::TokenUpdated
            }
            Delivery::TokenUpdated(_) => OutcomeKind::Delivered,
        }
    }
}

impl<M, E> FailedMessage<M, E>
where
    M: Destination,
    E: ProviderError,
{
    /// Failure outside the provider protocol
    pub fn transport(message: M, error: impl Into<String>) -> Self {
        let token = message.destination();
        Self::for_token(message, token, Delivery::Transport(error.into()))
    }

    /// Protocol-level rejection from the provider
    pub fn rejected(message: M, error: E) -> Self {
        let token = message.destination();
        Self::for_token(message, token, Delivery::Rejected(error))
    }

    /// Successful send carrying a replacement token.
    ///
    /// Returns `None` when the replacement is empty or equal to the sent
    /// token, since there is nothing for the dispatcher to do.
    pub fn token_updated(message: M, new_token: impl Into<String>) -> Option<Self> {
        let token = message.destination();
        let new_token = new_token.into();
        if new_token.is_empty() || new_token == token {
            return None;
        }
        Some(Self::for_token(message, token, Delivery::TokenUpdated(new_token)))
    }
}

impl<M, E> FailedMessage<M, E>
where
    E: ProviderError + Display,
{
    /// Flat, provider-independent view of this record
    pub fn summary(&self, provider: Provider) -> OutcomeSummary {
        let error = match &self.outcome {
            Delivery::Transport(s) => Some(s.clone()),
            Delivery::Rejected(e) => Some(e.to_string()),
            Delivery::TokenUpdated(_) => None,
        };
        OutcomeSummary {
            provider,
            token: self.token.clone(),
            kind: self.kind(),
            retry: self.can_retry(),
            updated_token: self.updated_token().map(str::to_string),
            error,
        }
    }
}

/// Flattened outcome written by the classifier tool and logged by workers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub provider: Provider,
    pub token: String,
    pub kind: OutcomeKind,
    pub retry: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A worker's reply to one request.
///
/// Holds only the records that failed or rotated a token; an empty response
/// means every message was delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<M, E> {
    #[serde(default = "Vec::new")]
    pub failed_messages: Vec<FailedMessage<M, E>>,
}

impl<M, E> Default for Response<M, E> {
    fn default() -> Self {
        Self {
            failed_messages: Vec::new(),
        }
    }
}

impl<M, E> Response<M, E>
where
    E: ProviderError,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, failed: FailedMessage<M, E>) {
        self.failed_messages.push(failed);
    }

    pub fn is_empty(&self) -> bool {
        self.failed_messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failed_messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FailedMessage<M, E>> {
        self.failed_messages.iter()
    }

    /// Records the dispatcher should resend
    pub fn retryable(&self) -> impl Iterator<Item = &FailedMessage<M, E>> {
        self.failed_messages.iter().filter(|f| f.can_retry())
    }

    /// Tokens to evict from storage
    pub fn garbage_tokens(&self) -> impl Iterator<Item = &str> {
        self.failed_messages
            .iter()
            .filter(|f| f.is_garbage_token())
            .map(|f| f.token.as_str())
    }

    /// `(old, new)` token pairs to persist
    pub fn token_updates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.failed_messages
            .iter()
            .filter_map(|f| f.updated_token().map(|new| (f.token.as_str(), new)))
    }

    /// Count every record into the classification metrics
    pub fn record_metrics(&self, provider: Provider) {
        for failed in &self.failed_messages {
            ClassificationMetrics::record(provider, failed.kind());
        }
    }
}

impl<M, E> Extend<FailedMessage<M, E>> for Response<M, E> {
    fn extend<I: IntoIterator<Item = FailedMessage<M, E>>>(&mut self, iter: I) {
        self.failed_messages.extend(iter);
    }
}

impl<M, E> FromIterator<FailedMessage<M, E>> for Response<M, E> {
    fn from_iter<I: IntoIterator<Item = FailedMessage<M, E>>>(iter: I) -> Self {
        Self {
            failed_messages: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note(&'static str);

    impl Destination for Note {
        fn destination(&self) -> String {
            self.0.to_string()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestError {
        Gone,
        Busy,
        Malformed,
    }

    impl ProviderError for TestError {
        fn invalid_token(&self) -> bool {
            matches!(self, TestError::Gone)
        }

        fn temporary(&self) -> bool {
            matches!(self, TestError::Busy)
        }
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    type Failed = FailedMessage<Note, TestError>;

    #[test]
    fn test_transport_is_retryable() {
        let f = Failed::transport(Note("tok"), "no such host");
        assert!(!f.is_success());
        assert!(f.can_retry());
        assert!(!f.is_garbage_token());
        assert_eq!(f.updated_token(), None);
        assert_eq!(f.kind(), OutcomeKind::Transport);
    }

    #[test]
    fn test_rejected_classification() {
        let gone = Failed::rejected(Note("tok"), TestError::Gone);
        assert!(gone.is_garbage_token());
        assert!(!gone.can_retry());
        assert_eq!(gone.kind(), OutcomeKind::InvalidToken);

        let busy = Failed::rejected(Note("tok"), TestError::Busy);
        assert!(busy.can_retry());
        assert_eq!(busy.kind(), OutcomeKind::Temporary);

        let bad = Failed::rejected(Note("tok"), TestError::Malformed);
        assert!(!bad.can_retry());
        assert!(!bad.is_garbage_token());
        assert_eq!(bad.kind(), OutcomeKind::RequestError);
    }

    #[test]
    fn test_token_update_only_when_different() {
        assert!(Failed::token_updated(Note("tok"), "tok").is_none());
        assert!(Failed::token_updated(Note("tok"), "").is_none());

        let f = Failed::token_updated(Note("tok"), "tok2").unwrap();
        assert!(f.is_success());
        assert!(!f.can_retry());
        assert_eq!(f.updated_token(), Some("tok2"));
        assert_eq!(f.kind(), OutcomeKind::TokenUpdated);
    }

    #[test]
    fn test_same_token_rotation_not_reported() {
        let f = Failed::for_token(Note("tok"), "tok", Delivery::TokenUpdated("tok".into()));
        assert!(f.is_success());
        assert_eq!(f.updated_token(), None);
        assert_eq!(f.kind(), OutcomeKind::Delivered);
    }

    #[test]
    fn test_response_views() {
        let response: Response<Note, TestError> = vec![
            Failed::transport(Note("a"), "timeout"),
            Failed::rejected(Note("b"), TestError::Gone),
            Failed::rejected(Note("c"), TestError::Busy),
            Failed::token_updated(Note("d"), "d2").unwrap(),
        ]
        .into_iter()
        .collect();

        assert_eq!(response.len(), 4);
        let retry: Vec<_> = response.retryable().map(|f| f.token.as_str()).collect();
        assert_eq!(retry, vec!["a", "c"]);
        assert_eq!(response.garbage_tokens().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(response.token_updates().collect::<Vec<_>>(), vec![("d", "d2")]);
    }

    #[test]
    fn test_summary() {
        let f = Failed::rejected(Note("b"), TestError::Gone);
        let summary = f.summary(Provider::Apns);
        assert_eq!(summary.kind, OutcomeKind::InvalidToken);
        assert!(!summary.retry);
        assert_eq!(summary.error.as_deref(), Some("Gone"));
        assert_eq!(summary.updated_token, None);
    }
}

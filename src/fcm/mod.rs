//! Firebase Cloud Messaging
//!
//! Three protocol generations report failures in different shapes: legacy
//! HTTP per-token results, XMPP ack/nack signals, and HTTP v1 API errors.
//! [`FcmError`] wraps all three so a single [`FailedMessage`] type serves
//! every FCM endpoint.

mod endpoint;
mod http;
mod v1;
mod xmpp;

pub use endpoint::{detect, protocol_version, ProtocolVersion};
pub use http::{Failure, ResponseBody, TokenResult};
pub use v1::{ApiError, ApiStatus};
pub use xmpp::{Signal, SignalCode};

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::delivery::{self, Bandwidth, Delivery, Destination, ProviderError};
use crate::error::{GatewayError, Result};

/// Most registration IDs one multicast message may carry
pub const REG_IDS_MAX: usize = 1000;

fn is_false(b: &bool) -> bool {
    !*b
}

/// FCM message in the legacy HTTP/XMPP JSON shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "message_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "registration_ids", default, skip_serializing_if = "Vec::is_empty")]
    pub reg_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapse_key: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub delay_while_idle: bool,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_live: Option<u32>,
    /// `"normal"` or `"high"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub content_available: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub mutable_content: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dry_run: bool,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub notification: HashMap<String, String>,
}

impl Message {
    /// Message for a single registration ID or topic
    pub fn to(token: impl Into<String>) -> Self {
        Self {
            to: Some(token.into()),
            ..Default::default()
        }
    }

    /// Multicast message for several registration IDs
    pub fn multicast(reg_ids: Vec<String>) -> Self {
        Self {
            reg_ids,
            ..Default::default()
        }
    }

    /// Destinations in the order FCM reports their results
    pub fn destinations(&self) -> Vec<&str> {
        if self.reg_ids.is_empty() {
            self.to.as_deref().into_iter().collect()
        } else {
            self.reg_ids.iter().map(String::as_str).collect()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.reg_ids.is_empty() && self.to.as_deref().map_or(true, str::is_empty) {
            return Err(GatewayError::InvalidMessage(
                "message has no destination".to_string(),
            ));
        }
        if self.reg_ids.len() > REG_IDS_MAX {
            return Err(GatewayError::InvalidMessage(format!(
                "{} registration ids exceed the limit of {}",
                self.reg_ids.len(),
                REG_IDS_MAX
            )));
        }
        Ok(())
    }
}

impl Destination for Message {
    fn destination(&self) -> String {
        self.destinations()
            .first()
            .map(|s| s.to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Legacy server key
    #[serde(default)]
    pub server_key: String,
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub url: String,
    pub credential: Credential,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub bandwidth: Bandwidth,
}

impl Request {
    pub fn protocol_version(&self) -> ProtocolVersion {
        protocol_version(&self.url)
    }
}

/// Failure from any FCM protocol generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "protocol", content = "error", rename_all = "snake_case")]
pub enum FcmError {
    Http(Failure),
    Xmpp(Signal),
    V1(ApiError),
}

impl FcmError {
    pub fn bad_reg_id(&self) -> bool {
        match self {
            FcmError::Http(f) => f.bad_reg_id(),
            FcmError::Xmpp(s) => s.bad_reg_id(),
            FcmError::V1(e) => e.bad_reg_id(),
        }
    }

    pub fn temporary(&self) -> bool {
        match self {
            FcmError::Http(f) => f.temporary(),
            FcmError::Xmpp(s) => s.temporary(),
            FcmError::V1(e) => e.temporary(),
        }
    }
}

impl fmt::Display for FcmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FcmError::Http(failure) => write!(f, "{}", failure),
            FcmError::Xmpp(signal) => write!(f, "{}", signal),
            FcmError::V1(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for FcmError {}

impl ProviderError for FcmError {
    fn invalid_token(&self) -> bool {
        self.bad_reg_id()
    }

    fn temporary(&self) -> bool {
        FcmError::temporary(self)
    }
}

pub type FailedMessage = delivery::FailedMessage<Message, FcmError>;
pub type Response = delivery::Response<Message, FcmError>;

impl FailedMessage {
    /// Record for an XMPP ack or nack. Acks without a new registration ID
    /// need no record.
    pub fn from_signal(message: Message, token: &str, signal: Signal) -> Option<Self> {
        if !signal.is_ack() {
            return Some(Self::for_token(
                message,
                token,
                Delivery::Rejected(FcmError::Xmpp(signal)),
            ));
        }
        match signal.registration_id {
            Some(new) if !new.is_empty() && new != token => {
                Some(Self::for_token(message, token, Delivery::TokenUpdated(new)))
            }
            _ => None,
        }
    }

    /// One transport failure record per destination, so every registration
    /// ID of a multicast message is retried rather than only the first.
    pub fn transport_all(message: Message, error: impl Into<String>) -> Vec<Self> {
        let error = error.into();
        message
            .destinations()
            .into_iter()
            .map(|token| {
                Self::for_token(
                    message.clone(),
                    token,
                    Delivery::Transport(error.clone()),
                )
            })
            .collect()
    }

    /// Record for an HTTP v1 error
    pub fn from_api_error(message: Message, error: ApiError) -> Self {
        Self::rejected(message, FcmError::V1(error))
    }
}

impl ResponseBody {
    /// Pair each destination of `message` with its result, keeping only
    /// failures and canonical ID updates.
    ///
    /// Destinations without a result are reported as unknown failures.
    pub fn failed_messages(&self, message: &Message) -> Vec<FailedMessage> {
        let destinations = message.destinations();
        if destinations.len() != self.results.len() {
            tracing::warn!(
                provider = "fcm",
                multicast_id = self.multicast_id,
                destinations = destinations.len(),
                results = self.results.len(),
                "FCM result count does not match destinations"
            );
        }

        let mut failed = Vec::new();
        for (i, token) in destinations.into_iter().enumerate() {
            let outcome = match self.results.get(i) {
                Some(result) if result.is_success() => match &result.registration_id {
                    Some(new) if result.is_canonical_id() && new != token => {
                        Delivery::TokenUpdated(new.clone())
                    }
                    _ => continue,
                },
                Some(result) => Delivery::Rejected(FcmError::Http(
                    result
                        .error
                        .clone()
                        .unwrap_or_else(|| Failure::Unknown(String::new())),
                )),
                None => Delivery::Rejected(FcmError::Http(Failure::Unknown(
                    "missing result".to_string(),
                ))),
            };
            failed.push(FailedMessage::for_token(message.clone(), token, outcome));
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::OutcomeKind;

    fn multicast() -> Message {
        Message::multicast(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "d".to_string(),
            "e".to_string(),
        ])
    }

    #[test]
    fn test_failed_messages_from_body() {
        let body: ResponseBody = serde_json::from_value(serde_json::json!({
            "multicast_id": 1,
            "success": 3,
            "failure": 2,
            "canonical_ids": 2,
            "results": [
                { "message_id": "1:1" },
                { "error": "Unavailable" },
                { "error": "NotRegistered" },
                { "message_id": "1:4", "registration_id": "d2" },
                { "message_id": "1:5", "registration_id": "e" }
            ]
        }))
        .unwrap();

        let failed = body.failed_messages(&multicast());
        let tokens: Vec<_> = failed.iter().map(|f| f.token.as_str()).collect();
        assert_eq!(tokens, vec!["b", "c", "d"]);

        assert_eq!(failed[0].kind(), OutcomeKind::Temporary);
        assert!(failed[0].can_retry());
        assert!(failed[1].is_garbage_token());
        assert_eq!(failed[2].updated_token(), Some("d2"));
        assert!(failed[2].is_success());
    }

    #[test]
    fn test_missing_results_are_not_retried() {
        let body = ResponseBody {
            results: vec![TokenResult {
                message_id: Some("1:1".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let failed = body.failed_messages(&Message::multicast(vec!["a".into(), "b".into()]));
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].token, "b");
        assert_eq!(failed[0].kind(), OutcomeKind::RequestError);
    }

    #[test]
    fn test_from_signal() {
        let msg = Message::to("tok");
        assert!(FailedMessage::from_signal(msg.clone(), "tok", Signal::ack(None)).is_none());
        assert!(
            FailedMessage::from_signal(msg.clone(), "tok", Signal::ack(Some("tok".into())))
                .is_none()
        );

        let updated =
            FailedMessage::from_signal(msg.clone(), "tok", Signal::ack(Some("tok2".into())))
                .unwrap();
        assert_eq!(updated.updated_token(), Some("tok2"));

        let drained = FailedMessage::from_signal(
            msg.clone(),
            "tok",
            Signal::nack("CONNECTION_DRAINING", "draining"),
        )
        .unwrap();
        assert!(drained.can_retry());

        let gone =
            FailedMessage::from_signal(msg, "tok", Signal::nack("DEVICE_UNREGISTERED", ""))
                .unwrap();
        assert!(gone.is_garbage_token());
        assert!(!gone.can_retry());
    }

    #[test]
    fn test_transport_all_fans_out() {
        let failed = FailedMessage::transport_all(
            Message::multicast(vec!["a".into(), "b".into(), "c".into()]),
            "connection reset",
        );
        let tokens: Vec<_> = failed.iter().map(|f| f.token.as_str()).collect();
        assert_eq!(tokens, vec!["a", "b", "c"]);
        assert!(failed.iter().all(|f| f.can_retry()));
        assert!(failed.iter().all(|f| f.kind() == OutcomeKind::Transport));

        let single = FailedMessage::transport_all(Message::to("tok"), "timeout");
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].token, "tok");
    }

    #[test]
    fn test_from_api_error() {
        let f = FailedMessage::from_api_error(
            Message::to("tok"),
            ApiError::new(404, "UNREGISTERED", "gone"),
        );
        assert_eq!(f.token, "tok");
        assert!(f.is_garbage_token());

        let f = FailedMessage::from_api_error(
            Message::to("tok"),
            ApiError::new(500, "SOMETHING_ELSE", ""),
        );
        assert_eq!(f.kind(), OutcomeKind::Temporary);
    }

    #[test]
    fn test_message_json_field_names() {
        let mut msg = Message::multicast(vec!["r1".into(), "r2".into()]);
        msg.collapse_key = Some("score".into());
        msg.time_to_live = Some(3600);
        msg.dry_run = true;
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "registration_ids": ["r1", "r2"],
                "collapse_key": "score",
                "time_to_live": 3600,
                "dry_run": true
            })
        );
        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_validate() {
        assert!(Message::to("tok").validate().is_ok());
        assert!(Message::default().validate().is_err());
        let too_many = Message::multicast((0..=REG_IDS_MAX).map(|i| i.to_string()).collect());
        assert!(too_many.validate().is_err());
    }

    #[test]
    fn test_fcm_error_json() {
        let e = FcmError::Http(Failure::NotRegistered);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"protocol": "http", "error": "NotRegistered"})
        );
        let back: FcmError = serde_json::from_value(json).unwrap();
        assert_eq!(back, e);
    }
}

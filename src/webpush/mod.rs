//! Standards-based Web Push (RFC 8030) with VAPID sender identification

use std::fmt;
use std::path::Path;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::delivery::{self, Bandwidth, Destination, ProviderError};
use crate::error::Result;

/// Voluntary Application Server Identification key pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vapid {
    /// `mailto:` or `https:` URI identifying the sender
    pub subject: String,
    pub public_key: Vec<u8>,
    pub private_key: Vec<u8>,
}

impl Vapid {
    /// Load both halves from files holding raw URL-safe base64
    pub fn load(
        subject: impl Into<String>,
        public_key: impl AsRef<Path>,
        private_key: impl AsRef<Path>,
    ) -> Result<Self> {
        Ok(Self {
            subject: subject.into(),
            public_key: load_vapid_key(public_key)?,
            private_key: load_vapid_key(private_key)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default)]
    pub vapid: Option<Vapid>,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

/// Read a VAPID key stored as unpadded URL-safe base64
pub fn load_vapid_key(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let encoded = std::fs::read_to_string(path)?;
    Ok(URL_SAFE_NO_PAD.decode(encoded.trim_end())?)
}

/// Browser push subscription as stored by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "v")]
    pub version: i32,
    #[serde(rename = "endpoint")]
    pub url: String,
    #[serde(rename = "p256dh")]
    pub public_key: String,
    #[serde(rename = "auth")]
    pub auth_token: String,
}

impl Token {
    /// The JSON form the token is stored and exchanged in
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// `Urgency` header values
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    VeryLow,
    Low,
    #[default]
    Normal,
    High,
}

impl Urgency {
    pub fn header_value(&self) -> &'static str {
        match self {
            Urgency::VeryLow => "very-low",
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub token: Token,
    pub payload: String,
    /// Seconds
    #[serde(default)]
    pub time_to_live: u32,
    #[serde(default)]
    pub urgency: Urgency,
    /// Replaces pending messages with the same topic, like FCM's collapse key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

/// The stored JSON form of the subscription, so eviction and rotation keys
/// match what the gateway persisted.
impl Destination for Message {
    fn destination(&self) -> String {
        self.token
            .to_json_string()
            .unwrap_or_else(|_| self.token.url.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub credential: Credential,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub bandwidth: Bandwidth,
}

/// Non-2xx response from a push service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtocolError {
    pub status_code: u16,
}

impl ProtocolError {
    pub fn new(status_code: u16) -> Self {
        Self { status_code }
    }

    /// 404 Not Found or 410 Gone: the subscription has expired
    pub fn invalid_token(&self) -> bool {
        matches!(self.status_code, 404 | 410)
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "webpush: status {}", self.status_code)
    }
}

impl std::error::Error for ProtocolError {}

impl ProviderError for ProtocolError {
    fn invalid_token(&self) -> bool {
        ProtocolError::invalid_token(self)
    }

    /// Web Push defines no finer taxonomy; anything but an expired
    /// subscription is treated as retryable.
    fn temporary(&self) -> bool {
        !self.invalid_token()
    }
}

pub type FailedMessage = delivery::FailedMessage<Message, ProtocolError>;
pub type Response = delivery::Response<Message, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::OutcomeKind;
    use std::io::Write;

    fn token() -> Token {
        Token {
            version: 1,
            url: "https://updates.push.services.mozilla.com/wpush/v2/abc".to_string(),
            public_key: "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM".to_string(),
            auth_token: "tBHItJI5svbpez7KI4CCXg".to_string(),
        }
    }

    #[test]
    fn test_invalid_token() {
        for (code, expect) in [(404, true), (410, true), (400, false), (413, false), (429, false), (500, false)] {
            assert_eq!(ProtocolError::new(code).invalid_token(), expect, "{code}");
        }
    }

    #[test]
    fn test_non_invalid_token_is_retried() {
        let msg = Message {
            token: token(),
            payload: "hi".to_string(),
            time_to_live: 60,
            urgency: Urgency::High,
            topic: None,
        };
        let busy = FailedMessage::rejected(msg.clone(), ProtocolError::new(429));
        assert!(busy.can_retry());
        assert_eq!(busy.kind(), OutcomeKind::Temporary);

        let gone = FailedMessage::rejected(msg, ProtocolError::new(410));
        assert!(!gone.can_retry());
        assert!(gone.is_garbage_token());
        assert_eq!(gone.token, token().to_json_string().unwrap());
    }

    #[test]
    fn test_garbage_tokens_use_stored_form() {
        let stored = Token {
            version: 1,
            url: "https://push.example/abc".to_string(),
            public_key: "p".to_string(),
            auth_token: "a".to_string(),
        };
        let stored_json = stored.to_json_string().unwrap();
        assert_eq!(
            stored_json,
            r#"{"v":1,"endpoint":"https://push.example/abc","p256dh":"p","auth":"a"}"#
        );

        let msg = Message {
            token: Token::from_json_str(&stored_json).unwrap(),
            payload: String::new(),
            time_to_live: 0,
            urgency: Urgency::default(),
            topic: None,
        };
        let response: Response = vec![
            FailedMessage::rejected(msg.clone(), ProtocolError::new(404)),
            FailedMessage::rejected(msg, ProtocolError::new(503)),
        ]
        .into_iter()
        .collect();
        assert_eq!(response.garbage_tokens().collect::<Vec<_>>(), vec![stored_json.as_str()]);
    }

    #[test]
    fn test_token_json_shape() {
        let s = token().to_json_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert_eq!(value["v"], 1);
        assert_eq!(value["endpoint"], "https://updates.push.services.mozilla.com/wpush/v2/abc");
        assert!(value.get("p256dh").is_some());
        assert!(value.get("auth").is_some());
        assert_eq!(Token::from_json_str(&s).unwrap(), token());
    }

    #[test]
    fn test_urgency_header_values() {
        assert_eq!(Urgency::default(), Urgency::Normal);
        assert_eq!(Urgency::VeryLow.header_value(), "very-low");
        assert_eq!(
            serde_json::to_value(Urgency::VeryLow).unwrap(),
            serde_json::json!("very-low")
        );
        assert!(Urgency::High > Urgency::Low);
    }

    #[test]
    fn test_load_vapid_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", URL_SAFE_NO_PAD.encode([1u8, 2, 3, 250])).unwrap();
        let key = load_vapid_key(file.path()).unwrap();
        assert_eq!(key, vec![1, 2, 3, 250]);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, "not*base64").unwrap();
        assert!(load_vapid_key(bad.path()).is_err());
    }
}

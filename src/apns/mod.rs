//! Apple Push Notification service
//!
//! Two interfaces coexist: the legacy binary interface (`host:port`, one
//! status byte per failure) and the HTTP/2 provider API (`https://…`, HTTP
//! status plus a JSON reason). [`is_legacy_addr`] decides which one a request
//! targets, and [`ProtocolError`] carries whichever failure shape applies.

mod feedback;
mod reason;
mod status;

pub use feedback::{Feedback, FeedbackRequest, FeedbackResponse};
pub use reason::{Reason, ALL_REASONS};
pub use status::Status;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::delivery::{self, Bandwidth, Destination, ProviderError};
use crate::error::Result;

/// `apns-priority` header values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    /// Deliver immediately
    #[default]
    Immediate,
    /// Deliver when convenient for the device's power state
    PowerSaving,
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            10 => Ok(Priority::Immediate),
            5 => Ok(Priority::PowerSaving),
            other => Err(format!("invalid apns priority {other}")),
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> Self {
        match p {
            Priority::Immediate => 10,
            Priority::PowerSaving => 5,
        }
    }
}

/// `apns-push-type` header values (HTTP/2 only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushType {
    Alert,
    Background,
    Voip,
    Complication,
    FileProvider,
    Mdm,
}

impl PushType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PushType::Alert => "alert",
            PushType::Background => "background",
            PushType::Voip => "voip",
            PushType::Complication => "complication",
            PushType::FileProvider => "fileprovider",
            PushType::Mdm => "mdm",
        }
    }
}

/// Connection credentials: either a TLS client certificate or a
/// JWT signing key for token-based authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default)]
    pub key_pem: Vec<u8>,
    #[serde(default)]
    pub cert_pem: Vec<u8>,

    /// JWT `iss` (team ID)
    #[serde(default)]
    pub issuer: String,
    /// JWT `kid`
    #[serde(default)]
    pub key_id: String,
    /// PEM encoded EC P-256 private key
    #[serde(default)]
    pub private_key: Vec<u8>,

    #[serde(default)]
    pub insecure_skip_verify: bool,
}

impl Credential {
    pub fn uses_token_auth(&self) -> bool {
        !self.issuer.is_empty() && !self.key_id.is_empty() && !self.private_key.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u32,
    /// Unix seconds after which APNs discards the notification; 0 means once
    #[serde(default)]
    pub expiry: u32,
    #[serde(with = "hex::serde")]
    pub token: Vec<u8>,
    /// JSON encoded payload
    pub payload: String,
    #[serde(default)]
    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapse_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_type: Option<PushType>,
}

impl Message {
    pub fn new(id: u32, token: Vec<u8>, payload: impl Into<String>) -> Self {
        Self {
            id,
            expiry: 0,
            token,
            payload: payload.into(),
            priority: Priority::default(),
            topic: None,
            collapse_id: None,
            push_type: None,
        }
    }

    /// Build a message from the hex form apps upload their tokens in.
    /// Case is not preserved: [`Destination::destination`] reports lowercase hex.
    pub fn with_hex_token(id: u32, token: &str, payload: impl Into<String>) -> Result<Self> {
        Ok(Self::new(id, hex::decode(token)?, payload))
    }
}

/// Tokens are keyed by their lowercase hex form whatever case the app
/// uploaded, so callers must store tokens lowercased for eviction to match.
impl Destination for Message {
    fn destination(&self) -> String {
        hex::encode(&self.token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// `gateway.push.apple.com:2195` for legacy, `https://api.push.apple.com` for HTTP/2
    pub addr: String,
    pub credential: Credential,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub bandwidth: Bandwidth,
}

impl Request {
    pub fn is_legacy(&self) -> bool {
        is_legacy_addr(&self.addr)
    }
}

/// Bare `host:port` addresses speak the legacy binary interface; anything
/// with an `http(s)://` scheme speaks HTTP/2.
pub fn is_legacy_addr(addr: &str) -> bool {
    !(addr.starts_with("https://") || addr.starts_with("http://"))
}

/// A failure reported by APNs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum ProtocolError {
    /// Error-response packet from the binary interface
    Legacy {
        command: u8,
        status: Status,
        identifier: u32,
    },
    /// Non-200 response from the HTTP/2 API
    Http2 {
        status_code: u16,
        reason: Reason,
        /// When APNs last confirmed the token was invalid (410 only)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<DateTime<Utc>>,
    },
}

/// JSON body of an HTTP/2 error response
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    reason: String,
    /// Milliseconds since the epoch
    #[serde(default)]
    timestamp: Option<i64>,
}

impl ProtocolError {
    pub fn legacy(status: Status, identifier: u32) -> Self {
        ProtocolError::Legacy {
            command: 8,
            status,
            identifier,
        }
    }

    pub fn http2(status_code: u16, reason: impl Into<Reason>) -> Self {
        ProtocolError::Http2 {
            status_code,
            reason: reason.into(),
            timestamp: None,
        }
    }

    /// Decode an HTTP/2 error response. Bodies that are not valid JSON still
    /// produce an error carrying the status code and an empty reason.
    pub fn from_http2_response(status_code: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => ProtocolError::Http2 {
                status_code,
                reason: Reason::from(parsed.reason),
                timestamp: parsed.timestamp.and_then(DateTime::from_timestamp_millis),
            },
            Err(e) => {
                tracing::warn!(
                    provider = "apns",
                    status_code,
                    error = %e,
                    "Undecodable APNs error body"
                );
                ProtocolError::Http2 {
                    status_code,
                    reason: Reason::Unknown(String::new()),
                    timestamp: None,
                }
            }
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, ProtocolError::Legacy { .. })
    }

    pub fn invalid_token(&self) -> bool {
        match self {
            ProtocolError::Legacy { status, .. } => *status == Status::InvalidToken,
            ProtocolError::Http2 {
                status_code,
                reason,
                ..
            } => match status_code {
                404 | 410 => true,
                400 => *reason == Reason::BadDeviceToken,
                _ => false,
            },
        }
    }

    pub fn temporary(&self) -> bool {
        if self.invalid_token() {
            return false;
        }
        match self {
            ProtocolError::Legacy { status, .. } => status.temporary(),
            ProtocolError::Http2 {
                status_code,
                reason,
                ..
            } => matches!(status_code, 429 | 500 | 503) || reason.temporary(),
        }
    }

    /// When the token became invalid.
    ///
    /// Only meaningful for invalid-token errors; everything else returns the
    /// Unix epoch. The binary interface carries no time, and a 404 carries no
    /// timestamp, so those report the moment of the call.
    pub fn timestamp(&self) -> DateTime<Utc> {
        if !self.invalid_token() {
            return DateTime::<Utc>::default();
        }
        match self {
            ProtocolError::Legacy { .. } => Utc::now(),
            ProtocolError::Http2 { timestamp, .. } => timestamp.unwrap_or_else(Utc::now),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Legacy { status, .. } => write!(f, "{}", status),
            ProtocolError::Http2 {
                status_code,
                reason,
                ..
            } => write!(f, "{} {}", status_code, reason),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl ProviderError for ProtocolError {
    fn invalid_token(&self) -> bool {
        ProtocolError::invalid_token(self)
    }

    fn temporary(&self) -> bool {
        ProtocolError::temporary(self)
    }
}

pub type FailedMessage = delivery::FailedMessage<Message, ProtocolError>;
pub type Response = delivery::Response<Message, ProtocolError>;

//! Amazon Device Messaging (ADM)
//!
//! ADM answers each send with an HTTP status and, on failure, a `reason`
//! string. On success it may return a new `registrationID`, which means the
//! device token has been rotated.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::delivery::{self, Bandwidth, Destination, ProviderError};

/// OAuth2 client credentials for the ADM token endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Skip server certificate verification (testing only)
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

/// One ADM notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Destination registration ID; carried in the URL path, not the body
    #[serde(skip)]
    pub reg_id: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consolidation_key: Option<String>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_after: Option<u32>,
    /// Checksum of `data`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
}

impl Message {
    pub fn new(reg_id: impl Into<String>) -> Self {
        Self {
            reg_id: reg_id.into(),
            ..Default::default()
        }
    }
}

impl Destination for Message {
    fn destination(&self) -> String {
        self.reg_id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// `scheme://host[:port]` of the message endpoint
    pub origin_url: String,
    pub credential: Credential,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub bandwidth: Bandwidth,
}

/// ADM failure reason
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProtocolError {
    InvalidRegistrationId,
    InvalidData,
    InvalidConsolidationKey,
    InvalidExpiration,
    InvalidChecksum,
    InvalidType,
    Unregistered,
    AccessTokenExpired,
    MessageTooLarge,
    MaxRateExceeded,
    /// A reason outside the documented vocabulary
    Unknown(String),
}

impl ProtocolError {
    pub fn as_str(&self) -> &str {
        match self {
            ProtocolError::InvalidRegistrationId => "InvalidRegistrationId",
            ProtocolError::InvalidData => "InvalidData",
            ProtocolError::InvalidConsolidationKey => "InvalidConsolidationKey",
            ProtocolError::InvalidExpiration => "InvalidExpiration",
            ProtocolError::InvalidChecksum => "InvalidChecksum",
            ProtocolError::InvalidType => "InvalidType",
            ProtocolError::Unregistered => "Unregistered",
            ProtocolError::AccessTokenExpired => "AccessTokenExpired",
            ProtocolError::MessageTooLarge => "MessageTooLarge",
            ProtocolError::MaxRateExceeded => "MaxRateExceeded",
            ProtocolError::Unknown(s) => s,
        }
    }

    /// The request itself is malformed; resending it cannot succeed
    pub fn invalid_request(&self) -> bool {
        matches!(
            self,
            ProtocolError::InvalidData
                | ProtocolError::InvalidConsolidationKey
                | ProtocolError::InvalidExpiration
                | ProtocolError::InvalidChecksum
                | ProtocolError::InvalidType
                | ProtocolError::MessageTooLarge
        )
    }

    pub fn invalid_token(&self) -> bool {
        matches!(
            self,
            ProtocolError::InvalidRegistrationId | ProtocolError::Unregistered
        )
    }

    pub fn temporary(&self) -> bool {
        !self.invalid_token() && !self.invalid_request()
    }
}

impl From<String> for ProtocolError {
    fn from(s: String) -> Self {
        match s.as_str() {
            "InvalidRegistrationId" => ProtocolError::InvalidRegistrationId,
            "InvalidData" => ProtocolError::InvalidData,
            "InvalidConsolidationKey" => ProtocolError::InvalidConsolidationKey,
            "InvalidExpiration" => ProtocolError::InvalidExpiration,
            "InvalidChecksum" => ProtocolError::InvalidChecksum,
            "InvalidType" => ProtocolError::InvalidType,
            "Unregistered" => ProtocolError::Unregistered,
            "AccessTokenExpired" => ProtocolError::AccessTokenExpired,
            "MessageTooLarge" => ProtocolError::MessageTooLarge,
            "MaxRateExceeded" => ProtocolError::MaxRateExceeded,
            _ => {
                tracing::warn!(provider = "adm", reason = %s, "Unrecognized ADM failure reason");
                ProtocolError::Unknown(s)
            }
        }
    }
}

impl From<&str> for ProtocolError {
    fn from(s: &str) -> Self {
        ProtocolError::from(s.to_string())
    }
}

impl From<ProtocolError> for String {
    fn from(e: ProtocolError) -> Self {
        match e {
            ProtocolError::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
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

impl FailedMessage {
    /// Record for a successful send, if ADM rotated the registration ID.
    pub fn from_success(message: Message, registration_id: Option<String>) -> Option<Self> {
        registration_id.and_then(|id| FailedMessage::token_updated(message, id))
    }
}

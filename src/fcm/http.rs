//! Legacy HTTP protocol (`/fcm/send`) responses

use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-token error code in a legacy HTTP result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Failure {
    /// No registration ID in the request
    MissingRegistration,
    /// Malformed registration ID
    InvalidRegistration,
    /// Registration ID is tied to a different sender
    MismatchSenderId,
    /// Registration ID is no longer valid
    NotRegistered,
    MessageTooBig,
    /// Payload uses a key reserved by Google
    InvalidDataKey,
    InvalidTtl,
    /// Server timed out
    Unavailable,
    InternalServerError,
    InvalidPackageName,
    DeviceMessageRateExceeded,
    TopicMessageRateExceeded,
    Unknown(String),
}

impl Failure {
    pub fn as_str(&self) -> &str {
        match self {
            Failure::MissingRegistration => "MissingRegistration",
            Failure::InvalidRegistration => "InvalidRegistration",
            Failure::MismatchSenderId => "MismatchSenderId",
            Failure::NotRegistered => "NotRegistered",
            Failure::MessageTooBig => "MessageTooBig",
            Failure::InvalidDataKey => "InvalidDataKey",
            Failure::InvalidTtl => "InvalidTtl",
            Failure::Unavailable => "Unavailable",
            Failure::InternalServerError => "InternalServerError",
            Failure::InvalidPackageName => "InvalidPackageName",
            Failure::DeviceMessageRateExceeded => "DeviceMessageRateExceeded",
            Failure::TopicMessageRateExceeded => "TopicMessageRateExceeded",
            Failure::Unknown(s) => s,
        }
    }

    pub fn bad_reg_id(&self) -> bool {
        matches!(self, Failure::InvalidRegistration | Failure::NotRegistered)
    }

    pub fn temporary(&self) -> bool {
        matches!(
            self,
            Failure::Unavailable
                | Failure::InternalServerError
                | Failure::DeviceMessageRateExceeded
                | Failure::TopicMessageRateExceeded
        )
    }
}

impl From<String> for Failure {
    fn from(s: String) -> Self {
        match s.as_str() {
            "MissingRegistration" => Failure::MissingRegistration,
            "InvalidRegistration" => Failure::InvalidRegistration,
            "MismatchSenderId" => Failure::MismatchSenderId,
            "NotRegistered" => Failure::NotRegistered,
            "MessageTooBig" => Failure::MessageTooBig,
            "InvalidDataKey" => Failure::InvalidDataKey,
            "InvalidTtl" => Failure::InvalidTtl,
            "Unavailable" => Failure::Unavailable,
            "InternalServerError" => Failure::InternalServerError,
            "InvalidPackageName" => Failure::InvalidPackageName,
            "DeviceMessageRateExceeded" => Failure::DeviceMessageRateExceeded,
            "TopicMessageRateExceeded" => Failure::TopicMessageRateExceeded,
            _ => {
                tracing::warn!(provider = "fcm", error = %s, "Unrecognized FCM result error");
                Failure::Unknown(s)
            }
        }
    }
}

impl From<&str> for Failure {
    fn from(s: &str) -> Self {
        Failure::from(s.to_string())
    }
}

impl From<Failure> for String {
    fn from(f: Failure) -> Self {
        match f {
            Failure::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one registration ID
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResult {
    /// Set when the send succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Replacement registration ID on a successful send
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
}

impl TokenResult {
    pub fn is_success(&self) -> bool {
        self.message_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// The registration ID should never be sent to again
    pub fn is_garbage_reg_id(&self) -> bool {
        !self.is_success() && self.error.as_ref().is_some_and(Failure::bad_reg_id)
    }

    /// FCM returned a canonical ID for this token
    pub fn is_canonical_id(&self) -> bool {
        self.registration_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Body of a legacy HTTP send response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(default)]
    pub multicast_id: i64,
    #[serde(default)]
    pub success: u32,
    #[serde(default)]
    pub failure: u32,
    #[serde(default)]
    pub canonical_ids: u32,
    #[serde(default)]
    pub results: Vec<TokenResult>,
    /// Attempts the worker made before this body was received
    #[serde(default)]
    pub retry_count: u32,
}

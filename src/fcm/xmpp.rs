//! XMPP connection server (CCS) ack/nack signals

use std::fmt;

use serde::{Deserialize, Serialize};

/// `error` field of a CCS nack
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignalCode {
    BadAck,
    BadRegistration,
    ConnectionDraining,
    DeviceMessageRateExceeded,
    DeviceUnregistered,
    InternalServerError,
    InvalidJson,
    ServiceUnavailable,
    TopicsMessageRateExceeded,
    Unknown(String),
}

impl SignalCode {
    pub fn as_str(&self) -> &str {
        match self {
            SignalCode::BadAck => "BAD_ACK",
            SignalCode::BadRegistration => "BAD_REGISTRATION",
            SignalCode::ConnectionDraining => "CONNECTION_DRAINING",
            SignalCode::DeviceMessageRateExceeded => "DEVICE_MESSAGE_RATE_EXCEEDED",
            SignalCode::DeviceUnregistered => "DEVICE_UNREGISTERED",
            SignalCode::InternalServerError => "INTERNAL_SERVER_ERROR",
            SignalCode::InvalidJson => "INVALID_JSON",
            SignalCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            SignalCode::TopicsMessageRateExceeded => "TOPICS_MESSAGE_RATE_EXCEEDED",
            SignalCode::Unknown(s) => s,
        }
    }

    pub fn bad_reg_id(&self) -> bool {
        matches!(
            self,
            SignalCode::BadRegistration | SignalCode::DeviceUnregistered
        )
    }

    pub fn temporary(&self) -> bool {
        matches!(
            self,
            SignalCode::ConnectionDraining
                | SignalCode::DeviceMessageRateExceeded
                | SignalCode::InternalServerError
                | SignalCode::ServiceUnavailable
                | SignalCode::TopicsMessageRateExceeded
        )
    }
}

impl From<String> for SignalCode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "BAD_ACK" => SignalCode::BadAck,
            "BAD_REGISTRATION" => SignalCode::BadRegistration,
            "CONNECTION_DRAINING" => SignalCode::ConnectionDraining,
            "DEVICE_MESSAGE_RATE_EXCEEDED" => SignalCode::DeviceMessageRateExceeded,
            "DEVICE_UNREGISTERED" => SignalCode::DeviceUnregistered,
            "INTERNAL_SERVER_ERROR" => SignalCode::InternalServerError,
            "INVALID_JSON" => SignalCode::InvalidJson,
            "SERVICE_UNAVAILABLE" => SignalCode::ServiceUnavailable,
            "TOPICS_MESSAGE_RATE_EXCEEDED" => SignalCode::TopicsMessageRateExceeded,
            _ => {
                tracing::warn!(
                    provider = "fcm",
                    code = %s,
                    "Unrecognized CCS nack code, treating as permanent"
                );
                SignalCode::Unknown(s)
            }
        }
    }
}

impl From<&str> for SignalCode {
    fn from(s: &str) -> Self {
        SignalCode::from(s.to_string())
    }
}

impl From<SignalCode> for String {
    fn from(c: SignalCode) -> Self {
        match c {
            SignalCode::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for SignalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An upstream ack or nack from CCS.
///
/// An ack may carry a canonical registration ID; a nack carries a code and
/// a human readable description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// ack only: canonical registration ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<String>,

    /// nack only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<SignalCode>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Signal {
    pub fn ack(registration_id: Option<String>) -> Self {
        Self {
            registration_id,
            ..Default::default()
        }
    }

    pub fn nack(code: impl Into<SignalCode>, description: impl Into<String>) -> Self {
        Self {
            registration_id: None,
            code: Some(code.into()),
            description: description.into(),
        }
    }

    pub fn is_ack(&self) -> bool {
        self.code.is_none()
    }

    pub fn bad_reg_id(&self) -> bool {
        self.code.as_ref().is_some_and(SignalCode::bad_reg_id)
    }

    pub fn temporary(&self) -> bool {
        self.code.as_ref().is_some_and(SignalCode::temporary)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.description.is_empty() {
            return f.write_str(&self.description);
        }
        match &self.code {
            Some(code) => write!(f, "{}", code),
            None => f.write_str("ack"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_registration_codes() {
        for code in ["BAD_REGISTRATION", "DEVICE_UNREGISTERED"] {
            let s = Signal::nack(code, "");
            assert!(s.bad_reg_id(), "{code}");
            assert!(!s.temporary(), "{code}");
        }
    }

    #[test]
    fn test_temporary_codes() {
        for code in [
            "CONNECTION_DRAINING",
            "DEVICE_MESSAGE_RATE_EXCEEDED",
            "INTERNAL_SERVER_ERROR",
            "SERVICE_UNAVAILABLE",
            "TOPICS_MESSAGE_RATE_EXCEEDED",
        ] {
            let s = Signal::nack(code, "");
            assert!(s.temporary(), "{code}");
            assert!(!s.bad_reg_id(), "{code}");
            assert_eq!(s.code.clone().map(String::from).as_deref(), Some(code));
        }
    }

    #[test]
    fn test_unknown_code_is_permanent() {
        let s = Signal::nack("SOMETHING_NEW", "");
        assert!(!s.temporary());
        assert!(!s.bad_reg_id());
        assert!(!Signal::nack("INVALID_JSON", "").temporary());
        assert!(!Signal::nack("BAD_ACK", "").temporary());
    }

    #[test]
    fn test_error_text() {
        assert_eq!(
            Signal::nack("BAD_REGISTRATION", "Invalid token").to_string(),
            "Invalid token"
        );
        assert_eq!(
            Signal::nack("BAD_REGISTRATION", "").to_string(),
            "BAD_REGISTRATION"
        );
    }

    #[test]
    fn test_ack() {
        let s = Signal::ack(Some("new-id".into()));
        assert!(s.is_ack());
        assert!(!s.bad_reg_id());
        assert!(!s.temporary());
    }
}

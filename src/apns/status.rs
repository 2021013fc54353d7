//! Status byte of the legacy binary interface's error-response packet

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Status {
    Success,
    ProcessingError,
    MissingToken,
    MissingTopic,
    MissingPayload,
    InvalidTokenSize,
    InvalidTopicSize,
    InvalidPayloadSize,
    InvalidToken,
    Shutdown,
    None,
    /// Byte outside the documented table
    Unknown(u8),
}

impl Status {
    pub fn code(&self) -> u8 {
        match self {
            Status::Success => 0,
            Status::ProcessingError => 1,
            Status::MissingToken => 2,
            Status::MissingTopic => 3,
            Status::MissingPayload => 4,
            Status::InvalidTokenSize => 5,
            Status::InvalidTopicSize => 6,
            Status::InvalidPayloadSize => 7,
            Status::InvalidToken => 8,
            Status::Shutdown => 10,
            Status::None => 255,
            Status::Unknown(b) => *b,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::ProcessingError => "apns: processing error",
            Status::MissingToken => "apns: missing device token",
            Status::MissingTopic => "apns: missing topic",
            Status::MissingPayload => "apns: missing payload",
            Status::InvalidTokenSize => "apns: invalid token size",
            Status::InvalidTopicSize => "apns: invalid topic size",
            Status::InvalidPayloadSize => "apns: invalid payload size",
            Status::InvalidToken => "apns: invalid token",
            Status::Shutdown => "apns: shutdown",
            Status::Success | Status::None | Status::Unknown(_) => "apns: none (unknown)",
        }
    }

    /// Gateway-side conditions that clear up on a fresh connection
    pub fn temporary(&self) -> bool {
        matches!(
            self,
            Status::ProcessingError | Status::Shutdown | Status::None
        )
    }
}

impl From<u8> for Status {
    fn from(b: u8) -> Self {
        match b {
            0 => Status::Success,
            1 => Status::ProcessingError,
            2 => Status::MissingToken,
            3 => Status::MissingTopic,
            4 => Status::MissingPayload,
            5 => Status::InvalidTokenSize,
            6 => Status::InvalidTopicSize,
            7 => Status::InvalidPayloadSize,
            8 => Status::InvalidToken,
            10 => Status::Shutdown,
            255 => Status::None,
            other => {
                tracing::warn!(provider = "apns", status = other, "Unrecognized APNs status byte");
                Status::Unknown(other)
            }
        }
    }
}

impl From<Status> for u8 {
    fn from(s: Status) -> Self {
        s.code()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_bytes_round_trip() {
        for b in [0u8, 1, 2, 3, 4, 5, 6, 7, 8, 10, 255] {
            let status = Status::from(b);
            assert!(!matches!(status, Status::Unknown(_)), "byte {b} should be known");
            assert_eq!(status.code(), b);
        }
        assert_eq!(Status::from(9), Status::Unknown(9));
        assert_eq!(Status::from(9).code(), 9);
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(Status::InvalidToken.to_string(), "apns: invalid token");
        assert_eq!(Status::MissingToken.to_string(), "apns: missing device token");
        assert_eq!(Status::Unknown(42).to_string(), "apns: none (unknown)");
        assert_eq!(Status::Success.to_string(), "apns: none (unknown)");
    }
}

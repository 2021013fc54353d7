//! Legacy feedback service: tokens APNs reports as no longer installed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Credential;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    /// Usually `feedback.push.apple.com:2196`
    pub addr: String,
    pub credential: Credential,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    #[serde(default)]
    pub body: Vec<Feedback>,
}

impl FeedbackResponse {
    /// Tokens to evict, paired with when APNs saw the app removed
    pub fn invalidated_tokens(&self) -> impl Iterator<Item = (String, DateTime<Utc>)> + '_ {
        self.body.iter().map(|f| (f.token_hex(), f.invalidated_at()))
    }
}

/// One feedback tuple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Unix seconds
    pub timestamp: u32,
    #[serde(with = "hex::serde")]
    pub token: Vec<u8>,
}

impl Feedback {
    pub fn invalidated_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(i64::from(self.timestamp), 0).unwrap_or_default()
    }

    pub fn token_hex(&self) -> String {
        hex::encode(&self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_tokens() {
        let response = FeedbackResponse {
            body: vec![Feedback {
                timestamp: 1_454_402_113,
                token: vec![0xde, 0xad, 0xbe, 0xef],
            }],
        };
        let tokens: Vec<_> = response.invalidated_tokens().collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].0, "deadbeef");
        assert_eq!(tokens[0].1.timestamp(), 1_454_402_113);
    }
}

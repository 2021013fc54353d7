//! Reason strings returned in the JSON body of HTTP/2 APNs errors

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Reason {
    BadCollapseId,
    BadDeviceToken,
    BadExpirationDate,
    BadMessageId,
    BadPriority,
    BadTopic,
    DeviceTokenNotForTopic,
    DuplicateHeaders,
    IdleTimeout,
    MissingDeviceToken,
    MissingTopic,
    PayloadEmpty,
    TopicDisallowed,
    BadCertificate,
    BadCertificateEnvironment,
    ExpiredProviderToken,
    Forbidden,
    InvalidProviderToken,
    MissingProviderToken,
    BadPath,
    MethodNotAllowed,
    Unregistered,
    PayloadTooLarge,
    TooManyProviderTokenUpdates,
    TooManyRequests,
    InternalServerError,
    ServiceUnavailable,
    Shutdown,
    Unknown(String),
}

/// Every documented reason, in Apple's table order
pub const ALL_REASONS: [Reason; 28] = [
    Reason::BadCollapseId,
    Reason::BadDeviceToken,
    Reason::BadExpirationDate,
    Reason::BadMessageId,
    Reason::BadPriority,
    Reason::BadTopic,
    Reason::DeviceTokenNotForTopic,
    Reason::DuplicateHeaders,
    Reason::IdleTimeout,
    Reason::MissingDeviceToken,
    Reason::MissingTopic,
    Reason::PayloadEmpty,
    Reason::TopicDisallowed,
    Reason::BadCertificate,
    Reason::BadCertificateEnvironment,
    Reason::ExpiredProviderToken,
    Reason::Forbidden,
    Reason::InvalidProviderToken,
    Reason::MissingProviderToken,
    Reason::BadPath,
    Reason::MethodNotAllowed,
    Reason::Unregistered,
    Reason::PayloadTooLarge,
    Reason::TooManyProviderTokenUpdates,
    Reason::TooManyRequests,
    Reason::InternalServerError,
    Reason::ServiceUnavailable,
    Reason::Shutdown,
];

impl Reason {
    pub fn as_str(&self) -> &str {
        match self {
            Reason::BadCollapseId => "BadCollapseId",
            Reason::BadDeviceToken => "BadDeviceToken",
            Reason::BadExpirationDate => "BadExpirationDate",
            Reason::BadMessageId => "BadMessageId",
            Reason::BadPriority => "BadPriority",
            Reason::BadTopic => "BadTopic",
            Reason::DeviceTokenNotForTopic => "DeviceTokenNotForTopic",
            Reason::DuplicateHeaders => "DuplicateHeaders",
            Reason::IdleTimeout => "IdleTimeout",
            Reason::MissingDeviceToken => "MissingDeviceToken",
            Reason::MissingTopic => "MissingTopic",
            Reason::PayloadEmpty => "PayloadEmpty",
            Reason::TopicDisallowed => "TopicDisallowed",
            Reason::BadCertificate => "BadCertificate",
            Reason::BadCertificateEnvironment => "BadCertificateEnvironment",
            Reason::ExpiredProviderToken => "ExpiredProviderToken",
            Reason::Forbidden => "Forbidden",
            Reason::InvalidProviderToken => "InvalidProviderToken",
            Reason::MissingProviderToken => "MissingProviderToken",
            Reason::BadPath => "BadPath",
            Reason::MethodNotAllowed => "MethodNotAllowed",
            Reason::Unregistered => "Unregistered",
            Reason::PayloadTooLarge => "PayloadTooLarge",
            Reason::TooManyProviderTokenUpdates => "TooManyProviderTokenUpdates",
            Reason::TooManyRequests => "TooManyRequests",
            Reason::InternalServerError => "InternalServerError",
            Reason::ServiceUnavailable => "ServiceUnavailable",
            Reason::Shutdown => "Shutdown",
            Reason::Unknown(s) => s,
        }
    }

    /// Apple's description of the reason; empty for unknown reasons
    pub fn detail(&self) -> &'static str {
        match self {
            Reason::BadCollapseId => "The collapse identifier exceeds the maximum allowed size",
            Reason::BadDeviceToken => "The specified device token was bad. Verify that the request contains a valid token and that the token matches the environment.",
            Reason::BadExpirationDate => "The apns-expiration value is bad.",
            Reason::BadMessageId => "The apns-id value is bad.",
            Reason::BadPriority => "The apns-priority value is bad.",
            Reason::BadTopic => "The apns-topic was invalid.",
            Reason::DeviceTokenNotForTopic => "The device token does not match the specified topic.",
            Reason::DuplicateHeaders => "One or more headers were repeated.",
            Reason::IdleTimeout => "Idle time out.",
            Reason::MissingDeviceToken => "The device token is not specified in the request :path. Verify that the :path header contains the device token.",
            Reason::MissingTopic => "The apns-topic header of the request was not specified and was required. The apns-topic header is mandatory when the client is connected using a certificate that supports multiple topics.",
            Reason::PayloadEmpty => "The message payload was empty.",
            Reason::TopicDisallowed => "Pushing to this topic is not allowed.",
            Reason::BadCertificate => "The certificate was bad.",
            Reason::BadCertificateEnvironment => "The client certificate was for the wrong environment.",
            Reason::ExpiredProviderToken => "The provider token is stale and a new token should be generated.",
            Reason::Forbidden => "The specified action is not allowed.",
            Reason::InvalidProviderToken => "The provider token is not valid or the token signature could not be verified.",
            Reason::MissingProviderToken => "No provider certificate was used to connect to http and Authorization header was missing or no provider token was specified.",
            Reason::BadPath => "The request contained a bad :path value.",
            Reason::MethodNotAllowed => "The specified :method was not POST.",
            Reason::Unregistered => "The device token is inactive for the specified topic.",
            Reason::PayloadTooLarge => "The message payload was too large. For regular remote notifications, the maximum size is 4KB. For VoIP notifications, the maximum size is 5KB.",
            Reason::TooManyProviderTokenUpdates => "The provider token is being updated too often.",
            Reason::TooManyRequests => "Too many requests were made consecutively to the same device token.",
            Reason::InternalServerError => "An internal server error occurred.",
            Reason::ServiceUnavailable => "The service is unavailable.",
            Reason::Shutdown => "The server is shutting down.",
            Reason::Unknown(_) => "",
        }
    }

    /// Reasons worth another attempt; provider token expiry is fixed by
    /// signing a new token before resending.
    pub fn temporary(&self) -> bool {
        matches!(
            self,
            Reason::IdleTimeout
                | Reason::ExpiredProviderToken
                | Reason::TooManyProviderTokenUpdates
                | Reason::TooManyRequests
                | Reason::InternalServerError
                | Reason::ServiceUnavailable
                | Reason::Shutdown
        )
    }
}

impl From<String> for Reason {
    fn from(s: String) -> Self {
        if let Some(known) = ALL_REASONS.iter().find(|r| r.as_str() == s) {
            return known.clone();
        }
        tracing::warn!(provider = "apns", reason = %s, "Unrecognized APNs reason");
        Reason::Unknown(s)
    }
}

impl From<&str> for Reason {
    fn from(s: &str) -> Self {
        Reason::from(s.to_string())
    }
}

impl From<Reason> for String {
    fn from(r: Reason) -> Self {
        match r {
            Reason::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

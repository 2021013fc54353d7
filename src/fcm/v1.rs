//! HTTP v1 API (`/v1/projects/*/messages:send`) errors

use std::fmt;

use serde::{Deserialize, Serialize};

const FCM_ERROR_TYPE: &str = "type.googleapis.com/google.firebase.fcm.v1.FcmError";

/// Error status from Google's RPC code vocabulary plus FCM's own codes.
///
/// Values outside the known set are kept verbatim in [`ApiStatus::Unknown`]
/// and classify as [`ApiStatus::Internal`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApiStatus {
    NotFound,
    Unregistered,
    Unavailable,
    Internal,
    QuotaExceeded,
    InvalidArgument,
    PermissionDenied,
    Unauthenticated,
    ApnsAuthError,
    SenderIdMismatch,
    Unknown(String),
}

impl ApiStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ApiStatus::NotFound => "NOT_FOUND",
            ApiStatus::Unregistered => "UNREGISTERED",
            ApiStatus::Unavailable => "UNAVAILABLE",
            ApiStatus::Internal => "INTERNAL",
            ApiStatus::QuotaExceeded => "QUOTA_EXCEEDED",
            ApiStatus::InvalidArgument => "INVALID_ARGUMENT",
            ApiStatus::PermissionDenied => "PERMISSION_DENIED",
            ApiStatus::Unauthenticated => "UNAUTHENTICATED",
            ApiStatus::ApnsAuthError => "APNS_AUTH_ERROR",
            ApiStatus::SenderIdMismatch => "SENDER_ID_MISMATCH",
            ApiStatus::Unknown(s) => s,
        }
    }

    /// The status used for classification
    pub fn normalized(&self) -> &ApiStatus {
        match self {
            ApiStatus::Unknown(_) => &ApiStatus::Internal,
            known => known,
        }
    }

    /// Request parameters or credentials are wrong; resending cannot help
    pub fn invalid_parameter(&self) -> bool {
        matches!(
            self.normalized(),
            ApiStatus::PermissionDenied
                | ApiStatus::Unauthenticated
                | ApiStatus::ApnsAuthError
                | ApiStatus::InvalidArgument
                | ApiStatus::SenderIdMismatch
        )
    }

    pub fn bad_reg_id(&self) -> bool {
        matches!(
            self.normalized(),
            ApiStatus::NotFound | ApiStatus::Unregistered
        )
    }

    pub fn temporary(&self) -> bool {
        !self.bad_reg_id() && !self.invalid_parameter()
    }
}

impl From<String> for ApiStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "NOT_FOUND" => ApiStatus::NotFound,
            "UNREGISTERED" => ApiStatus::Unregistered,
            "UNAVAILABLE" => ApiStatus::Unavailable,
            "INTERNAL" => ApiStatus::Internal,
            "QUOTA_EXCEEDED" => ApiStatus::QuotaExceeded,
            "INVALID_ARGUMENT" => ApiStatus::InvalidArgument,
            "PERMISSION_DENIED" => ApiStatus::PermissionDenied,
            "UNAUTHENTICATED" => ApiStatus::Unauthenticated,
            "APNS_AUTH_ERROR" => ApiStatus::ApnsAuthError,
            "SENDER_ID_MISMATCH" => ApiStatus::SenderIdMismatch,
            _ => {
                tracing::warn!(
                    provider = "fcm",
                    status = %s,
                    "Unrecognized FCM v1 status, classifying as INTERNAL"
                );
                ApiStatus::Unknown(s)
            }
        }
    }
}

impl From<&str> for ApiStatus {
    fn from(s: &str) -> Self {
        ApiStatus::from(s.to_string())
    }
}

impl From<ApiStatus> for String {
    fn from(s: ApiStatus) -> Self {
        match s {
            ApiStatus::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by the HTTP v1 send endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status code
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    pub status: ApiStatus,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    error: EnvelopeError,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<EnvelopeDetail>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeDetail {
    #[serde(rename = "@type", default)]
    type_url: String,
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
}

impl ApiError {
    pub fn new(code: u16, status: impl Into<ApiStatus>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: status.into(),
        }
    }

    /// Decode Google's `{"error": {...}}` envelope.
    ///
    /// FCM's own `errorCode` detail is more specific than the RPC status
    /// (`UNREGISTERED` arrives as `NOT_FOUND` plus a detail), so it wins when
    /// present. Bodies without a decodable envelope (proxy error pages, empty
    /// bodies) still produce an error carrying the HTTP status and an empty
    /// unknown status, which classifies as `INTERNAL`.
    pub fn from_response_body(status_code: u16, body: &str) -> Self {
        let error = match serde_json::from_str::<Envelope>(body) {
            Ok(envelope) => envelope.error,
            Err(e) => {
                tracing::warn!(
                    provider = "fcm",
                    status_code,
                    error = %e,
                    "Undecodable FCM v1 error body"
                );
                return Self {
                    code: status_code,
                    message: String::new(),
                    status: ApiStatus::Unknown(String::new()),
                };
            }
        };
        let fcm_code = error
            .details
            .into_iter()
            .find(|d| d.type_url == FCM_ERROR_TYPE)
            .and_then(|d| d.error_code);
        let status = fcm_code
            .or(error.status)
            .unwrap_or_else(|| ApiStatus::Internal.as_str().to_string());
        Self {
            code: if error.code == 0 { status_code } else { error.code },
            message: error.message,
            status: ApiStatus::from(status),
        }
    }

    pub fn bad_reg_id(&self) -> bool {
        self.status.bad_reg_id()
    }

    pub fn temporary(&self) -> bool {
        self.status.temporary()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{} {}", self.code, self.status)
        } else {
            write!(f, "{} {}: {}", self.code, self.status, self.message)
        }
    }
}

impl std::error::Error for ApiError {}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Unsupported endpoint {addr}: {reason}")]
    Endpoint { addr: String, reason: String },

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Invalid device token: {0}")]
    TokenDecode(#[from] hex::FromHexError),

    #[error("Key decoding error: {0}")]
    KeyDecode(#[from] base64::DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Telemetry error: {0}")]
    Telemetry(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl GatewayError {
    pub fn endpoint(addr: impl Into<String>, reason: impl Into<String>) -> Self {
        GatewayError::Endpoint {
            addr: addr.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

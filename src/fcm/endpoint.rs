//! Which FCM wire protocol an endpoint speaks.
//!
//! One request type serves three protocols, so the worker decides how to
//! decode responses from the configured endpoint alone.

use std::fmt;

use url::Url;

use crate::error::{GatewayError, Result};

/// Protocol generation behind an endpoint.
///
/// Ordered so that everything below [`ProtocolVersion::Xmpp`] is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i8)]
pub enum ProtocolVersion {
    /// The endpoint names the retired GCM service
    GcmEndpoint = -2,
    /// Unparseable, or not recognisable as any FCM protocol
    Unrecognized = -1,
    /// XMPP connection server, addressed as `host:port`
    Xmpp = 0,
    /// Legacy HTTP, `…/fcm/send`
    LegacyHttp = 1,
    /// HTTP v1, `…/v1/projects/*/messages:send`
    HttpV1 = 2,
}

impl ProtocolVersion {
    pub fn as_i8(&self) -> i8 {
        *self as i8
    }

    pub fn is_supported(&self) -> bool {
        *self >= ProtocolVersion::Xmpp
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolVersion::GcmEndpoint => "gcm-endpoint",
            ProtocolVersion::Unrecognized => "unrecognized",
            ProtocolVersion::Xmpp => "xmpp",
            ProtocolVersion::LegacyHttp => "legacy-http",
            ProtocolVersion::HttpV1 => "http-v1",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an endpoint address.
///
/// `fcm-xmpp.googleapis.com:5235` parses as a URL whose scheme is the host
/// name and whose path is the port, which is how XMPP addresses are told
/// apart from HTTP URLs.
pub fn protocol_version(addr: &str) -> ProtocolVersion {
    let url = match Url::parse(addr) {
        Ok(url) => url,
        Err(_) => return ProtocolVersion::Unrecognized,
    };

    if url.scheme().contains("gcm") || url.host_str().is_some_and(|h| h.contains("gcm")) {
        return ProtocolVersion::GcmEndpoint;
    }

    if url.cannot_be_a_base() {
        return if url.scheme().contains("xmpp") {
            ProtocolVersion::Xmpp
        } else {
            ProtocolVersion::Unrecognized
        };
    }

    let path = url.path();
    if path.contains("/v1/") {
        ProtocolVersion::HttpV1
    } else if path.contains("/fcm/") {
        ProtocolVersion::LegacyHttp
    } else {
        ProtocolVersion::Unrecognized
    }
}

/// Like [`protocol_version`], but unusable endpoints become errors
pub fn detect(addr: &str) -> Result<ProtocolVersion> {
    match protocol_version(addr) {
        ProtocolVersion::GcmEndpoint => Err(GatewayError::endpoint(
            addr,
            "GCM endpoints are shut down; use fcm.googleapis.com",
        )),
        ProtocolVersion::Unrecognized => Err(GatewayError::endpoint(
            addr,
            "not an FCM HTTP v1, legacy HTTP or XMPP endpoint",
        )),
        version => Ok(version),
    }
}

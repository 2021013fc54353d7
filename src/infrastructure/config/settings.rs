use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::apns;
use crate::delivery::Bandwidth;
use crate::error::{GatewayError, Result};
use crate::fcm;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub apns: ApnsEndpointConfig,
    #[serde(default)]
    pub fcm: FcmEndpointConfig,
    #[serde(default)]
    pub adm: AdmEndpointConfig,
    #[serde(default)]
    pub webpush: WebPushConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Dump Prometheus metrics to stderr when the classifier exits
    #[serde(default)]
    pub print_metrics: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApnsEndpointConfig {
    /// `https://…` for HTTP/2, bare `host:port` for the binary interface
    #[serde(default = "default_apns_addr")]
    pub addr: String,
    #[serde(default)]
    pub bandwidth: Bandwidth,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcmEndpointConfig {
    #[serde(default = "default_fcm_url")]
    pub url: String,
    #[serde(default)]
    pub bandwidth: Bandwidth,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdmEndpointConfig {
    #[serde(default = "default_adm_origin")]
    pub origin_url: String,
    #[serde(default)]
    pub bandwidth: Bandwidth,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebPushConfig {
    #[serde(default)]
    pub bandwidth: Bandwidth,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_apns_addr() -> String {
    "https://api.push.apple.com".to_string()
}

fn default_fcm_url() -> String {
    "https://fcm.googleapis.com/fcm/send".to_string()
}

fn default_adm_origin() -> String {
    "https://api.amazon.com".to_string()
}

impl Settings {
    pub fn new() -> std::result::Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("log.level", default_log_level())?
            .set_default("apns.addr", default_apns_addr())?
            .set_default("fcm.url", default_fcm_url())?
            .set_default("adm.origin_url", default_adm_origin())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // PUSHGATE__FCM__URL, PUSHGATE__LOG__FORMAT, etc.
            .add_source(
                Environment::with_prefix("PUSHGATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Reject endpoints no worker could talk to
    pub fn validate(&self) -> Result<()> {
        let version = fcm::detect(&self.fcm.url)?;
        tracing::info!(url = %self.fcm.url, protocol = %version, "FCM endpoint");

        if apns::is_legacy_addr(&self.apns.addr) {
            tracing::warn!(
                addr = %self.apns.addr,
                "APNs endpoint uses the legacy binary interface"
            );
        }

        if !self.adm.origin_url.starts_with("https://") && !self.adm.origin_url.starts_with("http://") {
            return Err(GatewayError::endpoint(
                &self.adm.origin_url,
                "ADM origin must be an http(s) URL",
            ));
        }
        Ok(())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            print_metrics: false,
        }
    }
}

impl Default for ApnsEndpointConfig {
    fn default() -> Self {
        Self {
            addr: default_apns_addr(),
            bandwidth: Bandwidth::UNLIMITED,
        }
    }
}

impl Default for FcmEndpointConfig {
    fn default() -> Self {
        Self {
            url: default_fcm_url(),
            bandwidth: Bandwidth::UNLIMITED,
        }
    }
}

impl Default for AdmEndpointConfig {
    fn default() -> Self {
        Self {
            origin_url: default_adm_origin(),
            bandwidth: Bandwidth::UNLIMITED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.log.level, "info");
        assert_eq!(settings.log.format, LogFormat::Pretty);
        assert_eq!(settings.fcm.url, "https://fcm.googleapis.com/fcm/send");
        assert!(settings.fcm.bandwidth.is_unlimited());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_gcm_endpoint() {
        let mut settings = Settings::default();
        settings.fcm.url = "https://gcm-http.googleapis.com/gcm/send".to_string();
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, GatewayError::Endpoint { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_adm_origin() {
        let mut settings = Settings::default();
        settings.adm.origin_url = "api.amazon.com".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_deserialize_from_source() {
        let settings: Settings = Config::builder()
            .add_source(config::File::from_str(
                r#"
                [log]
                format = "json"

                [apns]
                addr = "gateway.push.apple.com:2195"
                bandwidth = 500
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.log.format, LogFormat::Json);
        assert_eq!(settings.apns.bandwidth.per_second(), Some(500));
        assert!(apns::is_legacy_addr(&settings.apns.addr));
        assert_eq!(settings.fcm.url, "https://fcm.googleapis.com/fcm/send");
    }
}

//! Provider-tagged worker responses, as read by the classifier tool.
//!
//! ```json
//! {"provider": "webpush", "failed_messages": [ ... ]}
//! ```

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::delivery::{self, OutcomeSummary, Provider, ProviderError};
use crate::{adm, apns, fcm, webpush};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ProviderResponse {
    Adm(adm::Response),
    Apns(apns::Response),
    Fcm(fcm::Response),
    #[serde(rename = "webpush")]
    WebPush(webpush::Response),
}

impl ProviderResponse {
    pub fn provider(&self) -> Provider {
        match self {
            ProviderResponse::Adm(_) => Provider::Adm,
            ProviderResponse::Apns(_) => Provider::Apns,
            ProviderResponse::Fcm(_) => Provider::Fcm,
            ProviderResponse::WebPush(_) => Provider::WebPush,
        }
    }

    pub fn summaries(&self) -> Vec<OutcomeSummary> {
        let provider = self.provider();
        match self {
            ProviderResponse::Adm(r) => summarize(provider, r),
            ProviderResponse::Apns(r) => summarize(provider, r),
            ProviderResponse::Fcm(r) => summarize(provider, r),
            ProviderResponse::WebPush(r) => summarize(provider, r),
        }
    }

    pub fn record_metrics(&self) {
        let provider = self.provider();
        match self {
            ProviderResponse::Adm(r) => r.record_metrics(provider),
            ProviderResponse::Apns(r) => r.record_metrics(provider),
            ProviderResponse::Fcm(r) => r.record_metrics(provider),
            ProviderResponse::WebPush(r) => r.record_metrics(provider),
        }
    }
}

fn summarize<M, E>(provider: Provider, response: &delivery::Response<M, E>) -> Vec<OutcomeSummary>
where
    E: ProviderError + Display,
{
    response.iter().map(|f| f.summary(provider)).collect()
}

mod settings;

pub use settings::{
    AdmEndpointConfig, ApnsEndpointConfig, FcmEndpointConfig, LogConfig, LogFormat, Settings,
    WebPushConfig,
};

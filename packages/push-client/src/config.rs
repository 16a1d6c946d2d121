use dotenvy::dotenv;
use std::env;

use crate::error::{PushError, Result};
use crate::types::DeviceId;

pub const DEFAULT_PUSH_SERVER_URL: &str = "https://push2.edge.app";

/// Push-server connection settings.
///
/// The device id is read once by the host when the process starts and never
/// re-fetched; the client only ever sees the value stored here.
#[derive(Debug, Clone)]
pub struct PushConfig {
    pub base_url: String,
    pub api_key: String,
    pub device_id: DeviceId,
}

impl PushConfig {
    pub fn new(api_key: impl Into<String>, device_id: DeviceId) -> Self {
        Self {
            base_url: DEFAULT_PUSH_SERVER_URL.to_string(),
            api_key: api_key.into(),
            device_id,
        }
    }

    /// Point at a different push server (staging, local mock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let api_key = env::var("PUSH_API_KEY")
            .map_err(|_| PushError::Config("PUSH_API_KEY must be set".into()))?;
        let device_id = env::var("PUSH_DEVICE_ID")
            .map_err(|_| PushError::Config("PUSH_DEVICE_ID must be set".into()))?;
        let base_url =
            env::var("PUSH_SERVER_URL").unwrap_or_else(|_| DEFAULT_PUSH_SERVER_URL.to_string());

        Ok(Self::new(api_key, DeviceId::new(device_id)).with_base_url(base_url))
    }
}

//! Pure push-server REST client.
//!
//! A minimal client for the action-queue push server. Supports reading the
//! event states registered for a login and creating or removing events.
//!
//! # Example
//!
//! ```rust,ignore
//! use push_client::{DeviceId, LoginId, PushClient, PushConfig};
//!
//! let client = PushClient::new(PushConfig::new("api-key", DeviceId::new("device")));
//! let login_id = LoginId::new(login_id_bytes);
//!
//! client.upload_events(&login_id, &events).await?;
//! let done = client.check_events(&login_id, &["program:done".into()]).await?;
//! ```

pub mod config;
pub mod error;
pub mod types;

pub use config::{PushConfig, DEFAULT_PUSH_SERVER_URL};
pub use error::{ErrorBody, PushError, Result, ServerError};
pub use types::{
    BroadcastTx, DeviceId, LoginId, LoginStatus, NewPushEvent, PushEventState, PushEventStatus,
    PushMessage, PushTrigger,
};

use serde::Serialize;
use types::{LoginRequest, LoginUpdate};

pub struct PushClient {
    client: reqwest::Client,
    config: PushConfig,
}

impl PushClient {
    pub fn new(config: PushConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    /// Fetch every event the server holds for this login.
    pub async fn login_status(&self, login_id: &LoginId) -> Result<LoginStatus> {
        let text = self.post::<()>("/v2/login", login_id, None).await?;
        let status: LoginStatus = serde_json::from_str(&text)?;
        tracing::debug!(events = status.events.len(), "Fetched login status");
        Ok(status)
    }

    /// True only if every requested event has triggered or completed.
    ///
    /// An id the server does not know about counts as not fired.
    // TODO: confirm with product whether an unknown id should be retried
    // later instead of failing the check outright.
    pub async fn check_events(&self, login_id: &LoginId, event_ids: &[String]) -> Result<bool> {
        let status = self.login_status(login_id).await?;
        let settled = status.all_settled(event_ids);
        tracing::debug!(requested = event_ids.len(), settled, "Checked push events");
        Ok(settled)
    }

    /// Register new events with the server.
    pub async fn upload_events(&self, login_id: &LoginId, events: &[NewPushEvent]) -> Result<()> {
        tracing::info!(count = events.len(), "Uploading push events");
        self.update(login_id, events, &[]).await
    }

    /// Remove previously registered events.
    pub async fn remove_events(&self, login_id: &LoginId, event_ids: &[String]) -> Result<()> {
        tracing::info!(count = event_ids.len(), "Removing push events");
        self.update(login_id, &[], event_ids).await
    }

    async fn update(
        &self,
        login_id: &LoginId,
        create_events: &[NewPushEvent],
        remove_events: &[String],
    ) -> Result<()> {
        let data = LoginUpdate {
            create_events,
            remove_events,
        };
        self.post("/v2/login/update", login_id, Some(data)).await?;
        Ok(())
    }

    async fn post<T: Serialize>(
        &self,
        path: &str,
        login_id: &LoginId,
        data: Option<T>,
    ) -> Result<String> {
        let body = LoginRequest {
            api_key: &self.config.api_key,
            device_id: &self.config.device_id,
            login_id,
            data,
        };

        let url = format!("{}{}", self.config.base_url, path);
        let resp = self.client.post(&url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let body = ErrorBody::from_text(text);
            tracing::error!(
                %url,
                status = status.as_u16(),
                error = %body,
                "Push server request failed"
            );
            return Err(PushError::Transport {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_keeps_config() {
        let client = PushClient::new(
            PushConfig::new("key", DeviceId::new("device-1")).with_base_url("http://localhost"),
        );
        assert_eq!(client.config().api_key, "key");
        assert_eq!(client.config().base_url, "http://localhost");
    }
}

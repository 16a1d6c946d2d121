//! Push scheduling facade: a wallet lookup bound to a push-server client.

use push_client::{LoginId, NewPushEvent, PushClient, PushMessage};

use crate::assembler::build_events;
use crate::error::Result;
use crate::traits::WalletLookup;
use crate::trigger::can_trigger;
use crate::types::{ActionEffect, ExecutionOutput};

pub struct PushScheduler<W> {
    client: PushClient,
    wallets: W,
}

impl<W: WalletLookup> PushScheduler<W> {
    pub fn new(client: PushClient, wallets: W) -> Self {
        Self { client, wallets }
    }

    pub fn client(&self) -> &PushClient {
        &self.client
    }

    pub fn wallets(&self) -> &W {
        &self.wallets
    }

    /// True only if every event has triggered or completed on the server.
    pub async fn check_events(&self, login_id: &LoginId, event_ids: &[String]) -> Result<bool> {
        Ok(self.client.check_events(login_id, event_ids).await?)
    }

    /// Pre-check before scheduling: can the server watch for this effect?
    pub async fn can_trigger(&self, effect: &ActionEffect) -> Result<bool> {
        can_trigger(&self.wallets, effect).await
    }

    pub async fn prepare_events(
        &self,
        program_id: &str,
        init_effect: &ActionEffect,
        outputs: &[ExecutionOutput],
        push_message: Option<&PushMessage>,
    ) -> Result<Vec<NewPushEvent>> {
        build_events(&self.wallets, program_id, init_effect, outputs, push_message).await
    }

    pub async fn upload_events(&self, login_id: &LoginId, events: &[NewPushEvent]) -> Result<()> {
        Ok(self.client.upload_events(login_id, events).await?)
    }

    pub async fn remove_events(&self, login_id: &LoginId, event_ids: &[String]) -> Result<()> {
        Ok(self.client.remove_events(login_id, event_ids).await?)
    }

    /// Assemble and upload a program's events in one go. Returns the event
    /// ids in step order; nothing is uploaded if assembly fails.
    pub async fn schedule(
        &self,
        login_id: &LoginId,
        program_id: &str,
        init_effect: &ActionEffect,
        outputs: &[ExecutionOutput],
        push_message: Option<&PushMessage>,
    ) -> Result<Vec<String>> {
        let events = self
            .prepare_events(program_id, init_effect, outputs, push_message)
            .await?;
        self.upload_events(login_id, &events).await?;

        tracing::info!(program_id, events = events.len(), "Scheduled push events");
        Ok(events.into_iter().map(|event| event.event_id).collect())
    }
}

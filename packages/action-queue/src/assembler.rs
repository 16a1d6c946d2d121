//! Push-event assembly from dry-run outputs.
//!
//! Each event fires *before* its step runs, so its trigger comes from the
//! previous step's resulting effect (or the program's initial effect for the
//! first step). The step's own effect only addresses the event.

use futures::future::try_join_all;
use push_client::{BroadcastTx, NewPushEvent, PushMessage};

use crate::call_stack::partial_call_stack_id;
use crate::error::{ActionQueueError, Result};
use crate::traits::WalletLookup;
use crate::trigger::{effect_to_trigger, partial_effect_to_trigger};
use crate::types::{ActionEffect, ExecutionOutput, PendingBroadcast};

/// Build one push event per dry-run output, in output order.
///
/// `push_message` goes on the last event only, so the device is notified
/// once the whole chain has run. Any step whose predecessor effect has no
/// trigger fails the whole batch.
pub async fn build_events<W>(
    wallets: &W,
    program_id: &str,
    init_effect: &ActionEffect,
    outputs: &[ExecutionOutput],
    push_message: Option<&PushMessage>,
) -> Result<Vec<NewPushEvent>>
where
    W: WalletLookup + ?Sized,
{
    let last = outputs.len().checked_sub(1);

    let steps = outputs.iter().enumerate().map(|(index, output)| {
        let message = if Some(index) == last {
            push_message.cloned()
        } else {
            None
        };
        build_event(wallets, program_id, init_effect, outputs, index, output, message)
    });

    // try_join_all keeps results in input order whatever order steps finish in
    let events = try_join_all(steps).await?;

    tracing::info!(program_id, events = events.len(), "Assembled push events");
    Ok(events)
}

async fn build_event<W>(
    wallets: &W,
    program_id: &str,
    init_effect: &ActionEffect,
    outputs: &[ExecutionOutput],
    index: usize,
    output: &ExecutionOutput,
    push_message: Option<PushMessage>,
) -> Result<NewPushEvent>
where
    W: WalletLookup + ?Sized,
{
    let event_id = format!("{}:{}", program_id, partial_call_stack_id(&output.effect)?);

    let broadcast_txs = encode_broadcasts(wallets, &output.broadcast_txs).await?;

    let (trigger, prev_type) = match index {
        0 => (
            effect_to_trigger(wallets, init_effect).await?,
            init_effect.type_name(),
        ),
        _ => {
            let prev_effect = &outputs[index - 1].effect;
            (
                partial_effect_to_trigger(wallets, prev_effect).await?,
                prev_effect.type_name(),
            )
        }
    };
    let trigger = trigger.ok_or(ActionQueueError::UnsupportedEffect {
        effect_type: prev_type,
    })?;

    tracing::debug!(
        %event_id,
        trigger = trigger.type_name(),
        broadcasts = broadcast_txs.len(),
        "Built push event"
    );

    Ok(NewPushEvent {
        event_id,
        broadcast_txs,
        push_message,
        recurring: false,
        trigger,
    })
}

async fn encode_broadcasts<W>(wallets: &W, pending: &[PendingBroadcast]) -> Result<Vec<BroadcastTx>>
where
    W: WalletLookup + ?Sized,
{
    try_join_all(pending.iter().map(|tx| async move {
        let wallet = wallets.wallet(&tx.wallet_id).await?;
        Ok::<_, ActionQueueError>(BroadcastTx {
            plugin_id: wallet.plugin_id().to_string(),
            raw_tx: hex::encode(&tx.signed_tx),
        })
    }))
    .await
}

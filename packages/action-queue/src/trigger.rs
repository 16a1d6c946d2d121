//! Effect to push-trigger conversion.

use futures::future::{BoxFuture, FutureExt};
use push_client::PushTrigger;

use crate::error::{ActionQueueError, Result};
use crate::traits::WalletLookup;
use crate::types::{
    ActionEffect, AddressBalanceEffect, EffectSlot, PartialEffect, PriceLevelEffect,
    TxConfsEffect,
};

/// Convert an effect into the trigger the push server understands.
///
/// `seq` wrappers are looked through. `par`, `push-events`, `unixtime`,
/// `done` and `noop` have no server-side representation and yield `None`;
/// `push-events` in particular would make an event wait on itself.
pub fn effect_to_trigger<'a, W>(
    wallets: &'a W,
    effect: &'a ActionEffect,
) -> BoxFuture<'a, Result<Option<PushTrigger>>>
where
    W: WalletLookup + ?Sized,
{
    async move {
        match effect {
            ActionEffect::Seq { child_effect, .. } => {
                effect_to_trigger(wallets, child_effect).await
            }
            ActionEffect::AddressBalance(balance) => {
                address_balance_trigger(wallets, balance).await.map(Some)
            }
            ActionEffect::PriceLevel(level) => Ok(Some(price_level_trigger(level))),
            ActionEffect::TxConfs(confs) => tx_confs_trigger(wallets, confs).await.map(Some),
            ActionEffect::Par { .. }
            | ActionEffect::Done(_)
            | ActionEffect::Noop
            | ActionEffect::PushEvents(_)
            | ActionEffect::Unixtime(_) => Ok(None),
        }
    }
    .boxed()
}

/// Convert a dry-run effect without narrowing the whole tree.
///
/// Only the `seq` chain is walked, so a pending `seq` child is an invariant
/// violation while a `par` yields `None` whatever its children hold.
pub fn partial_effect_to_trigger<'a, W>(
    wallets: &'a W,
    effect: &'a PartialEffect,
) -> BoxFuture<'a, Result<Option<PushTrigger>>>
where
    W: WalletLookup + ?Sized,
{
    async move {
        match effect {
            PartialEffect::Seq {
                op_index,
                child_effect,
            } => match child_effect {
                EffectSlot::Ready(child) => partial_effect_to_trigger(wallets, child).await,
                EffectSlot::Pending => Err(ActionQueueError::InvariantViolation(format!(
                    "seq effect at opIndex {} has a pending child",
                    op_index
                ))),
            },
            PartialEffect::AddressBalance(balance) => {
                address_balance_trigger(wallets, balance).await.map(Some)
            }
            PartialEffect::PriceLevel(level) => Ok(Some(price_level_trigger(level))),
            PartialEffect::TxConfs(confs) => tx_confs_trigger(wallets, confs).await.map(Some),
            PartialEffect::Par { .. }
            | PartialEffect::Done(_)
            | PartialEffect::Noop
            | PartialEffect::PushEvents(_)
            | PartialEffect::Unixtime(_) => Ok(None),
        }
    }
    .boxed()
}

/// Whether the push server can watch for this effect at all.
pub async fn can_trigger<W>(wallets: &W, effect: &ActionEffect) -> Result<bool>
where
    W: WalletLookup + ?Sized,
{
    Ok(effect_to_trigger(wallets, effect).await?.is_some())
}

async fn address_balance_trigger<W>(
    wallets: &W,
    balance: &AddressBalanceEffect,
) -> Result<PushTrigger>
where
    W: WalletLookup + ?Sized,
{
    let wallet = wallets.wallet(&balance.wallet_id).await?;
    tracing::debug!(
        wallet_id = %balance.wallet_id,
        plugin_id = wallet.plugin_id(),
        "Converted address-balance effect"
    );
    Ok(PushTrigger::AddressBalance {
        plugin_id: wallet.plugin_id().to_string(),
        token_id: balance.token_id.clone(),
        address: balance.address.clone(),
        above_amount: balance.above_amount.clone(),
        below_amount: balance.below_amount.clone(),
    })
}

fn price_level_trigger(level: &PriceLevelEffect) -> PushTrigger {
    PushTrigger::PriceLevel {
        currency_pair: level.currency_pair.clone(),
        above_rate: level.above_rate,
        below_rate: level.below_rate,
    }
}

async fn tx_confs_trigger<W>(wallets: &W, confs: &TxConfsEffect) -> Result<PushTrigger>
where
    W: WalletLookup + ?Sized,
{
    let wallet = wallets.wallet(&confs.wallet_id).await?;
    tracing::debug!(
        wallet_id = %confs.wallet_id,
        plugin_id = wallet.plugin_id(),
        "Converted tx-confs effect"
    );
    Ok(PushTrigger::TxConfirm {
        plugin_id: wallet.plugin_id().to_string(),
        confirmations: confs.confirmations,
        txid: confs.tx_id.clone(),
    })
}

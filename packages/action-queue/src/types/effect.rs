//! Effects: the conditions an action-queue program waits on.
//!
//! [`ActionEffect`] is the complete form every conversion works on.
//! [`PartialEffect`] is what a dry run hands back, where a `seq` or `par`
//! child may still be [`EffectSlot::Pending`]. Narrow with
//! [`PartialEffect::complete`] before converting.

use serde::{Deserialize, Serialize};

use crate::error::{ActionQueueError, Result};

/// Fires when an address balance crosses a threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBalanceEffect {
    pub address: String,
    pub wallet_id: String,
    /// `None` watches the chain's native currency.
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub above_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below_amount: Option<String>,
}

/// Fires when an exchange rate crosses a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLevelEffect {
    pub currency_pair: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub above_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below_rate: Option<f64>,
}

/// Fires once a transaction reaches the given confirmation count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxConfsEffect {
    pub wallet_id: String,
    pub tx_id: String,
    pub confirmations: u32,
}

/// Program finished, possibly with an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoneEffect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Waits on other push events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushEventsEffect {
    pub event_ids: Vec<String>,
}

/// Waits until a wall-clock time, in milliseconds since the epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnixtimeEffect {
    pub timestamp: u64,
}

/// A complete effect tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ActionEffect {
    #[serde(rename_all = "camelCase")]
    Seq {
        op_index: u32,
        child_effect: Box<ActionEffect>,
    },
    #[serde(rename_all = "camelCase")]
    Par { child_effects: Vec<ActionEffect> },
    AddressBalance(AddressBalanceEffect),
    PriceLevel(PriceLevelEffect),
    TxConfs(TxConfsEffect),
    Done(DoneEffect),
    Noop,
    PushEvents(PushEventsEffect),
    Unixtime(UnixtimeEffect),
}

impl ActionEffect {
    /// The `type` tag this effect carries on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            ActionEffect::Seq { .. } => "seq",
            ActionEffect::Par { .. } => "par",
            ActionEffect::AddressBalance(_) => "address-balance",
            ActionEffect::PriceLevel(_) => "price-level",
            ActionEffect::TxConfs(_) => "tx-confs",
            ActionEffect::Done(_) => "done",
            ActionEffect::Noop => "noop",
            ActionEffect::PushEvents(_) => "push-events",
            ActionEffect::Unixtime(_) => "unixtime",
        }
    }

    pub fn seq(op_index: u32, child: ActionEffect) -> Self {
        ActionEffect::Seq {
            op_index,
            child_effect: Box::new(child),
        }
    }

    pub fn done() -> Self {
        ActionEffect::Done(DoneEffect::default())
    }
}

/// A child position in a partially evaluated effect tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<PartialEffect>", into = "Option<PartialEffect>")]
pub enum EffectSlot {
    /// The dry run has not reached this child yet. `null` on the wire.
    Pending,
    Ready(Box<PartialEffect>),
}

impl From<Option<PartialEffect>> for EffectSlot {
    fn from(value: Option<PartialEffect>) -> Self {
        match value {
            Some(effect) => EffectSlot::Ready(Box::new(effect)),
            None => EffectSlot::Pending,
        }
    }
}

impl From<EffectSlot> for Option<PartialEffect> {
    fn from(slot: EffectSlot) -> Self {
        match slot {
            EffectSlot::Pending => None,
            EffectSlot::Ready(effect) => Some(*effect),
        }
    }
}

impl EffectSlot {
    pub fn ready(effect: impl Into<PartialEffect>) -> Self {
        EffectSlot::Ready(Box::new(effect.into()))
    }
}

/// An effect tree as produced mid dry run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PartialEffect {
    #[serde(rename_all = "camelCase")]
    Seq {
        op_index: u32,
        child_effect: EffectSlot,
    },
    #[serde(rename_all = "camelCase")]
    Par { child_effects: Vec<EffectSlot> },
    AddressBalance(AddressBalanceEffect),
    PriceLevel(PriceLevelEffect),
    TxConfs(TxConfsEffect),
    Done(DoneEffect),
    Noop,
    PushEvents(PushEventsEffect),
    Unixtime(UnixtimeEffect),
}

impl PartialEffect {
    pub fn type_name(&self) -> &'static str {
        match self {
            PartialEffect::Seq { .. } => "seq",
            PartialEffect::Par { .. } => "par",
            PartialEffect::AddressBalance(_) => "address-balance",
            PartialEffect::PriceLevel(_) => "price-level",
            PartialEffect::TxConfs(_) => "tx-confs",
            PartialEffect::Done(_) => "done",
            PartialEffect::Noop => "noop",
            PartialEffect::PushEvents(_) => "push-events",
            PartialEffect::Unixtime(_) => "unixtime",
        }
    }

    /// Narrow to a complete effect.
    ///
    /// Fails if any `seq` or `par` child is still pending, which means the
    /// dry run did not short-circuit where it should have.
    pub fn complete(&self) -> Result<ActionEffect> {
        Ok(match self {
            PartialEffect::Seq {
                op_index,
                child_effect,
            } => match child_effect {
                EffectSlot::Ready(child) => ActionEffect::seq(*op_index, child.complete()?),
                EffectSlot::Pending => {
                    return Err(ActionQueueError::InvariantViolation(format!(
                        "seq effect at opIndex {} has a pending child",
                        op_index
                    )))
                }
            },
            PartialEffect::Par { child_effects } => {
                let children = child_effects
                    .iter()
                    .enumerate()
                    .map(|(index, slot)| match slot {
                        EffectSlot::Ready(child) => child.complete(),
                        EffectSlot::Pending => Err(ActionQueueError::InvariantViolation(format!(
                            "par effect has a pending child at index {}",
                            index
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?;
                ActionEffect::Par {
                    child_effects: children,
                }
            }
            PartialEffect::AddressBalance(effect) => ActionEffect::AddressBalance(effect.clone()),
            PartialEffect::PriceLevel(effect) => ActionEffect::PriceLevel(effect.clone()),
            PartialEffect::TxConfs(effect) => ActionEffect::TxConfs(effect.clone()),
            PartialEffect::Done(effect) => ActionEffect::Done(effect.clone()),
            PartialEffect::Noop => ActionEffect::Noop,
            PartialEffect::PushEvents(effect) => ActionEffect::PushEvents(effect.clone()),
            PartialEffect::Unixtime(effect) => ActionEffect::Unixtime(effect.clone()),
        })
    }
}

impl From<ActionEffect> for PartialEffect {
    fn from(effect: ActionEffect) -> Self {
        match effect {
            ActionEffect::Seq {
                op_index,
                child_effect,
            } => PartialEffect::Seq {
                op_index,
                child_effect: EffectSlot::ready(*child_effect),
            },
            ActionEffect::Par { child_effects } => PartialEffect::Par {
                child_effects: child_effects.into_iter().map(EffectSlot::ready).collect(),
            },
            ActionEffect::AddressBalance(effect) => PartialEffect::AddressBalance(effect),
            ActionEffect::PriceLevel(effect) => PartialEffect::PriceLevel(effect),
            ActionEffect::TxConfs(effect) => PartialEffect::TxConfs(effect),
            ActionEffect::Done(effect) => PartialEffect::Done(effect),
            ActionEffect::Noop => PartialEffect::Noop,
            ActionEffect::PushEvents(effect) => PartialEffect::PushEvents(effect),
            ActionEffect::Unixtime(effect) => PartialEffect::Unixtime(effect),
        }
    }
}

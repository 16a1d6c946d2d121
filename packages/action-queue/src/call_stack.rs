//! Call-stack identifiers.
//!
//! An id is derived purely from an effect's shape and addresses a step's push
//! event across evaluations of the same program, so it must be stable: the
//! same shape always yields the same string, and `par` children keep their
//! source order.

use crate::error::{ActionQueueError, Result};
use crate::types::{ActionEffect, EffectSlot, PartialEffect};

pub fn call_stack_id(effect: &ActionEffect) -> String {
    match effect {
        ActionEffect::Seq { op_index, .. } => format!("seq_{}", op_index),
        ActionEffect::Par { child_effects } => {
            let ids: Vec<String> = child_effects.iter().map(call_stack_id).collect();
            format!("par_{}", ids.join("_"))
        }
        ActionEffect::AddressBalance(_)
        | ActionEffect::PriceLevel(_)
        | ActionEffect::TxConfs(_)
        | ActionEffect::Done(_)
        | ActionEffect::Noop
        | ActionEffect::PushEvents(_)
        | ActionEffect::Unixtime(_) => effect.type_name().to_string(),
    }
}

/// Call-stack id of a dry-run effect.
///
/// A `seq` is addressed by its `opIndex` alone, so its child may still be
/// pending. Every `par` child contributes to the id and must be present.
pub fn partial_call_stack_id(effect: &PartialEffect) -> Result<String> {
    match effect {
        PartialEffect::Seq { op_index, .. } => Ok(format!("seq_{}", op_index)),
        PartialEffect::Par { child_effects } => {
            let ids = child_effects
                .iter()
                .enumerate()
                .map(|(index, slot)| match slot {
                    EffectSlot::Ready(child) => partial_call_stack_id(child),
                    EffectSlot::Pending => Err(ActionQueueError::InvariantViolation(format!(
                        "par effect has a pending child at index {}",
                        index
                    ))),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("par_{}", ids.join("_")))
        }
        PartialEffect::AddressBalance(_)
        | PartialEffect::PriceLevel(_)
        | PartialEffect::TxConfs(_)
        | PartialEffect::Done(_)
        | PartialEffect::Noop
        | PartialEffect::PushEvents(_)
        | PartialEffect::Unixtime(_) => Ok(effect.type_name().to_string()),
    }
}

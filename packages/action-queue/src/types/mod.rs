pub mod effect;
pub mod output;

pub use effect::{
    ActionEffect, AddressBalanceEffect, DoneEffect, EffectSlot, PartialEffect, PriceLevelEffect,
    PushEventsEffect, TxConfsEffect, UnixtimeEffect,
};
pub use output::{ExecutionOutput, PendingBroadcast};

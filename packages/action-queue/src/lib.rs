//! Action-queue push scheduling.
//!
//! Turns the effects an action-queue program waits on into push-server
//! triggers, and the outputs of a program dry run into a batch of push
//! events the server can fire on the device's behalf.
//!
//! # Usage
//!
//! ```rust,ignore
//! use action_queue::{PushScheduler, WalletTable};
//! use push_client::{PushClient, PushConfig, PushMessage};
//!
//! let scheduler = PushScheduler::new(PushClient::new(PushConfig::from_env()?), wallets);
//!
//! if scheduler.can_trigger(&init_effect).await? {
//!     let ids = scheduler
//!         .schedule(&login_id, "program-1", &init_effect, &dryrun_outputs, Some(&message))
//!         .await?;
//! }
//! ```
//!
//! # Modules
//!
//! - [`types`] - Effect model and dry-run outputs
//! - [`traits`] - Wallet resolution
//! - [`trigger`] - Effect to push-trigger conversion
//! - [`call_stack`] - Stable event addresses
//! - [`assembler`] - Push-event batches from dry runs
//! - [`scheduler`] - Facade over a wallet lookup and the push client
//! - [`testing`] - Mock implementations for testing

pub mod assembler;
pub mod call_stack;
pub mod error;
pub mod scheduler;
pub mod testing;
pub mod traits;
pub mod trigger;
pub mod types;

pub use assembler::build_events;
pub use call_stack::{call_stack_id, partial_call_stack_id};
pub use error::{ActionQueueError, Result};
pub use scheduler::PushScheduler;
pub use traits::{CurrencyInfo, WalletHandle, WalletLookup, WalletTable};
pub use trigger::{can_trigger, effect_to_trigger, partial_effect_to_trigger};
pub use types::{
    ActionEffect, AddressBalanceEffect, DoneEffect, EffectSlot, ExecutionOutput, PartialEffect,
    PendingBroadcast, PriceLevelEffect, PushEventsEffect, TxConfsEffect, UnixtimeEffect,
};

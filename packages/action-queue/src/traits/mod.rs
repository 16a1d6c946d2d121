//! Trait abstractions over the host wallet layer.

pub mod wallet;

pub use wallet::{CurrencyInfo, WalletHandle, WalletLookup, WalletTable};

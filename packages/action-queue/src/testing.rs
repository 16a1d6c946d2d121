//! Testing utilities including mock implementations.
//!
//! These are useful for exercising trigger conversion and event assembly
//! without a real wallet layer.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::Result;
use crate::traits::{CurrencyInfo, WalletHandle, WalletLookup, WalletTable};

/// A mock wallet lookup for testing.
///
/// Resolves from a fixed table, can delay individual wallets to simulate one
/// that is still loading, and records every lookup for assertions.
#[derive(Default, Clone)]
pub struct MockWallets {
    /// Wallets by id
    table: Arc<RwLock<WalletTable>>,

    /// Artificial load delay per wallet id
    delays: Arc<RwLock<HashMap<String, Duration>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockWallets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a wallet backed by the given plugin.
    pub fn with_wallet(self, wallet_id: impl Into<String>, plugin_id: impl Into<String>) -> Self {
        let plugin_id = plugin_id.into();
        self.table.write().unwrap().insert(
            wallet_id,
            CurrencyInfo {
                currency_code: plugin_id.to_uppercase(),
                display_name: plugin_id.clone(),
                plugin_id,
            },
        );
        self
    }

    /// Make lookups of this wallet wait before resolving.
    pub fn with_delay(self, wallet_id: impl Into<String>, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(wallet_id.into(), delay);
        self
    }

    /// Wallet ids looked up so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl WalletLookup for MockWallets {
    async fn wallet(&self, wallet_id: &str) -> Result<WalletHandle> {
        self.calls.write().unwrap().push(wallet_id.to_string());

        let delay = self.delays.read().unwrap().get(wallet_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.table.read().unwrap().get(wallet_id)
    }
}

//! Wallet resolution trait and a static in-memory implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ActionQueueError, Result};

/// Currency descriptor for a loaded wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyInfo {
    pub plugin_id: String,
    pub currency_code: String,
    #[serde(default)]
    pub display_name: String,
}

/// A resolved wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletHandle {
    pub wallet_id: String,
    pub currency_info: CurrencyInfo,
}

impl WalletHandle {
    pub fn plugin_id(&self) -> &str {
        &self.currency_info.plugin_id
    }
}

/// Resolves wallet ids to loaded wallets.
///
/// Implementations may wait until the wallet finishes loading.
#[async_trait]
pub trait WalletLookup: Send + Sync {
    async fn wallet(&self, wallet_id: &str) -> Result<WalletHandle>;
}

/// Fixed wallet table, e.g. loaded from a JSON file of
/// `walletId -> CurrencyInfo`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletTable {
    wallets: HashMap<String, CurrencyInfo>,
}

impl WalletTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, wallet_id: impl Into<String>, info: CurrencyInfo) {
        self.wallets.insert(wallet_id.into(), info);
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn get(&self, wallet_id: &str) -> Result<WalletHandle> {
        self.wallets
            .get(wallet_id)
            .map(|info| WalletHandle {
                wallet_id: wallet_id.to_string(),
                currency_info: info.clone(),
            })
            .ok_or_else(|| ActionQueueError::WalletNotFound {
                wallet_id: wallet_id.to_string(),
            })
    }
}

#[async_trait]
impl WalletLookup for WalletTable {
    async fn wallet(&self, wallet_id: &str) -> Result<WalletHandle> {
        self.get(wallet_id)
    }
}

use serde::{Deserialize, Serialize};

use super::effect::PartialEffect;

/// Signed transaction produced by a dry-run step, not yet broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingBroadcast {
    pub wallet_id: String,
    #[serde(with = "hex::serde")]
    pub signed_tx: Vec<u8>,
}

/// Result of one dry-run step: what the program waits on afterwards, and the
/// transactions to submit once this step's trigger fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutput {
    pub effect: PartialEffect,
    #[serde(default)]
    pub broadcast_txs: Vec<PendingBroadcast>,
}

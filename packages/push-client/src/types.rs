use std::collections::BTreeMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PushError, Result};

/// Identifies this device to the push server. Fetched once by the host at
/// process start and handed to [`crate::PushConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw login id bytes. Always travels base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoginId(Vec<u8>);

impl LoginId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        STANDARD
            .decode(encoded.trim())
            .map(Self)
            .map_err(|e| PushError::Config(format!("invalid base64 login id: {}", e)))
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for LoginId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for LoginId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

/// Condition the push server watches for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PushTrigger {
    #[serde(rename_all = "camelCase")]
    AddressBalance {
        plugin_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_id: Option<String>,
        address: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        above_amount: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        below_amount: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    PriceLevel {
        currency_pair: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        above_rate: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        below_rate: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    TxConfirm {
        plugin_id: String,
        confirmations: u32,
        txid: String,
    },
}

impl PushTrigger {
    pub fn type_name(&self) -> &'static str {
        match self {
            PushTrigger::AddressBalance { .. } => "address-balance",
            PushTrigger::PriceLevel { .. } => "price-level",
            PushTrigger::TxConfirm { .. } => "tx-confirm",
        }
    }
}

/// Signed transaction the server broadcasts once the trigger fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastTx {
    pub plugin_id: String,
    /// Hex-encoded signed transaction.
    pub raw_tx: String,
}

/// Notification shown on the device when an event fires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, String>>,
}

/// Event definition uploaded to the push server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPushEvent {
    pub event_id: String,
    #[serde(default)]
    pub broadcast_txs: Vec<BroadcastTx>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_message: Option<PushMessage>,
    pub recurring: bool,
    pub trigger: PushTrigger,
}

/// Server-side lifecycle of a push event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushEventState {
    Waiting,
    Cancelled,
    Triggered,
    Complete,
    Hidden,
    #[serde(other)]
    Unknown,
}

impl PushEventState {
    /// Whether the event has fired (and possibly finished broadcasting).
    pub fn is_settled(self) -> bool {
        matches!(self, PushEventState::Triggered | PushEventState::Complete)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushEventStatus {
    pub event_id: String,
    pub state: PushEventState,
}

/// Response from `POST /v2/login`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginStatus {
    #[serde(default)]
    pub events: Vec<PushEventStatus>,
}

impl LoginStatus {
    pub fn state_of(&self, event_id: &str) -> Option<PushEventState> {
        self.events
            .iter()
            .find(|event| event.event_id == event_id)
            .map(|event| event.state)
    }

    /// True only when every id is known to the server and has fired.
    /// Missing ids count as not fired.
    pub fn all_settled<S: AsRef<str>>(&self, event_ids: &[S]) -> bool {
        event_ids.iter().all(|id| {
            self.state_of(id.as_ref())
                .map(PushEventState::is_settled)
                .unwrap_or(false)
        })
    }
}

/// Envelope shared by every login request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a, T: Serialize> {
    pub api_key: &'a str,
    pub device_id: &'a DeviceId,
    pub login_id: &'a LoginId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginUpdate<'a> {
    pub create_events: &'a [NewPushEvent],
    pub remove_events: &'a [String],
}

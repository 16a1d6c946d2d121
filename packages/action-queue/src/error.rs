//! Typed errors for the action queue.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell a
//! broken dry run apart from a push-server outage.

use push_client::PushError;
use thiserror::Error;

/// Errors that can occur while converting effects or scheduling events.
#[derive(Debug, Error)]
pub enum ActionQueueError {
    /// A dry run left a pending child where a complete effect was required
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The effect a step waits on has no push-trigger representation
    #[error("unsupported effect type: {effect_type}")]
    UnsupportedEffect { effect_type: &'static str },

    /// No wallet with this id is loaded
    #[error("wallet not found: {wallet_id}")]
    WalletNotFound { wallet_id: String },

    /// Wallet backend failed
    #[error("wallet lookup failed: {0}")]
    WalletLookup(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Push server request failed
    #[error("push server error: {0}")]
    Push(#[from] PushError),
}

/// Result type alias for action-queue operations.
pub type Result<T> = std::result::Result<T, ActionQueueError>;

use alloy::primitives::Address;
use serde_json::Value;
use thiserror::Error;

use crate::catalog::{EventCardsReply, EventId, LikeUpdateReply};
use crate::domain::RpcMethod;
use crate::events::EventSubscription;
use crate::likes::LikeList;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("user rejected request: {0}")]
    UserRejected(String),
    #[error("provider error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("policy error: {0}")]
    Policy(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
}

impl PortError {
    /// EIP-1193 `userRejectedRequest`.
    pub const USER_REJECTED_CODE: i64 = 4001;

    /// Maps a JSON-RPC / EIP-1193 error object (`{code, message}`) onto the taxonomy.
    pub fn from_rpc_error(err: &Value) -> Self {
        let code = err.get("code").and_then(Value::as_i64);
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| err.to_string());
        match code {
            Some(Self::USER_REJECTED_CODE) => Self::UserRejected(message),
            Some(code) => Self::Rpc { code, message },
            None => Self::Transport(format!("malformed provider error: {err}")),
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::UserRejected(_))
    }
}

/// Capability set of an injected EIP-1193 wallet provider.
#[allow(async_fn_in_trait)]
pub trait ProviderPort {
    async fn request(&self, method: RpcMethod, params: Value) -> Result<Value, PortError>;
    /// Registers an observer for `accountsChanged` / `chainChanged`.
    /// Dropping the subscription unregisters it.
    fn subscribe(&self) -> Result<EventSubscription, PortError>;
    fn selected_address(&self) -> Option<Address>;
    fn chain_id(&self) -> Option<String>;
}

/// Marketplace REST backend.
#[allow(async_fn_in_trait)]
pub trait EventBackendPort {
    async fn all_event_cards(&self) -> Result<EventCardsReply, PortError>;
    async fn update_event_like(
        &self,
        id: &EventId,
        likes: &LikeList,
    ) -> Result<LikeUpdateReply, PortError>;
}

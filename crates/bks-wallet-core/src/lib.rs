pub mod bridge;
pub mod catalog;
pub mod domain;
pub mod events;
pub mod likes;
pub mod ports;
pub mod rpc;
pub mod state_machine;

pub use bridge::WalletSessionBridge;
pub use catalog::{
    filter_by_name, EventCard, EventCardsReply, EventId, LikeUpdateReply, LikeUpdateRequest,
    UserInfo,
};
pub use domain::{
    ChainSpec, NativeCurrency, RequestResult, RpcMethod, Session, TransactionParams,
    TypedDataPayload,
};
pub use events::{EventHub, EventSubscription, ProviderEvent};
pub use likes::{LikeList, UserId};
pub use ports::{EventBackendPort, PortError, ProviderPort};
pub use state_machine::{account_transition, AccountSource, ConnectionState, StateTransition};

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use alloy::primitives::Address;
use serde_json::Value;
use tokio::sync::oneshot;

use bks_wallet_core::{
    EventHub, EventSubscription, PortError, ProviderEvent, ProviderPort, RpcMethod,
    WalletSessionBridge,
};

enum Scripted {
    Ready(Result<Value, PortError>),
    Gated(oneshot::Receiver<Result<Value, PortError>>),
}

/// Provider whose responses are queued per method ahead of time.
#[derive(Default)]
pub struct ScriptedProvider {
    pub hub: EventHub,
    calls: Mutex<Vec<(RpcMethod, Value)>>,
    script: Mutex<HashMap<RpcMethod, VecDeque<Scripted>>>,
    selected: Mutex<Option<Address>>,
    chain: Mutex<Option<String>>,
}

impl ScriptedProvider {
    pub fn respond(&self, method: RpcMethod, value: Value) {
        self.push(method, Scripted::Ready(Ok(value)));
    }

    pub fn fail(&self, method: RpcMethod, error: PortError) {
        self.push(method, Scripted::Ready(Err(error)));
    }

    /// Queues a response that resolves only when the returned sender fires.
    pub fn gate(&self, method: RpcMethod) -> oneshot::Sender<Result<Value, PortError>> {
        let (tx, rx) = oneshot::channel();
        self.push(method, Scripted::Gated(rx));
        tx
    }

    pub fn set_chain(&self, chain: &str) {
        *self.chain.lock().expect("chain lock") = Some(chain.to_owned());
    }

    pub fn set_selected(&self, address: Address) {
        *self.selected.lock().expect("selected lock") = Some(address);
    }

    pub fn emit(&self, event: ProviderEvent) {
        self.hub.emit(event).expect("emit event");
    }

    pub fn calls(&self) -> Vec<(RpcMethod, Value)> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn calls_to(&self, method: RpcMethod) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| *m == method)
            .map(|(_, params)| params)
            .collect()
    }

    fn push(&self, method: RpcMethod, entry: Scripted) {
        self.script
            .lock()
            .expect("script lock")
            .entry(method)
            .or_default()
            .push_back(entry);
    }
}

impl ProviderPort for ScriptedProvider {
    async fn request(&self, method: RpcMethod, params: Value) -> Result<Value, PortError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((method, params));
        let next = self
            .script
            .lock()
            .expect("script lock")
            .get_mut(&method)
            .and_then(VecDeque::pop_front);
        match next {
            Some(Scripted::Ready(result)) => result,
            Some(Scripted::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(PortError::Transport("gate dropped".to_owned()))),
            None => Err(PortError::Rpc {
                code: -32601,
                message: format!("{method} not scripted"),
            }),
        }
    }

    fn subscribe(&self) -> Result<EventSubscription, PortError> {
        self.hub.subscribe()
    }

    fn selected_address(&self) -> Option<Address> {
        *self.selected.lock().expect("selected lock")
    }

    fn chain_id(&self) -> Option<String> {
        self.chain.lock().expect("chain lock").clone()
    }
}

pub fn mount() -> (Arc<ScriptedProvider>, WalletSessionBridge<ScriptedProvider>) {
    let provider = Arc::new(ScriptedProvider::default());
    let bridge = WalletSessionBridge::mount(Arc::clone(&provider)).expect("mount bridge");
    (provider, bridge)
}

pub fn account_a() -> Address {
    "0xABC0000000000000000000000000000000000001"
        .parse()
        .expect("account a")
}

pub fn account_b() -> Address {
    "0x2000000000000000000000000000000000000002"
        .parse()
        .expect("account b")
}

pub fn accounts_json(accounts: &[Address]) -> Value {
    serde_json::json!(accounts.iter().map(|a| a.to_string()).collect::<Vec<_>>())
}

pub const ONE_ETHER_HEX: &str = "0xde0b6b3a7640000";

pub fn user_rejected() -> PortError {
    PortError::UserRejected("User denied message signature.".to_owned())
}

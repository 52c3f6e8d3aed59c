//! Wallet session bridge.
//!
//! Mediates between a screen and an injected [`ProviderPort`]. Every wallet
//! call is a single request/response round trip; failures never escape as
//! errors, they are logged, kept in [`WalletSessionBridge::last_error`] and
//! reported as `None`.
//!
//! Several calls may be in flight at once. Each response carries the token it
//! was issued with and only the newest token of its slot may write shared
//! state; older responses are still returned to their caller.

use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::{Address, Bytes, B256};
use serde_json::Value;

use crate::domain::{
    ChainSpec, RequestResult, RpcMethod, Session, TransactionParams, TypedDataPayload,
};
use crate::events::{EventSubscription, ProviderEvent};
use crate::ports::{PortError, ProviderPort};
use crate::rpc;
use crate::state_machine::{account_transition, AccountSource};

#[derive(Debug, Default)]
struct RequestTokens {
    account: u64,
    balance: u64,
    result: u64,
    /// Bumped on every `accountsChanged`; connect responses issued before it are stale.
    account_epoch: u64,
}

#[derive(Debug, Default)]
struct BridgeState {
    session: Session,
    last_result: Option<RequestResult>,
    last_error: Option<PortError>,
    tokens: RequestTokens,
}

pub struct WalletSessionBridge<P> {
    provider: Arc<P>,
    state: Mutex<BridgeState>,
    events: tokio::sync::Mutex<EventSubscription>,
}

impl<P: ProviderPort> WalletSessionBridge<P> {
    /// Subscribes to provider events and starts with an empty session.
    pub fn mount(provider: Arc<P>) -> Result<Self, PortError> {
        let subscription = provider.subscribe()?;
        tracing::debug!(subscription = subscription.id(), "wallet bridge mounted");
        Ok(Self {
            provider,
            state: Mutex::new(BridgeState::default()),
            events: tokio::sync::Mutex::new(subscription),
        })
    }

    /// Drops the session and releases the event subscription.
    pub fn unmount(self) {
        tracing::debug!("wallet bridge unmounted");
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub fn session(&self) -> Session {
        self.lock().session.clone()
    }

    pub fn last_result(&self) -> Option<RequestResult> {
        self.lock().last_result.clone()
    }

    pub fn last_error(&self) -> Option<PortError> {
        self.lock().last_error.clone()
    }

    pub async fn connect(&self) -> Option<Address> {
        let (token, epoch) = {
            let mut g = self.lock();
            g.tokens.account += 1;
            (g.tokens.account, g.tokens.account_epoch)
        };

        let accounts = match self
            .provider
            .request(RpcMethod::RequestAccounts, serde_json::json!([]))
            .await
            .and_then(|v| rpc::parse_accounts(&v))
        {
            Ok(accounts) => accounts,
            Err(e) => {
                self.record_failure(RpcMethod::RequestAccounts, e);
                return None;
            }
        };

        let first = accounts.first().copied();
        {
            let mut g = self.lock();
            if g.tokens.account != token || g.tokens.account_epoch != epoch {
                tracing::debug!(token, "discarding stale eth_requestAccounts response");
                return first;
            }
            let current = g.session.connected_address;
            let transition = account_transition(current, &accounts, AccountSource::Connect);
            if transition.account != current {
                g.session.balance = None;
            }
            g.session.connected_address = transition.account;
            tracing::info!(
                from = ?transition.from,
                to = ?transition.to,
                account = ?transition.account,
                reason = transition.reason,
                "wallet connect resolved"
            );
        }

        self.refresh_balance().await;
        first
    }

    /// Re-reads the native balance of the connected account. No-op when disconnected.
    pub async fn refresh_balance(&self) -> Option<String> {
        let (token, address, chain) = {
            let mut g = self.lock();
            let address = g.session.connected_address?;
            g.tokens.balance += 1;
            (g.tokens.balance, address, g.session.chain_id.clone())
        };

        let wei = match self
            .provider
            .request(
                RpcMethod::GetBalance,
                serde_json::json!([address.to_string(), "latest"]),
            )
            .await
            .and_then(|v| rpc::parse_quantity(&v))
        {
            Ok(wei) => wei,
            Err(e) => {
                self.record_failure(RpcMethod::GetBalance, e);
                return None;
            }
        };
        let balance = rpc::format_balance(wei);

        let mut g = self.lock();
        let fresh = g.tokens.balance == token
            && g.session.connected_address == Some(address)
            && g.session.chain_id == chain;
        if !fresh {
            tracing::debug!(token, %address, "discarding stale balance response");
            return None;
        }
        g.session.balance = Some(balance.clone());
        Some(balance)
    }

    /// Signs `payload` with `eth_signTypedData_v4` from the connected account.
    pub async fn sign_typed_data(&self, payload: &TypedDataPayload) -> Option<Bytes> {
        let json = match serde_json::to_string(payload) {
            Ok(json) => json,
            Err(e) => {
                self.record_failure(
                    RpcMethod::SignTypedDataV4,
                    PortError::Validation(format!("typed data serialization failed: {e}")),
                );
                return None;
            }
        };
        let from = self.active_address().map(|a| a.to_string());
        let params = serde_json::json!([from, json]);
        let (signature, token) = self
            .issue(RpcMethod::SignTypedDataV4, params, rpc::parse_signature)
            .await?;
        self.publish_result(RequestResult::Signature(signature.clone()), token);
        Some(signature)
    }

    /// Signs the fixed "Ether Mail" document for the current chain.
    pub async fn sign_ether_mail(&self) -> Option<Bytes> {
        let chain = self
            .session()
            .chain_id
            .or_else(|| self.provider.chain_id());
        let chain_id = match chain.as_deref().map(rpc::parse_chain_id) {
            Some(Ok(id)) => id,
            Some(Err(e)) => {
                self.record_failure(RpcMethod::SignTypedDataV4, e);
                return None;
            }
            None => {
                self.record_failure(
                    RpcMethod::SignTypedDataV4,
                    PortError::Validation("chain id unknown; cannot build typed data domain".to_owned()),
                );
                return None;
            }
        };
        self.sign_typed_data(&TypedDataPayload::ether_mail(chain_id))
            .await
    }

    /// Submits a native transfer. `from` defaults to the connected account.
    pub async fn send_transaction(&self, params: TransactionParams) -> Option<B256> {
        let params = match (params.from, self.active_address()) {
            (None, Some(from)) => params.with_from(from),
            _ => params,
        };
        let params = match serde_json::to_value(&params) {
            Ok(v) => serde_json::json!([v]),
            Err(e) => {
                self.record_failure(
                    RpcMethod::SendTransaction,
                    PortError::Validation(format!("tx params serialization failed: {e}")),
                );
                return None;
            }
        };
        let (hash, token) = self
            .issue(RpcMethod::SendTransaction, params, rpc::parse_tx_hash)
            .await?;
        self.publish_result(RequestResult::TransactionHash(hash), token);
        Some(hash)
    }

    pub async fn add_chain(&self, spec: &ChainSpec) -> Option<Value> {
        let params = match serde_json::to_value(spec) {
            Ok(v) => serde_json::json!([v]),
            Err(e) => {
                self.record_failure(
                    RpcMethod::AddEthereumChain,
                    PortError::Validation(format!("chain spec serialization failed: {e}")),
                );
                return None;
            }
        };
        let (ack, token) = self
            .issue(RpcMethod::AddEthereumChain, params, |v| Ok(v.clone()))
            .await?;
        self.publish_result(RequestResult::ChainAdded(ack.clone()), token);
        tracing::info!(chain_id = %spec.chain_id, chain = %spec.chain_name, "chain registered with provider");
        Some(ack)
    }

    /// Applies every queued provider event. Returns how many were applied.
    pub async fn pump_events(&self) -> usize {
        let pending: Vec<ProviderEvent> = {
            let mut sub = self.events.lock().await;
            std::iter::from_fn(|| sub.try_next()).collect()
        };
        let count = pending.len();
        for event in pending {
            self.apply_event(event).await;
        }
        count
    }

    /// Waits for the next provider event and applies it. `false` once the provider is gone.
    pub async fn process_next_event(&self) -> bool {
        let event = {
            let mut sub = self.events.lock().await;
            sub.next().await
        };
        match event {
            Some(event) => {
                self.apply_event(event).await;
                true
            }
            None => false,
        }
    }

    pub async fn apply_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::ChainChanged(chain_id) => {
                {
                    let mut g = self.lock();
                    if g.session.chain_id.as_deref() != Some(chain_id.as_str()) {
                        g.session.balance = None;
                    }
                    tracing::info!(chain_id = %chain_id, "provider chain changed");
                    g.session.chain_id = Some(chain_id);
                }
                self.refresh_balance().await;
            }
            ProviderEvent::AccountsChanged(accounts) => {
                {
                    let mut g = self.lock();
                    g.tokens.account_epoch += 1;
                    let current = g.session.connected_address;
                    let transition =
                        account_transition(current, &accounts, AccountSource::AccountsChanged);
                    if transition.account != current {
                        g.session.balance = None;
                    }
                    g.session.connected_address = transition.account;
                    tracing::info!(
                        from = ?transition.from,
                        to = ?transition.to,
                        account = ?transition.account,
                        reason = transition.reason,
                        "provider accounts changed"
                    );
                }
                self.refresh_balance().await;
            }
        }
    }

    fn active_address(&self) -> Option<Address> {
        self.lock()
            .session
            .connected_address
            .or_else(|| self.provider.selected_address())
    }

    async fn issue<T>(
        &self,
        method: RpcMethod,
        params: Value,
        decode: impl FnOnce(&Value) -> Result<T, PortError>,
    ) -> Option<(T, u64)> {
        let token = {
            let mut g = self.lock();
            g.tokens.result += 1;
            g.tokens.result
        };
        match self
            .provider
            .request(method, params)
            .await
            .and_then(|v| decode(&v))
        {
            Ok(value) => Some((value, token)),
            Err(e) => {
                self.record_failure(method, e);
                None
            }
        }
    }

    fn publish_result(&self, result: RequestResult, token: u64) {
        let mut g = self.lock();
        if g.tokens.result == token {
            g.last_result = Some(result);
        } else {
            tracing::debug!(token, latest = g.tokens.result, "stale request result not published");
        }
    }

    fn record_failure(&self, method: RpcMethod, error: PortError) {
        if error.is_user_rejection() {
            tracing::info!(%method, error = %error, "wallet request rejected by user");
        } else {
            tracing::warn!(%method, error = %error, "wallet request failed");
        }
        self.lock().last_error = Some(error);
    }

    fn lock(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

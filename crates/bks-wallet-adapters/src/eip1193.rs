use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::{address, keccak256, Address, Bytes, U256};
use serde_json::Value;

use bks_wallet_core::{
    rpc, ChainSpec, EventHub, EventSubscription, PortError, ProviderEvent, ProviderPort,
    RpcMethod,
};

use crate::AdapterConfig;

#[derive(Debug, Clone)]
pub struct Eip1193Adapter {
    mode: ProviderMode,
    state: Arc<Mutex<WalletState>>,
    hub: EventHub,
    #[cfg(target_arch = "wasm32")]
    hooks: Arc<Mutex<BrowserHooks>>,
}

#[derive(Debug, Clone)]
enum ProviderMode {
    Disabled(String),
    Deterministic,
    #[cfg(not(target_arch = "wasm32"))]
    Proxy(ProxyRuntime),
    #[cfg(target_arch = "wasm32")]
    Browser,
}

#[derive(Debug, Clone)]
#[cfg(not(target_arch = "wasm32"))]
struct ProxyRuntime {
    base_url: String,
    client: reqwest::Client,
    next_id: Arc<AtomicU64>,
}

/// Last known wallet view. In deterministic mode it is also the wallet itself.
#[derive(Debug, Clone)]
struct WalletState {
    accounts: Vec<Address>,
    chain_id: Option<String>,
    balances: HashMap<Address, U256>,
    added_chains: Vec<ChainSpec>,
    sent_transactions: Vec<Value>,
    pending_rejections: Vec<RpcMethod>,
}

pub const DETERMINISTIC_ACCOUNT: Address = address!("1000000000000000000000000000000000000001");

impl WalletState {
    fn deterministic() -> Self {
        let mut balances = HashMap::new();
        balances.insert(
            DETERMINISTIC_ACCOUNT,
            U256::from(1_000_000_000_000_000_000u64),
        );
        Self {
            accounts: vec![DETERMINISTIC_ACCOUNT],
            chain_id: Some("0x1".to_owned()),
            balances,
            added_chains: Vec::new(),
            sent_transactions: Vec::new(),
            pending_rejections: Vec::new(),
        }
    }

    fn empty() -> Self {
        Self {
            accounts: Vec::new(),
            chain_id: None,
            balances: HashMap::new(),
            added_chains: Vec::new(),
            sent_transactions: Vec::new(),
            pending_rejections: Vec::new(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
struct BrowserHooks {
    accounts_changed: Option<wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>>,
    chain_changed: Option<wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>>,
}

impl Default for Eip1193Adapter {
    fn default() -> Self {
        Self::with_config(AdapterConfig::default())
    }
}

impl Eip1193Adapter {
    pub fn with_config(config: AdapterConfig) -> Self {
        #[cfg(target_arch = "wasm32")]
        let mode = if browser_provider_available() {
            ProviderMode::Browser
        } else if config.strict_runtime_required() {
            ProviderMode::Disabled(
                "EIP-1193 browser provider not found in production runtime profile".to_owned(),
            )
        } else {
            ProviderMode::Deterministic
        };

        #[cfg(not(target_arch = "wasm32"))]
        let mode = if let Some(ref base_url) = config.eip1193_proxy_url {
            let timeout = std::time::Duration::from_millis(config.request_timeout_ms);
            match reqwest::Client::builder().timeout(timeout).build() {
                Ok(client) => ProviderMode::Proxy(ProxyRuntime {
                    base_url: base_url.clone(),
                    client,
                    next_id: Arc::new(AtomicU64::new(1)),
                }),
                Err(e) => {
                    if config.strict_runtime_required() {
                        ProviderMode::Disabled(format!(
                            "failed to initialize EIP-1193 proxy client in production profile: {e}"
                        ))
                    } else {
                        tracing::warn!(error = %e, "eip1193 proxy client unavailable; using deterministic provider");
                        ProviderMode::Deterministic
                    }
                }
            }
        } else if config.strict_runtime_required() {
            ProviderMode::Disabled(
                "EIP-1193 proxy URL not configured in production runtime profile".to_owned(),
            )
        } else {
            ProviderMode::Deterministic
        };

        let state = match mode {
            ProviderMode::Deterministic => WalletState::deterministic(),
            _ => WalletState::empty(),
        };
        tracing::info!(mode = mode.label(), dapp = %config.dapp_name, "eip1193 provider ready");

        let adapter = Self {
            mode,
            state: Arc::new(Mutex::new(state)),
            hub: EventHub::new(),
            #[cfg(target_arch = "wasm32")]
            hooks: Arc::new(Mutex::new(BrowserHooks::default())),
        };

        adapter.refresh_snapshot();
        adapter
    }

    pub fn mode_label(&self) -> &'static str {
        self.mode.label()
    }

    pub fn hub(&self) -> &EventHub {
        &self.hub
    }

    fn lock(&self) -> Result<MutexGuard<'_, WalletState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("provider lock poisoned: {e}")))
    }

    /// Queries `eth_chainId` and emits `chainChanged` when it differs from the last known value.
    pub async fn sync_chain_id(&self) -> Result<String, PortError> {
        let result = self.request(RpcMethod::ChainId, serde_json::json!([])).await?;
        rpc::json_chain_id(&result)
    }

    pub fn debug_inject_accounts_changed(&self, accounts: Vec<Address>) -> Result<(), PortError> {
        self.lock()?.accounts = accounts.clone();
        self.hub.emit(ProviderEvent::AccountsChanged(accounts))?;
        Ok(())
    }

    pub fn debug_inject_chain_changed(&self, chain_id: &str) -> Result<(), PortError> {
        self.lock()?.chain_id = Some(chain_id.to_owned());
        self.hub
            .emit(ProviderEvent::ChainChanged(chain_id.to_owned()))?;
        Ok(())
    }

    pub fn debug_set_balance(&self, address: Address, wei: U256) -> Result<(), PortError> {
        self.lock()?.balances.insert(address, wei);
        Ok(())
    }

    /// The next deterministic `method` call fails as if the user dismissed the wallet prompt.
    pub fn debug_reject_next(&self, method: RpcMethod) -> Result<(), PortError> {
        self.lock()?.pending_rejections.push(method);
        Ok(())
    }

    pub fn added_chains(&self) -> Result<Vec<ChainSpec>, PortError> {
        Ok(self.lock()?.added_chains.clone())
    }

    pub fn sent_transactions(&self) -> Result<Vec<Value>, PortError> {
        Ok(self.lock()?.sent_transactions.clone())
    }

    fn deterministic_call(&self, method: RpcMethod, params: &Value) -> Result<Value, PortError> {
        let mut g = self.lock()?;
        if let Some(pos) = g.pending_rejections.iter().position(|m| *m == method) {
            g.pending_rejections.remove(pos);
            return Err(PortError::UserRejected(format!(
                "User rejected the {method} request."
            )));
        }

        match method {
            RpcMethod::RequestAccounts => Ok(serde_json::json!(g
                .accounts
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>())),
            RpcMethod::ChainId => g
                .chain_id
                .clone()
                .map(Value::from)
                .ok_or_else(|| PortError::NotFound("chain id not set".to_owned())),
            RpcMethod::GetBalance => {
                let address = param_address(params, 0)?;
                let wei = g.balances.get(&address).copied().unwrap_or_default();
                Ok(Value::from(format!("{wei:#x}")))
            }
            RpcMethod::SignTypedDataV4 => {
                let signer = param_address(params, 0)?;
                authorize(&g.accounts, signer)?;
                let payload = params
                    .get(1)
                    .and_then(Value::as_str)
                    .ok_or_else(|| PortError::Validation("typed data must be a string".to_owned()))?;
                Ok(Value::from(
                    deterministic_signature(method, payload.as_bytes(), signer).to_string(),
                ))
            }
            RpcMethod::SendTransaction => {
                let tx = params
                    .get(0)
                    .cloned()
                    .ok_or_else(|| PortError::Validation("missing transaction object".to_owned()))?;
                let from = param_address(&tx, "from")?;
                authorize(&g.accounts, from)?;
                let canonical = serde_json::to_vec(&tx).map_err(|e| {
                    PortError::Validation(format!("tx payload serialization failed: {e}"))
                })?;
                g.sent_transactions.push(tx);
                Ok(Value::from(keccak256(canonical).to_string()))
            }
            RpcMethod::AddEthereumChain => {
                let spec: ChainSpec = params
                    .get(0)
                    .cloned()
                    .ok_or_else(|| PortError::Validation("missing chain spec".to_owned()))
                    .and_then(|v| {
                        serde_json::from_value(v)
                            .map_err(|e| PortError::Validation(format!("invalid chain spec: {e}")))
                    })?;
                if !g.added_chains.iter().any(|c| c.chain_id == spec.chain_id) {
                    g.added_chains.push(spec);
                }
                Ok(Value::Null)
            }
        }
    }

    /// Updates the cached wallet view from a successful response and emits the matching event.
    fn observe(&self, method: RpcMethod, result: &Value) -> Result<(), PortError> {
        match method {
            RpcMethod::RequestAccounts => {
                let accounts = rpc::parse_accounts(result)?;
                let mut g = self.lock()?;
                if g.accounts != accounts {
                    g.accounts = accounts.clone();
                    drop(g);
                    self.hub.emit(ProviderEvent::AccountsChanged(accounts))?;
                }
            }
            RpcMethod::ChainId => {
                let chain_id = rpc::json_chain_id(result)?;
                let mut g = self.lock()?;
                if g.chain_id.as_deref() != Some(chain_id.as_str()) {
                    g.chain_id = Some(chain_id.clone());
                    drop(g);
                    self.hub.emit(ProviderEvent::ChainChanged(chain_id))?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Re-reads `selectedAddress` / `chainId` from the injected provider.
    #[cfg(target_arch = "wasm32")]
    fn refresh_snapshot(&self) {
        if let ProviderMode::Browser = self.mode {
            if let Err(e) = self.refresh_browser_snapshot() {
                tracing::debug!(error = %e, "browser provider snapshot failed");
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn refresh_snapshot(&self) {}

    #[cfg(target_arch = "wasm32")]
    fn refresh_browser_snapshot(&self) -> Result<(), PortError> {
        use wasm_bindgen::JsValue;

        let provider = browser_provider()?;
        let selected = get_prop(&provider, "selectedAddress").unwrap_or(JsValue::NULL);
        let chain = get_prop(&provider, "chainId").unwrap_or(JsValue::NULL);

        let mut g = self.lock()?;
        if let Some(s) = selected.as_string() {
            let parsed: Address = s
                .parse()
                .map_err(|e| PortError::Validation(format!("invalid selectedAddress: {e}")))?;
            if g.accounts.first().copied() != Some(parsed) {
                g.accounts = vec![parsed];
            }
        }
        if !chain.is_null() && !chain.is_undefined() {
            g.chain_id = Some(js_chain_id(chain)?);
        }
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    fn register_browser_hooks(&self) -> Result<(), PortError> {
        use wasm_bindgen::{closure::Closure, JsCast, JsValue};

        if !matches!(self.mode, ProviderMode::Browser) {
            return Ok(());
        }

        let provider = browser_provider()?;
        let on_fn = get_prop(&provider, "on")
            .ok()
            .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
            .or_else(|| {
                get_prop(&provider, "addListener")
                    .ok()
                    .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
            })
            .ok_or(PortError::NotImplemented(
                "provider does not expose on/addListener",
            ))?;

        let mut hooks = self
            .hooks
            .lock()
            .map_err(|e| PortError::Transport(format!("provider hooks lock poisoned: {e}")))?;
        if hooks.accounts_changed.is_some() && hooks.chain_changed.is_some() {
            return Ok(());
        }

        let state_for_accounts = Arc::clone(&self.state);
        let hub_for_accounts = self.hub.clone();
        let accounts_cb = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            let mut accounts = Vec::new();
            if js_sys::Array::is_array(&value) {
                for item in js_sys::Array::from(&value).iter() {
                    if let Some(addr) = item.as_string().and_then(|raw| raw.parse::<Address>().ok())
                    {
                        accounts.push(addr);
                    }
                }
            }
            if let Ok(mut g) = state_for_accounts.lock() {
                g.accounts = accounts.clone();
            }
            let _ = hub_for_accounts.emit(ProviderEvent::AccountsChanged(accounts));
        });

        let state_for_chain = Arc::clone(&self.state);
        let hub_for_chain = self.hub.clone();
        let chain_cb = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            if let Ok(chain_id) = js_chain_id(value) {
                if let Ok(mut g) = state_for_chain.lock() {
                    g.chain_id = Some(chain_id.clone());
                }
                let _ = hub_for_chain.emit(ProviderEvent::ChainChanged(chain_id));
            }
        });

        on_fn
            .call2(
                &provider,
                &JsValue::from_str("accountsChanged"),
                accounts_cb.as_ref().unchecked_ref(),
            )
            .map_err(|e| PortError::Transport(format!("register accountsChanged failed: {e:?}")))?;
        on_fn
            .call2(
                &provider,
                &JsValue::from_str("chainChanged"),
                chain_cb.as_ref().unchecked_ref(),
            )
            .map_err(|e| PortError::Transport(format!("register chainChanged failed: {e:?}")))?;

        hooks.accounts_changed = Some(accounts_cb);
        hooks.chain_changed = Some(chain_cb);
        Ok(())
    }
}

impl ProviderMode {
    fn label(&self) -> &'static str {
        match self {
            Self::Disabled(_) => "disabled",
            Self::Deterministic => "deterministic",
            #[cfg(not(target_arch = "wasm32"))]
            Self::Proxy(_) => "proxy",
            #[cfg(target_arch = "wasm32")]
            Self::Browser => "browser",
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ProxyRuntime {
    async fn call(&self, method: RpcMethod, params: Value) -> Result<Value, PortError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::SeqCst),
            "method": method.as_str(),
            "params": params,
        });
        let response = self
            .client
            .post(&self.base_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PortError::Transport(format!("eip1193 proxy request failed: {e}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| PortError::Transport(format!("eip1193 proxy json decode failed: {e}")))?;
        if let Some(err) = body.get("error") {
            return Err(PortError::from_rpc_error(err));
        }
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "eip1193 proxy status {status}: {body}"
            )));
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| PortError::Transport("eip1193 proxy missing result".to_owned()))
    }
}

impl ProviderPort for Eip1193Adapter {
    async fn request(&self, method: RpcMethod, params: Value) -> Result<Value, PortError> {
        tracing::debug!(%method, mode = self.mode.label(), "eip1193 request");
        let result = match &self.mode {
            ProviderMode::Disabled(reason) => return Err(PortError::Policy(reason.clone())),
            ProviderMode::Deterministic => self.deterministic_call(method, &params),
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(proxy) => proxy.call(method, params).await,
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => wasm_request(method.as_str(), params).await,
        }?;
        self.observe(method, &result)?;
        Ok(result)
    }

    fn subscribe(&self) -> Result<EventSubscription, PortError> {
        if let ProviderMode::Disabled(reason) = &self.mode {
            return Err(PortError::Policy(reason.clone()));
        }
        #[cfg(target_arch = "wasm32")]
        self.register_browser_hooks()?;
        self.hub.subscribe()
    }

    fn selected_address(&self) -> Option<Address> {
        self.refresh_snapshot();
        self.lock().ok()?.accounts.first().copied()
    }

    fn chain_id(&self) -> Option<String> {
        self.refresh_snapshot();
        self.lock().ok()?.chain_id.clone()
    }
}

fn param_address<I: serde_json::value::Index>(params: &Value, index: I) -> Result<Address, PortError> {
    let raw = params
        .get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| PortError::Validation("missing address parameter".to_owned()))?;
    raw.parse()
        .map_err(|e| PortError::Validation(format!("invalid address parameter: {e}")))
}

fn authorize(accounts: &[Address], signer: Address) -> Result<(), PortError> {
    if accounts.contains(&signer) {
        Ok(())
    } else {
        Err(PortError::Rpc {
            code: 4100,
            message: format!("account {signer} has not been authorized by the user"),
        })
    }
}

fn deterministic_signature(method: RpcMethod, payload: &[u8], signer: Address) -> Bytes {
    let mut seed = Vec::new();
    seed.extend_from_slice(method.as_str().as_bytes());
    seed.extend_from_slice(signer.as_slice());
    seed.extend_from_slice(payload);
    let hash = keccak256(seed);
    let mut sig = Vec::with_capacity(65);
    sig.extend_from_slice(hash.as_slice());
    sig.extend_from_slice(hash.as_slice());
    sig.push(27);
    Bytes::from(sig)
}

#[cfg(target_arch = "wasm32")]
async fn wasm_request(method: &str, params: Value) -> Result<Value, PortError> {
    use wasm_bindgen::JsCast;

    let provider = browser_provider()?;
    let request_fn = get_prop(&provider, "request")
        .ok()
        .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
        .ok_or(PortError::NotImplemented(
            "window.ethereum.request is unavailable",
        ))?;

    let request = serde_json::json!({
        "method": method,
        "params": params,
    });
    let request_js = serde_wasm_bindgen::to_value(&request)
        .map_err(|e| PortError::Transport(format!("failed to encode wasm request: {e}")))?;
    let promise_js = request_fn
        .call1(&provider, &request_js)
        .map_err(|e| PortError::Transport(format!("provider request dispatch failed: {e:?}")))?;
    let promise = promise_js
        .dyn_into::<js_sys::Promise>()
        .map_err(|_| PortError::Transport("provider request did not return Promise".to_owned()))?;
    match wasm_bindgen_futures::JsFuture::from(promise).await {
        Ok(result_js) => serde_wasm_bindgen::from_value(result_js)
            .map_err(|e| PortError::Transport(format!("failed to decode wasm response: {e}"))),
        Err(err_js) => {
            let err: Value = serde_wasm_bindgen::from_value(err_js.clone())
                .unwrap_or_else(|_| Value::from(format!("{err_js:?}")));
            Err(PortError::from_rpc_error(&err))
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn browser_provider_available() -> bool {
    browser_provider().is_ok()
}

#[cfg(target_arch = "wasm32")]
fn browser_provider() -> Result<wasm_bindgen::JsValue, PortError> {
    let window =
        web_sys::window().ok_or_else(|| PortError::Transport("missing window".to_owned()))?;
    let provider = get_prop(&window.into(), "ethereum")?;
    if provider.is_null() || provider.is_undefined() {
        return Err(PortError::NotFound("window.ethereum missing".to_owned()));
    }
    Ok(provider)
}

#[cfg(target_arch = "wasm32")]
fn get_prop(target: &wasm_bindgen::JsValue, key: &str) -> Result<wasm_bindgen::JsValue, PortError> {
    js_sys::Reflect::get(target, &wasm_bindgen::JsValue::from_str(key))
        .map_err(|e| PortError::Transport(format!("read provider property {key} failed: {e:?}")))
}

#[cfg(target_arch = "wasm32")]
fn js_chain_id(value: wasm_bindgen::JsValue) -> Result<String, PortError> {
    if let Some(s) = value.as_string() {
        return Ok(s);
    }
    if let Some(num) = value.as_f64() {
        return Ok(format!("0x{:x}", num as u64));
    }
    Err(PortError::Validation("invalid JS chain id".to_owned()))
}

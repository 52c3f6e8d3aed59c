//! Home hero: wallet connect panel plus the entry points into the app.

use std::sync::Arc;

use alloy::primitives::{Bytes, B256};
use serde::Serialize;
use serde_json::Value;

use bks_wallet_core::{
    ChainSpec, PortError, ProviderPort, RequestResult, TransactionParams, UserInfo,
    WalletSessionBridge,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavIntent {
    Explore,
    SignIn,
}

/// What the hero renders, as plain strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeroView {
    pub account: Option<String>,
    pub chain: Option<String>,
    pub balance: Option<String>,
    pub response: Option<String>,
}

pub struct HeroScreen<P> {
    bridge: WalletSessionBridge<P>,
    user_info: Option<UserInfo>,
}

impl<P: ProviderPort> HeroScreen<P> {
    pub fn mount(provider: Arc<P>) -> Result<Self, PortError> {
        Ok(Self {
            bridge: WalletSessionBridge::mount(provider)?,
            user_info: None,
        })
    }

    pub fn unmount(self) {
        self.bridge.unmount();
    }

    pub fn bridge(&self) -> &WalletSessionBridge<P> {
        &self.bridge
    }

    /// Replaces the stored sign-in record. Malformed input counts as signed out.
    pub fn set_user_info(&mut self, raw: Option<&str>) {
        self.user_info = UserInfo::parse(raw);
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_info.is_some()
    }

    pub fn nav_intents(&self) -> Vec<NavIntent> {
        let mut intents = vec![NavIntent::Explore];
        if !self.is_signed_in() {
            intents.push(NavIntent::SignIn);
        }
        intents
    }

    pub async fn connect(&self) -> Option<String> {
        self.bridge.connect().await.map(|a| a.to_string())
    }

    pub async fn add_polygon(&self) -> Option<Value> {
        self.bridge.add_chain(&ChainSpec::polygon()).await
    }

    pub async fn sign(&self) -> Option<Bytes> {
        self.bridge.sign_ether_mail().await
    }

    pub async fn send_transaction(&self) -> Option<B256> {
        self.bridge
            .send_transaction(TransactionParams::default())
            .await
    }

    pub async fn pump_events(&self) -> usize {
        self.bridge.pump_events().await
    }

    pub fn view(&self) -> HeroView {
        let session = self.bridge.session();
        HeroView {
            account: session.connected_address.map(|a| a.to_string()),
            chain: session.chain_id,
            balance: session.balance,
            response: self.bridge.last_result().map(|r| describe(&r)),
        }
    }
}

fn describe(result: &RequestResult) -> String {
    match result {
        RequestResult::TransactionHash(hash) => hash.to_string(),
        RequestResult::Signature(sig) => sig.to_string(),
        RequestResult::ChainAdded(ack) => ack.to_string(),
    }
}

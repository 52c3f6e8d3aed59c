//! Provider event fan-out.
//!
//! Providers push `accountsChanged` / `chainChanged` notifications into an
//! [`EventHub`]; every live [`EventSubscription`] receives its own copy in
//! emission order. Dropping a subscription removes it from the hub.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

use alloy::primitives::Address;
use tokio::sync::mpsc;

use crate::ports::PortError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    ChainChanged(String),
    AccountsChanged(Vec<Address>),
}

impl ProviderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChainChanged(_) => "chainChanged",
            Self::AccountsChanged(_) => "accountsChanged",
        }
    }
}

#[derive(Debug, Default)]
struct HubState {
    next_id: u64,
    listeners: BTreeMap<u64, mpsc::UnboundedSender<ProviderEvent>>,
}

#[derive(Debug, Clone, Default)]
pub struct EventHub {
    inner: Arc<Mutex<HubState>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Result<EventSubscription, PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("event hub lock poisoned: {e}")))?;
        g.next_id = g.next_id.saturating_add(1);
        let id = g.next_id;
        let (tx, rx) = mpsc::unbounded_channel();
        g.listeners.insert(id, tx);
        tracing::debug!(subscription = id, "provider event subscription registered");
        Ok(EventSubscription {
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
        })
    }

    /// Delivers `event` to every live subscription and returns how many received it.
    pub fn emit(&self, event: ProviderEvent) -> Result<usize, PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("event hub lock poisoned: {e}")))?;
        g.listeners.retain(|_, tx| tx.send(event.clone()).is_ok());
        tracing::debug!(
            event = event.name(),
            listeners = g.listeners.len(),
            "provider event emitted"
        );
        Ok(g.listeners.len())
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().map(|g| g.listeners.len()).unwrap_or(0)
    }
}

#[derive(Debug)]
pub struct EventSubscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<ProviderEvent>,
    hub: Weak<Mutex<HubState>>,
}

impl EventSubscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next queued event without waiting.
    pub fn try_next(&mut self) -> Option<ProviderEvent> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next event. `None` once the hub is gone.
    pub async fn next(&mut self) -> Option<ProviderEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            if let Ok(mut g) = hub.lock() {
                g.listeners.remove(&self.id);
            }
        }
        tracing::debug!(subscription = self.id, "provider event subscription released");
    }
}

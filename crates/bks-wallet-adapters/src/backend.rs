use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;

use bks_wallet_core::{
    EventBackendPort, EventCard, EventCardsReply, EventId, LikeList, LikeUpdateReply,
    LikeUpdateRequest, PortError,
};

use crate::AdapterConfig;

#[derive(Debug, Clone)]
pub struct EventBackendAdapter {
    mode: BackendMode,
}

#[derive(Debug, Clone)]
enum BackendMode {
    Disabled(String),
    InMemory(Arc<Mutex<Vec<EventCard>>>),
    Http(HttpRuntime),
}

#[derive(Debug, Clone)]
struct HttpRuntime {
    client: reqwest::Client,
    cards_url: String,
    update_like_url: String,
}

impl Default for EventBackendAdapter {
    fn default() -> Self {
        Self::in_memory(Vec::new())
    }
}

impl EventBackendAdapter {
    pub fn in_memory(cards: Vec<EventCard>) -> Self {
        Self {
            mode: BackendMode::InMemory(Arc::new(Mutex::new(cards))),
        }
    }

    pub fn with_config(config: &AdapterConfig) -> Self {
        let Some(base) = config.api_base_url.as_deref() else {
            if config.strict_runtime_required() {
                return Self::disabled(
                    "backend base URL not configured in production runtime profile",
                );
            }
            return Self::default();
        };

        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder =
            builder.timeout(std::time::Duration::from_millis(config.request_timeout_ms));
        match builder.build() {
            Ok(client) => {
                let base = base.trim_end_matches('/');
                Self {
                    mode: BackendMode::Http(HttpRuntime {
                        client,
                        cards_url: format!("{base}{}", config.event_cards_path),
                        update_like_url: format!("{base}{}", config.update_like_path),
                    }),
                }
            }
            Err(e) => Self::disabled(format!("failed to initialize backend client: {e}")),
        }
    }

    fn disabled(reason: impl Into<String>) -> Self {
        Self {
            mode: BackendMode::Disabled(reason.into()),
        }
    }

    pub fn mode_label(&self) -> &'static str {
        match self.mode {
            BackendMode::Disabled(_) => "disabled",
            BackendMode::InMemory(_) => "in_memory",
            BackendMode::Http(_) => "http",
        }
    }
}

fn lock(cards: &Mutex<Vec<EventCard>>) -> Result<MutexGuard<'_, Vec<EventCard>>, PortError> {
    cards
        .lock()
        .map_err(|e| PortError::Transport(format!("backend lock poisoned: {e}")))
}

impl HttpRuntime {
    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, PortError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PortError::Transport(format!("backend request failed: {e}")))?;
        Self::decode(url, response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, PortError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| PortError::Transport(format!("backend request failed: {e}")))?;
        Self::decode(url, response).await
    }

    async fn decode<T: DeserializeOwned>(
        url: &str,
        response: reqwest::Response,
    ) -> Result<T, PortError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PortError::NotFound(url.to_owned()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Transport(format!(
                "backend status {status} for {url}: {body}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| PortError::Validation(format!("backend response decode failed: {e}")))
    }
}

impl EventBackendPort for EventBackendAdapter {
    async fn all_event_cards(&self) -> Result<EventCardsReply, PortError> {
        match &self.mode {
            BackendMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
            BackendMode::InMemory(cards) => Ok(EventCardsReply {
                success: true,
                eventcards: lock(cards)?.clone(),
            }),
            BackendMode::Http(http) => {
                let reply: EventCardsReply = http.get(&http.cards_url).await?;
                tracing::debug!(
                    success = reply.success,
                    cards = reply.eventcards.len(),
                    "fetched event cards"
                );
                Ok(reply)
            }
        }
    }

    async fn update_event_like(
        &self,
        id: &EventId,
        likes: &LikeList,
    ) -> Result<LikeUpdateReply, PortError> {
        match &self.mode {
            BackendMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
            BackendMode::InMemory(cards) => {
                let mut g = lock(cards)?;
                let card = g
                    .iter_mut()
                    .find(|card| &card.id == id)
                    .ok_or_else(|| PortError::NotFound(format!("event {id}")))?;
                card.likes_number = Some(likes.to_json_string());
                Ok(LikeUpdateReply {
                    success: true,
                    message: None,
                })
            }
            BackendMode::Http(http) => {
                let request = LikeUpdateRequest {
                    id: id.clone(),
                    likes_number: likes.to_json_string(),
                };
                let reply: LikeUpdateReply = http.post(&http.update_like_url, &request).await?;
                tracing::debug!(event = %id, success = reply.success, "like update sent");
                Ok(reply)
            }
        }
    }
}

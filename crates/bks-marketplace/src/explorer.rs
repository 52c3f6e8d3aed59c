//! Event explorer: searchable card list with per-user likes.

use bks_wallet_core::{
    filter_by_name, EventBackendPort, EventCard, EventId, PortError, UserInfo,
};

pub struct ExplorerScreen<B> {
    backend: B,
    api_base_url: Option<String>,
    cards: Vec<EventCard>,
    visible: Vec<EventCard>,
    search: Option<String>,
    user_info: Option<UserInfo>,
    loading: bool,
}

impl<B: EventBackendPort> ExplorerScreen<B> {
    pub fn new(backend: B, api_base_url: Option<String>) -> Self {
        Self {
            backend,
            api_base_url,
            cards: Vec::new(),
            visible: Vec::new(),
            search: None,
            user_info: None,
            loading: true,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn visible(&self) -> &[EventCard] {
        &self.visible
    }

    pub fn card(&self, id: &EventId) -> Option<&EventCard> {
        self.cards.iter().find(|c| &c.id == id)
    }

    pub fn picture_url(&self, card: &EventCard) -> Option<String> {
        card.picture_url(self.api_base_url.as_deref().unwrap_or_default())
    }

    /// Fetches the card list. Once a fetch succeeds later calls are no-ops.
    pub async fn load(&mut self) -> Result<(), PortError> {
        if !self.loading {
            return Ok(());
        }
        let reply = self.backend.all_event_cards().await?;
        if !reply.success {
            tracing::warn!("backend reported failure listing event cards");
            return Ok(());
        }
        tracing::info!(cards = reply.eventcards.len(), "event cards loaded");
        self.cards = reply.eventcards;
        self.loading = false;
        self.refilter();
        Ok(())
    }

    pub fn set_search(&mut self, search: Option<String>) {
        self.search = search;
        self.refilter();
    }

    pub fn set_user_info(&mut self, raw: Option<&str>) {
        self.user_info = UserInfo::parse(raw);
    }

    /// Flips the signed-in user's like on `id`. Returns the new liked state once the
    /// backend accepted it; `None` leaves the screen unchanged.
    pub async fn toggle_like(&mut self, id: &EventId) -> Option<bool> {
        let user = self.user_info.as_ref()?.user_id()?.clone();
        let mut likes = self.card(id)?.likes();
        let liked = likes.toggle(&user);

        match self.backend.update_event_like(id, &likes).await {
            Ok(reply) if reply.success => {
                if let Some(card) = self.cards.iter_mut().find(|c| &c.id == id) {
                    card.likes_number = Some(likes.to_json_string());
                }
                self.refilter();
                tracing::debug!(event = %id, liked, "like updated");
                Some(liked)
            }
            Ok(reply) => {
                tracing::warn!(event = %id, message = ?reply.message, "backend refused like update");
                None
            }
            Err(e) => {
                tracing::warn!(event = %id, error = %e, "like update failed");
                None
            }
        }
    }

    fn refilter(&mut self) {
        self.visible = filter_by_name(&self.cards, self.search.as_deref());
    }
}

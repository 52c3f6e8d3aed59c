#![allow(dead_code)]

use std::sync::Mutex;

use serde_json::json;

use bks_wallet_core::{
    EventBackendPort, EventCard, EventCardsReply, EventId, LikeList, LikeUpdateReply, PortError,
};

pub fn cards() -> Vec<EventCard> {
    serde_json::from_value(json!([
        {
            "id": 1,
            "name": "Jazz Night",
            "likes_number": "[7, 8]",
            "picture_small": "jazz.png",
            "totoal_ticekts": 10,
            "buy_count": 10
        },
        {
            "id": 2,
            "name": "Rock Fest",
            "likes_number": "not json",
            "totoal_ticekts": 500,
            "buy_count": 12
        },
        {
            "id": "vip-3",
            "name": "Jazz Brunch",
            "likes_number": "{\"a\": 1}"
        }
    ]))
    .expect("fixture cards")
}

pub const SIGNED_IN: &str = r#"{"user": {"id": 7, "name": "ana"}}"#;

/// Backend whose answers are set per test; records every like update it receives.
pub struct ScriptedBackend {
    pub listing: Mutex<Vec<Result<EventCardsReply, PortError>>>,
    pub like_reply: Mutex<Result<LikeUpdateReply, PortError>>,
    pub updates: Mutex<Vec<(EventId, LikeList)>>,
}

impl ScriptedBackend {
    pub fn serving(cards: Vec<EventCard>) -> Self {
        Self {
            listing: Mutex::new(vec![Ok(EventCardsReply {
                success: true,
                eventcards: cards,
            })]),
            like_reply: Mutex::new(Ok(LikeUpdateReply {
                success: true,
                message: None,
            })),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn set_like_reply(&self, reply: Result<LikeUpdateReply, PortError>) {
        *self.like_reply.lock().expect("lock") = reply;
    }

    pub fn updates(&self) -> Vec<(EventId, LikeList)> {
        self.updates.lock().expect("lock").clone()
    }
}

impl EventBackendPort for ScriptedBackend {
    async fn all_event_cards(&self) -> Result<EventCardsReply, PortError> {
        let mut listing = self.listing.lock().expect("lock");
        if listing.len() > 1 {
            listing.remove(0)
        } else {
            listing[0].clone()
        }
    }

    async fn update_event_like(
        &self,
        id: &EventId,
        likes: &LikeList,
    ) -> Result<LikeUpdateReply, PortError> {
        self.updates
            .lock()
            .expect("lock")
            .push((id.clone(), likes.clone()));
        self.like_reply.lock().expect("lock").clone()
    }
}

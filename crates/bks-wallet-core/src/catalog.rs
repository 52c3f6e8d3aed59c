//! Event cards served by the marketplace backend.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::likes::{LikeList, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for EventId {
    fn from(value: u64) -> Self {
        Self::Numeric(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCard {
    pub id: EventId,
    #[serde(default)]
    pub name: String,
    /// Raw like column: a JSON-encoded array of user ids.
    #[serde(default, deserialize_with = "like_column")]
    pub likes_number: Option<String>,
    #[serde(default)]
    pub picture_small: Option<String>,
    #[serde(default)]
    pub creator: Option<Party>,
    #[serde(default)]
    pub collection: Option<Collection>,
    // The backend column is misspelled.
    #[serde(default, rename = "totoal_ticekts", alias = "total_tickets")]
    pub total_tickets: Option<u64>,
    #[serde(default)]
    pub buy_count: Option<u64>,
    #[serde(default)]
    pub price: Option<Value>,
}

pub const UPLOAD_PATH: &str = "/api/upload/get_file?path=";

impl EventCard {
    pub fn likes(&self) -> LikeList {
        LikeList::parse_or_default(self.likes_number.as_deref())
    }

    pub fn likes_count(&self) -> usize {
        self.likes().len()
    }

    pub fn is_liked_by(&self, user: &UserId) -> bool {
        self.likes().contains(user)
    }

    pub fn is_sold_out(&self) -> bool {
        matches!((self.total_tickets, self.buy_count), (Some(total), Some(bought)) if total == bought)
    }

    pub fn picture_url(&self, api_base_url: &str) -> Option<String> {
        self.picture_small.as_ref().map(|path| {
            format!("{}{UPLOAD_PATH}{path}", api_base_url.trim_end_matches('/'))
        })
    }

    pub fn reserve_price(&self) -> Option<String> {
        match self.price.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Cards whose name contains `search`; all cards when there is no search.
pub fn filter_by_name(cards: &[EventCard], search: Option<&str>) -> Vec<EventCard> {
    match search {
        Some(needle) => cards
            .iter()
            .filter(|card| card.name.contains(needle))
            .cloned()
            .collect(),
        None => cards.to_vec(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventCardsReply {
    pub success: bool,
    #[serde(default)]
    pub eventcards: Vec<EventCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeUpdateRequest {
    pub id: EventId,
    pub likes_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeUpdateReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
}

/// Signed-in user record as persisted by the sign-in flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl UserInfo {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let raw = raw?;
        match serde_json::from_str::<Option<Self>>(raw) {
            Ok(info) => info,
            Err(e) => {
                tracing::debug!(error = %e, "stored user info is malformed");
                None
            }
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(|u| &u.id)
    }
}

fn like_column<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

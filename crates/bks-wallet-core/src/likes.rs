//! Per-event "like" lists.
//!
//! The backend stores likes as a JSON-encoded array of user ids inside a string
//! column. Anything that does not decode to such an array is an empty list.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LikeList(Vec<UserId>);

impl LikeList {
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str::<Vec<UserId>>(raw) {
            Ok(ids) => Self::from_ids(ids),
            Err(e) => {
                tracing::debug!(error = %e, "malformed like list treated as empty");
                Self::default()
            }
        }
    }

    /// Builds a list keeping the first occurrence of each id.
    pub fn from_ids(ids: impl IntoIterator<Item = UserId>) -> Self {
        let mut out: Vec<UserId> = Vec::new();
        for id in ids {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        Self(out)
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.0.contains(user)
    }

    /// Removes `user` if present, appends it otherwise. Returns whether `user` now likes the event.
    pub fn toggle(&mut self, user: &UserId) -> bool {
        match self.0.iter().position(|id| id == user) {
            Some(pos) => {
                self.0.remove(pos);
                false
            }
            None => {
                self.0.push(user.clone());
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> &[UserId] {
        &self.0
    }

    pub fn to_json_string(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_owned())
    }
}

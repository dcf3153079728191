use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{MatchEngineError, Result};

pub type RoomId = String;

/// Unordered pair of distinct user ids, stored sorted
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantPair {
    low: String,
    high: String,
}

impl ParticipantPair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Result<Self> {
        let (a, b) = (a.into(), b.into());
        if a == b {
            return Err(MatchEngineError::SelfChat(a));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    pub fn low(&self) -> &str {
        &self.low
    }

    pub fn high(&self) -> &str {
        &self.high
    }

    pub fn contains(&self, user: &str) -> bool {
        self.low == user || self.high == user
    }

    pub fn other(&self, user: &str) -> Option<&str> {
        if self.low == user {
            Some(&self.high)
        } else if self.high == user {
            Some(&self.low)
        } else {
            None
        }
    }

    /// Deterministic room id for this pair.
    ///
    /// The length prefix keeps ids unambiguous even when user ids
    /// contain the separator.
    pub fn room_id(&self) -> RoomId {
        format!("dm_{}_{}_{}", self.low.len(), self.low, self.high)
    }
}

/// Conversation between two matched users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: RoomId,
    pub participants: ParticipantPair,
    #[serde(default)]
    pub last_message: String,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_message_read_by: BTreeSet<String>,
}

impl ChatRoom {
    /// Fresh room with no history
    pub fn new(participants: ParticipantPair) -> Self {
        Self {
            id: participants.room_id(),
            participants,
            last_message: String::new(),
            last_message_at: None,
            last_message_read_by: BTreeSet::new(),
        }
    }

    /// Whether `user` has seen the latest message (no message counts as read)
    pub fn is_read_by(&self, user: &str) -> bool {
        self.last_message_at.is_none() || self.last_message_read_by.contains(user)
    }
}

/// One message in a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub room_id: RoomId,
    pub sender_id: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_unordered() {
        let ab = ParticipantPair::new("alice", "bob").unwrap();
        let ba = ParticipantPair::new("bob", "alice").unwrap();

        assert_eq!(ab, ba);
        assert_eq!(ab.room_id(), ba.room_id());
        assert_eq!(ab.other("alice"), Some("bob"));
        assert_eq!(ab.other("carol"), None);
    }

    #[test]
    fn test_pair_rejects_self() {
        assert!(matches!(
            ParticipantPair::new("alice", "alice"),
            Err(MatchEngineError::SelfChat(_))
        ));
    }

    #[test]
    fn test_room_id_is_unambiguous() {
        let p1 = ParticipantPair::new("a_1", "b").unwrap();
        let p2 = ParticipantPair::new("a", "1_b").unwrap();
        assert_ne!(p1.room_id(), p2.room_id());
    }

    #[test]
    fn test_new_room_is_read() {
        let room = ChatRoom::new(ParticipantPair::new("a", "b").unwrap());
        assert!(room.is_read_by("a"));
        assert!(room.last_message_read_by.is_empty());
    }
}

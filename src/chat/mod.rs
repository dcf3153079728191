pub mod resolver;
pub mod room;
pub mod sqlite;
pub mod subscription;

use async_trait::async_trait;
use crate::error::Result;

pub use resolver::ChatRoomResolver;
pub use room::{ChatMessage, ChatRoom, ParticipantPair, RoomId};
pub use sqlite::SqliteChatStore;
pub use subscription::{MessageSubscription, SubscriptionHub};

/// Trait for chat room persistence with push-based message updates
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Room for this exact pair, if one exists
    async fn find_room(&self, pair: &ParticipantPair) -> Result<Option<RoomId>>;

    /// Create the pair's room, or return the existing one's id
    async fn create_room(&self, pair: &ParticipantPair) -> Result<RoomId>;

    /// Get room by ID
    async fn room(&self, room_id: &str) -> Result<Option<ChatRoom>>;

    /// Store a message and make it the room's latest, read only by its sender
    async fn append_message(&self, room_id: &str, sender_id: &str, text: &str) -> Result<ChatMessage>;

    /// Record that `user_id` has seen the room's latest message
    async fn mark_read(&self, room_id: &str, user_id: &str) -> Result<()>;

    /// Full history, oldest first
    async fn messages(&self, room_id: &str) -> Result<Vec<ChatMessage>>;

    /// Rooms with at least one message, most recent activity first
    async fn rooms_for(&self, user_id: &str) -> Result<Vec<ChatRoom>>;

    /// Listen for messages appended from now on
    async fn subscribe_messages(&self, room_id: &str) -> Result<MessageSubscription>;
}

use std::sync::Arc;

use crate::chat::{ChatStore, ParticipantPair, RoomId};
use crate::error::Result;

/// Finds or opens the single room shared by two users.
///
/// Lookup-before-create alone cannot stop two concurrent callers from
/// both creating a room; that guarantee comes from the store's
/// `create_room`, which must be a conditional insert keyed on the pair.
#[derive(Clone)]
pub struct ChatRoomResolver {
    store: Arc<dyn ChatStore>,
}

impl ChatRoomResolver {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ChatStore> {
        &self.store
    }

    pub async fn get_or_create_room(&self, user_a: &str, user_b: &str) -> Result<RoomId> {
        let pair = ParticipantPair::new(user_a, user_b)?;

        if let Some(id) = self.store.find_room(&pair).await? {
            tracing::debug!("Reusing chat room {} for {} and {}", id, user_a, user_b);
            return Ok(id);
        }

        self.store.create_room(&pair).await
    }
}

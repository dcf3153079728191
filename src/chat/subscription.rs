use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::chat::room::ChatMessage;

/// Per-room fan-out of newly appended messages
#[derive(Clone)]
pub struct SubscriptionHub {
    rooms: Arc<Mutex<HashMap<String, broadcast::Sender<ChatMessage>>>>,
    capacity: usize,
}

impl SubscriptionHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    fn rooms(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<ChatMessage>>> {
        // The map stays consistent even if a holder panicked
        self.rooms.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn subscribe(&self, room_id: &str) -> MessageSubscription {
        let receiver = self
            .rooms()
            .entry(room_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();

        MessageSubscription {
            room_id: room_id.to_string(),
            receiver: Some(receiver),
            hub: self.clone(),
        }
    }

    /// Returns how many subscribers were notified
    pub fn publish(&self, message: &ChatMessage) -> usize {
        match self.rooms().get(&message.room_id) {
            Some(sender) => sender.send(message.clone()).unwrap_or(0),
            None => 0,
        }
    }

    /// Rooms with at least one live subscription
    pub fn active_rooms(&self) -> usize {
        self.rooms().len()
    }

    fn release(&self, room_id: &str) {
        let mut rooms = self.rooms();
        if rooms
            .get(room_id)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            rooms.remove(room_id);
        }
    }
}

/// Scoped registration for a room's new messages.
///
/// Call [`unsubscribe`](Self::unsubscribe) or drop the handle to stop
/// listening.
pub struct MessageSubscription {
    room_id: String,
    receiver: Option<broadcast::Receiver<ChatMessage>>,
    hub: SubscriptionHub,
}

impl MessageSubscription {
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Wait for the next message; `None` once unsubscribed
    pub async fn next(&mut self) -> Option<ChatMessage> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Subscriber on {} lagged, skipped {} messages", self.room_id, skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.receiver.take().is_some() {
            self.hub.release(&self.room_id);
        }
    }
}

impl Drop for MessageSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

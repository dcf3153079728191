use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::chat::{ChatMessage, ChatRoom, ChatStore, MessageSubscription, ParticipantPair, RoomId, SubscriptionHub};
use crate::error::{Result, MatchEngineError};

/// SQLite-based chat store.
///
/// Room ids come from [`ParticipantPair::room_id`] and the pair columns
/// are UNIQUE, so creation is an idempotent conditional insert:
/// ```sql
/// CREATE TABLE chat_rooms (
///     id TEXT PRIMARY KEY,
///     participant_low TEXT NOT NULL,
///     participant_high TEXT NOT NULL,
///     last_message TEXT NOT NULL DEFAULT '',
///     last_message_at TEXT,
///     created_at TEXT NOT NULL,
///     UNIQUE (participant_low, participant_high)
/// );
/// ```
pub struct SqliteChatStore {
    conn: Arc<Mutex<Connection>>,
    hub: SubscriptionHub,
}

/// Fixed-width so text order equals time order
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| MatchEngineError::Store(format!("bad timestamp '{raw}': {e}")))
}

impl SqliteChatStore {
    /// Create new SQLite chat store
    pub async fn new(db_path: &str, message_buffer: usize) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS chat_rooms (
                id TEXT PRIMARY KEY,
                participant_low TEXT NOT NULL,
                participant_high TEXT NOT NULL,
                last_message TEXT NOT NULL DEFAULT '',
                last_message_at TEXT,
                created_at TEXT NOT NULL,
                UNIQUE (participant_low, participant_high)
            );
            CREATE TABLE IF NOT EXISTS chat_room_reads (
                room_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                PRIMARY KEY (room_id, user_id)
            );
            CREATE TABLE IF NOT EXISTS chat_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                room_id TEXT NOT NULL,
                sender_id TEXT NOT NULL,
                text TEXT NOT NULL,
                sent_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_chat_messages_room ON chat_messages(room_id, id);",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            hub: SubscriptionHub::new(message_buffer),
        })
    }

    pub fn hub(&self) -> &SubscriptionHub {
        &self.hub
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| MatchEngineError::Store("chat connection lock poisoned".into()))
    }

    fn load_room(conn: &Connection, room_id: &str) -> Result<Option<ChatRoom>> {
        let row = conn
            .query_row(
                "SELECT participant_low, participant_high, last_message, last_message_at
                 FROM chat_rooms WHERE id = ?",
                params![room_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((low, high, last_message, last_message_at)) = row else {
            return Ok(None);
        };

        let mut stmt = conn.prepare("SELECT user_id FROM chat_room_reads WHERE room_id = ?")?;
        let last_message_read_by: BTreeSet<String> = stmt
            .query_map(params![room_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<_>>()?;

        Ok(Some(ChatRoom {
            id: room_id.to_string(),
            participants: ParticipantPair::new(low, high)?,
            last_message,
            last_message_at: last_message_at.as_deref().map(parse_timestamp).transpose()?,
            last_message_read_by,
        }))
    }

    /// Room must exist and `user_id` must be in it
    fn require_participant(conn: &Connection, room_id: &str, user_id: &str) -> Result<ChatRoom> {
        let room = Self::load_room(conn, room_id)?
            .ok_or_else(|| MatchEngineError::RoomNotFound(room_id.to_string()))?;
        if !room.participants.contains(user_id) {
            return Err(MatchEngineError::NotParticipant {
                room: room_id.to_string(),
                user: user_id.to_string(),
            });
        }
        Ok(room)
    }
}

#[async_trait]
impl ChatStore for SqliteChatStore {
    async fn find_room(&self, pair: &ParticipantPair) -> Result<Option<RoomId>> {
        let conn = self.lock()?;
        let id = conn
            .query_row(
                "SELECT id FROM chat_rooms WHERE participant_low = ?1 AND participant_high = ?2",
                params![pair.low(), pair.high()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    async fn create_room(&self, pair: &ParticipantPair) -> Result<RoomId> {
        let conn = self.lock()?;

        // One room per pair is enforced here: the insert is ignored when
        // UNIQUE(participant_low, participant_high) already holds the pair.
        // The resolver's lookup beforehand only saves a write.
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO chat_rooms (id, participant_low, participant_high, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![pair.room_id(), pair.low(), pair.high(), timestamp(Utc::now())],
        )?;

        let id: RoomId = conn.query_row(
            "SELECT id FROM chat_rooms WHERE participant_low = ?1 AND participant_high = ?2",
            params![pair.low(), pair.high()],
            |row| row.get(0),
        )?;

        if inserted > 0 {
            tracing::info!("Created chat room {} for {} and {}", id, pair.low(), pair.high());
        }
        Ok(id)
    }

    async fn room(&self, room_id: &str) -> Result<Option<ChatRoom>> {
        let conn = self.lock()?;
        Self::load_room(&conn, room_id)
    }

    async fn append_message(&self, room_id: &str, sender_id: &str, text: &str) -> Result<ChatMessage> {
        let message = {
            let mut conn = self.lock()?;
            Self::require_participant(&conn, room_id, sender_id)?;

            let sent_at = Utc::now();
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO chat_messages (room_id, sender_id, text, sent_at) VALUES (?1, ?2, ?3, ?4)",
                params![room_id, sender_id, text, timestamp(sent_at)],
            )?;
            let id = tx.last_insert_rowid();
            tx.execute(
                "UPDATE chat_rooms SET last_message = ?1, last_message_at = ?2 WHERE id = ?3",
                params![text, timestamp(sent_at), room_id],
            )?;
            tx.execute("DELETE FROM chat_room_reads WHERE room_id = ?", params![room_id])?;
            tx.execute(
                "INSERT INTO chat_room_reads (room_id, user_id) VALUES (?1, ?2)",
                params![room_id, sender_id],
            )?;
            tx.commit()?;

            ChatMessage {
                id,
                room_id: room_id.to_string(),
                sender_id: sender_id.to_string(),
                text: text.to_string(),
                sent_at,
            }
        };

        let notified = self.hub.publish(&message);
        tracing::debug!("Message {} in {} pushed to {} subscribers", message.id, room_id, notified);
        Ok(message)
    }

    async fn mark_read(&self, room_id: &str, user_id: &str) -> Result<()> {
        let conn = self.lock()?;
        Self::require_participant(&conn, room_id, user_id)?;
        conn.execute(
            "INSERT OR IGNORE INTO chat_room_reads (room_id, user_id) VALUES (?1, ?2)",
            params![room_id, user_id],
        )?;
        Ok(())
    }

    async fn messages(&self, room_id: &str) -> Result<Vec<ChatMessage>> {
        let conn = self.lock()?;
        if Self::load_room(&conn, room_id)?.is_none() {
            return Err(MatchEngineError::RoomNotFound(room_id.to_string()));
        }

        let mut stmt = conn.prepare(
            "SELECT id, sender_id, text, sent_at FROM chat_messages WHERE room_id = ? ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![room_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, sender_id, text, sent_at)| {
                Ok(ChatMessage {
                    id,
                    room_id: room_id.to_string(),
                    sender_id,
                    text,
                    sent_at: parse_timestamp(&sent_at)?,
                })
            })
            .collect()
    }

    async fn rooms_for(&self, user_id: &str) -> Result<Vec<ChatRoom>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT r.id FROM chat_rooms r
             WHERE (r.participant_low = ?1 OR r.participant_high = ?1)
               AND EXISTS (SELECT 1 FROM chat_messages m WHERE m.room_id = r.id)
             ORDER BY r.last_message_at DESC,
                      (SELECT MAX(m.id) FROM chat_messages m WHERE m.room_id = r.id) DESC",
        )?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut rooms = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(room) = Self::load_room(&conn, &id)? {
                rooms.push(room);
            }
        }
        Ok(rooms)
    }

    async fn subscribe_messages(&self, room_id: &str) -> Result<MessageSubscription> {
        {
            let conn = self.lock()?;
            if Self::load_room(&conn, room_id)?.is_none() {
                return Err(MatchEngineError::RoomNotFound(room_id.to_string()));
            }
        }
        Ok(self.hub.subscribe(room_id))
    }
}

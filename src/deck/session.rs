use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use crate::chat::RoomId;
use crate::core::{ScoredCandidate, Session};
use crate::deck::{DeckEvent, DeckState, Swipe, SwipeDeck, SwipeDirection};
use crate::engine::{MatchEngine, SearchRequest};
use crate::error::Result;

/// What happened to a load/refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The deck now shows this pass's ranking
    Loaded { generation: u64, len: usize },
    /// A newer pass started while this one was fetching; result dropped
    Stale { generation: u64 },
}

/// One user's swipe deck, safe to share between tasks.
///
/// Every operation takes the deck lock, so calls are applied one at a
/// time in the order they acquire it. Candidate fetches run outside the
/// lock; each pass is tagged with a generation and only the newest one
/// may replace the deck.
pub struct DeckSession {
    engine: Arc<MatchEngine>,
    session: Session,
    deck: Mutex<SwipeDeck>,
    events: broadcast::Sender<DeckEvent>,
}

impl DeckSession {
    pub fn new(engine: Arc<MatchEngine>, session: Session, event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            engine,
            session,
            deck: Mutex::new(SwipeDeck::new()),
            events,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Listen for deck events
    pub fn subscribe(&self) -> broadcast::Receiver<DeckEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: DeckEvent) {
        // No listeners is fine
        let _ = self.events.send(event);
    }

    /// Rank candidates for `request` and replace the deck.
    ///
    /// An invalid searcher fails before anything changes. A failed fetch
    /// leaves the previous deck in place so the caller can offer a retry.
    pub async fn load(&self, request: &SearchRequest) -> Result<LoadOutcome> {
        request.searcher(&self.session).ensure_searcher()?;

        let generation = self.deck.lock().await.begin_load();
        tracing::debug!("Deck pass {} started for {}", generation, self.session.user_id());

        let ranked = match self.engine.search(&self.session, request).await {
            Ok(ranked) => ranked,
            Err(e) => {
                self.deck.lock().await.abort_load(generation);
                tracing::warn!("Deck pass {} failed for {}: {}", generation, self.session.user_id(), e);
                return Err(e);
            }
        };

        let len = ranked.len();
        let mut deck = self.deck.lock().await;
        if !deck.finish_load(generation, ranked) {
            tracing::warn!(
                "Dropping stale deck pass {} (latest is {})",
                generation,
                deck.generation()
            );
            return Ok(LoadOutcome::Stale { generation });
        }

        tracing::info!("Deck loaded for {}: {} candidates", self.session.user_id(), len);
        self.emit(DeckEvent::Loaded { generation, len });
        if deck.state() == DeckState::Exhausted {
            self.emit(DeckEvent::Exhausted);
        }

        Ok(LoadOutcome::Loaded { generation, len })
    }

    /// Discard cursor and undo state and load again
    pub async fn refresh(&self, request: &SearchRequest) -> Result<LoadOutcome> {
        self.load(request).await
    }

    pub async fn swipe_current(&self, direction: SwipeDirection) -> Option<Swipe> {
        let mut deck = self.deck.lock().await;
        let Some(swipe) = deck.swipe_current(direction) else {
            tracing::debug!("Swipe ignored, deck is {:?}", deck.state());
            return None;
        };

        self.emit(DeckEvent::Swiped {
            direction,
            candidate_id: swipe.candidate_id.clone(),
        });
        if swipe.exhausted {
            self.emit(DeckEvent::Exhausted);
        }
        Some(swipe)
    }

    /// Bring the last swiped card back; `None` if nothing was swiped
    pub async fn undo(&self) -> Option<ScoredCandidate> {
        let mut deck = self.deck.lock().await;
        let restored = deck.undo()?.clone();

        self.emit(DeckEvent::Restored {
            candidate_id: restored.id().to_string(),
        });
        Some(restored)
    }

    pub async fn current(&self) -> Option<ScoredCandidate> {
        self.deck.lock().await.current().cloned()
    }

    pub async fn state(&self) -> DeckState {
        self.deck.lock().await.state()
    }

    pub async fn cursor(&self) -> isize {
        self.deck.lock().await.cursor()
    }

    /// Copy of the whole deck (items, cursor, generation)
    pub async fn snapshot(&self) -> SwipeDeck {
        self.deck.lock().await.clone()
    }

    /// Open a chat with the card on top; `None` when no card is showing
    pub async fn request_chat(&self) -> Result<Option<RoomId>> {
        let Some(candidate_id) = self.current().await.map(|c| c.id().to_string()) else {
            return Ok(None);
        };

        self.emit(DeckEvent::ChatRequested {
            candidate_id: candidate_id.clone(),
        });
        let room = self.engine.start_chat(&self.session, &candidate_id).await?;
        Ok(Some(room))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::SqliteChatStore;
    use crate::config::EngineConfig;
    use crate::core::{Location, Profile};
    use crate::providers::StaticRepository;

    async fn deck_with(profiles: Vec<Profile>) -> DeckSession {
        let engine = Arc::new(MatchEngine::new(
            Arc::new(StaticRepository::with_profiles(profiles)),
            Arc::new(SqliteChatStore::new(":memory:", 8).await.unwrap()),
            EngineConfig::default(),
        ));
        engine.open_deck(Session::new(Profile::new(
            "me",
            ["Go Developer"],
            Location::new(0.0, 0.5),
        )))
    }

    fn go(id: &str, lat: f64) -> Profile {
        Profile::new(id, ["Go Developer"], Location::new(0.0, lat))
    }

    #[tokio::test]
    async fn test_load_and_swipe_emits_events() {
        let deck = deck_with(vec![go("far", 3.0), go("near", 1.0)]).await;
        let mut events = deck.subscribe();

        let outcome = deck.load(&SearchRequest::new(["Go Developer"])).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded { generation: 1, len: 2 });

        // Worst match is on top; the best one is dealt last
        assert_eq!(deck.current().await.unwrap().id(), "far");

        deck.swipe_current(SwipeDirection::Left).await.unwrap();
        deck.swipe_current(SwipeDirection::Right).await.unwrap();
        assert!(deck.swipe_current(SwipeDirection::Right).await.is_none());
        assert_eq!(deck.state().await, DeckState::Exhausted);

        assert_eq!(events.recv().await.unwrap(), DeckEvent::Loaded { generation: 1, len: 2 });
        assert_eq!(
            events.recv().await.unwrap(),
            DeckEvent::Swiped { direction: SwipeDirection::Left, candidate_id: "far".into() }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            DeckEvent::Swiped { direction: SwipeDirection::Right, candidate_id: "near".into() }
        );
        assert_eq!(events.recv().await.unwrap(), DeckEvent::Exhausted);
    }

    #[tokio::test]
    async fn test_empty_result_is_exhausted() {
        let deck = deck_with(vec![]).await;
        let mut events = deck.subscribe();

        deck.load(&SearchRequest::new(["Go Developer"])).await.unwrap();

        assert_eq!(deck.state().await, DeckState::Exhausted);
        assert_eq!(deck.cursor().await, -1);
        assert_eq!(events.recv().await.unwrap(), DeckEvent::Loaded { generation: 1, len: 0 });
        assert_eq!(events.recv().await.unwrap(), DeckEvent::Exhausted);
    }

    #[tokio::test]
    async fn test_undo_restores_card() {
        let deck = deck_with(vec![go("a", 1.0), go("b", 2.0), go("c", 3.0)]).await;
        deck.load(&SearchRequest::new(["Go Developer"])).await.unwrap();

        assert!(deck.undo().await.is_none());
        let top = deck.current().await.unwrap();
        deck.swipe_current(SwipeDirection::Left).await;

        assert_eq!(deck.undo().await.unwrap(), top);
        assert_eq!(deck.cursor().await, 2);
    }

    #[tokio::test]
    async fn test_request_chat_uses_current_card() {
        let deck = deck_with(vec![go("a", 1.0)]).await;
        assert!(deck.request_chat().await.unwrap().is_none());

        deck.load(&SearchRequest::new(["Go Developer"])).await.unwrap();
        let mut events = deck.subscribe();

        let room = deck.request_chat().await.unwrap().unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            DeckEvent::ChatRequested { candidate_id: "a".into() }
        );
        assert_eq!(deck.request_chat().await.unwrap(), Some(room));
    }
}

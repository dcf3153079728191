//! # PairGlide Match
//!
//! Collaborator matching engine behind the PairGlide app:
//! - Haversine distance between profiles
//! - Composite skill-overlap + proximity scoring
//! - Stable, bucketed candidate ranking
//! - Swipe deck with undo and generation-tagged refresh
//! - Idempotent one-room-per-pair chat resolution
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pairglide_match::{
//!     EngineConfig, Location, MatchEngine, Profile, SearchRequest, Session, SwipeDirection,
//!     chat::SqliteChatStore, providers::SqliteRepository,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EngineConfig::default();
//!     let profiles = Arc::new(SqliteRepository::new(&config.database_path).await?);
//!     let chat = Arc::new(SqliteChatStore::new(&config.database_path, config.message_buffer).await?);
//!     let engine = Arc::new(MatchEngine::new(profiles, chat, config));
//!
//!     let me = Profile::new("me", ["Go Developer"], Location::new(4.89, 52.37));
//!     let deck = engine.open_deck(Session::new(me));
//!     deck.load(&SearchRequest::new(["Go Developer"])).await?;
//!
//!     if let Some(card) = deck.current().await {
//!         println!("{}", card.display());
//!     }
//!     deck.swipe_current(SwipeDirection::Right).await;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod chat;
pub mod config;
pub mod deck;
pub mod ranking;
pub mod providers;
pub mod engine;
pub mod error;

// Re-export primary types
pub use crate::core::{Location, Profile, ProfileDocument, ScoredCandidate, Session};
pub use config::EngineConfig;
pub use deck::{DeckEvent, DeckSession, DeckState, LoadOutcome, SwipeDirection};
pub use engine::{MatchEngine, ScoreAgainst, SearchRequest};
pub use error::{MatchEngineError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

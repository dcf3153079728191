pub mod session;
pub mod swipe_deck;

use serde::{Deserialize, Serialize};

pub use session::{DeckSession, LoadOutcome};
pub use swipe_deck::{Swipe, SwipeDeck};

/// Direction of a swipe gesture; recorded, never scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

/// Where the deck is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckState {
    /// A ranking pass is in flight
    Loading,
    /// A card is showing
    Ready,
    /// Empty deck, or every card swiped away
    Exhausted,
}

/// Observable deck events for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeckEvent {
    Loaded { generation: u64, len: usize },
    Swiped { direction: SwipeDirection, candidate_id: String },
    Restored { candidate_id: String },
    Exhausted,
    ChatRequested { candidate_id: String },
}

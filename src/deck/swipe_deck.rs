use crate::core::ScoredCandidate;
use crate::deck::{DeckState, SwipeDirection};

/// A swipe that was applied to the deck
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swipe {
    pub direction: SwipeDirection,
    pub candidate_id: String,
    /// The swipe took the last card
    pub exhausted: bool,
}

/// Cursor state over one ranked sequence.
///
/// `items` is only ever replaced wholesale. The cursor starts on the
/// last item and walks toward `-1`; swiped cards go on a history stack
/// so undo can bring them back in order. At all times
/// `-1 <= cursor <= items.len() - 1` and
/// `history.len() == items.len() - 1 - cursor`.
#[derive(Debug, Clone)]
pub struct SwipeDeck {
    items: Vec<ScoredCandidate>,
    cursor: isize,
    history: Vec<Swipe>,
    generation: u64,
    loading: Option<u64>,
}

impl SwipeDeck {
    /// Empty, exhausted deck
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: -1,
            history: Vec::new(),
            generation: 0,
            loading: None,
        }
    }

    pub fn items(&self) -> &[ScoredCandidate] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    /// Generation of the most recently started ranking pass
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> DeckState {
        if self.loading.is_some() {
            DeckState::Loading
        } else if self.cursor < 0 {
            DeckState::Exhausted
        } else {
            DeckState::Ready
        }
    }

    /// Card currently presented
    pub fn current(&self) -> Option<&ScoredCandidate> {
        usize::try_from(self.cursor).ok().and_then(|i| self.items.get(i))
    }

    pub fn can_swipe(&self) -> bool {
        self.cursor >= 0
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Replace the deck with a fresh ranking, dropping cursor and undo state
    pub fn load(&mut self, items: Vec<ScoredCandidate>) {
        self.cursor = items.len() as isize - 1;
        self.items = items;
        self.history.clear();
        self.loading = None;
    }

    /// Tag a new ranking pass; earlier passes become stale
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.loading = Some(self.generation);
        self.generation
    }

    /// Apply a pass's result if no newer pass has started.
    ///
    /// Returns `false` (and leaves the deck untouched) for stale passes.
    pub fn finish_load(&mut self, generation: u64, items: Vec<ScoredCandidate>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.load(items);
        true
    }

    /// A pass failed: keep whatever was showing before it started
    pub fn abort_load(&mut self, generation: u64) {
        if self.loading == Some(generation) {
            self.loading = None;
        }
    }

    /// Swipe the current card away; `None` when there is nothing to swipe
    pub fn swipe_current(&mut self, direction: SwipeDirection) -> Option<Swipe> {
        let candidate_id = self.current()?.id().to_string();

        self.cursor -= 1;
        let swipe = Swipe {
            direction,
            candidate_id,
            exhausted: self.cursor < 0,
        };
        self.history.push(swipe.clone());
        Some(swipe)
    }

    /// Bring back the last swiped card; `None` when no swipe happened yet
    pub fn undo(&mut self) -> Option<&ScoredCandidate> {
        self.history.pop()?;
        self.cursor += 1;
        self.current()
    }
}

impl Default for SwipeDeck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Location, Profile};

    fn candidate(id: &str, score: i64) -> ScoredCandidate {
        ScoredCandidate {
            profile: Profile::new(id, ["Go Developer"], Location::new(1.0, 1.0)),
            skill_mismatch_penalty: 0,
            physical_distance_km: 0,
            shared_skills: 1,
            composite_score: score,
        }
    }

    fn three() -> Vec<ScoredCandidate> {
        vec![candidate("a", 1), candidate("b", 2), candidate("c", 3)]
    }

    #[test]
    fn test_new_deck_is_exhausted() {
        let deck = SwipeDeck::new();
        assert_eq!(deck.cursor(), -1);
        assert_eq!(deck.state(), DeckState::Exhausted);
        assert!(deck.current().is_none());
    }

    #[test]
    fn test_load_points_at_last_item() {
        let mut deck = SwipeDeck::new();
        deck.load(three());

        assert_eq!(deck.cursor(), 2);
        assert_eq!(deck.state(), DeckState::Ready);
        assert_eq!(deck.current().unwrap().id(), "c");
    }

    #[test]
    fn test_load_empty_is_exhausted() {
        let mut deck = SwipeDeck::new();
        deck.load(Vec::new());
        assert_eq!(deck.state(), DeckState::Exhausted);
        assert!(deck.swipe_current(SwipeDirection::Left).is_none());
    }

    #[test]
    fn test_swipe_swipe_undo() {
        let mut deck = SwipeDeck::new();
        deck.load(three());

        deck.swipe_current(SwipeDirection::Right).unwrap();
        let before_second = deck.current().cloned();
        deck.swipe_current(SwipeDirection::Left).unwrap();
        assert_eq!(deck.cursor(), 0);

        let restored = deck.undo().cloned();
        assert_eq!(deck.cursor(), 1);
        assert_eq!(restored, before_second);
        assert_eq!(restored.unwrap().id(), "b");
    }

    #[test]
    fn test_swipe_to_exhaustion() {
        let mut deck = SwipeDeck::new();
        deck.load(three());

        assert!(!deck.swipe_current(SwipeDirection::Left).unwrap().exhausted);
        assert!(!deck.swipe_current(SwipeDirection::Left).unwrap().exhausted);
        assert!(deck.swipe_current(SwipeDirection::Left).unwrap().exhausted);

        assert_eq!(deck.cursor(), -1);
        assert_eq!(deck.state(), DeckState::Exhausted);
        assert!(deck.swipe_current(SwipeDirection::Left).is_none());
        assert_eq!(deck.cursor(), -1);

        assert_eq!(deck.undo().unwrap().id(), "a");
        assert_eq!(deck.state(), DeckState::Ready);
    }

    #[test]
    fn test_undo_without_swipe_is_noop() {
        let mut deck = SwipeDeck::new();
        deck.load(three());

        assert!(!deck.can_undo());
        assert!(deck.undo().is_none());
        assert_eq!(deck.cursor(), 2);
    }

    #[test]
    fn test_bounds_hold_for_any_sequence() {
        let mut deck = SwipeDeck::new();
        deck.load(three());

        // Deterministic pseudo-random walk over swipe/undo
        let mut seed = 0x2545_f491_u32;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            if seed % 2 == 0 {
                deck.swipe_current(SwipeDirection::Left);
            } else {
                deck.undo();
            }
            assert!(deck.cursor() >= -1);
            assert!(deck.cursor() <= deck.len() as isize - 1);
            assert_eq!(deck.history.len() as isize, deck.len() as isize - 1 - deck.cursor());
        }
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let mut deck = SwipeDeck::new();

        let slow = deck.begin_load();
        let fast = deck.begin_load();
        assert_eq!(deck.state(), DeckState::Loading);

        assert!(deck.finish_load(fast, vec![candidate("new", 1)]));
        assert!(!deck.finish_load(slow, three()));

        assert_eq!(deck.len(), 1);
        assert_eq!(deck.current().unwrap().id(), "new");
        assert_eq!(deck.state(), DeckState::Ready);
    }

    #[test]
    fn test_abort_keeps_prior_deck() {
        let mut deck = SwipeDeck::new();
        deck.load(three());
        deck.swipe_current(SwipeDirection::Left);

        let generation = deck.begin_load();
        deck.abort_load(generation);

        assert_eq!(deck.state(), DeckState::Ready);
        assert_eq!(deck.len(), 3);
        assert_eq!(deck.cursor(), 1);
        assert!(deck.can_undo());
    }

    #[test]
    fn test_refresh_discards_undo_state() {
        let mut deck = SwipeDeck::new();
        deck.load(three());
        deck.swipe_current(SwipeDirection::Left);

        let generation = deck.begin_load();
        assert!(deck.finish_load(generation, three()));

        assert_eq!(deck.cursor(), 2);
        assert!(!deck.can_undo());
    }
}

pub mod composite;
pub mod geo;
pub mod scorer;

use crate::core::{Profile, ScoredCandidate};
use crate::error::Result;

pub use composite::CompositeRanker;
pub use geo::distance_km;
pub use scorer::{MatchScore, MatchScorer, ScoringWeights};

/// Trait for candidate ranking implementations
pub trait Ranker: Send + Sync {
    /// Score candidates against the searcher, best match first.
    ///
    /// The searcher's own profile is never part of the output.
    fn rank(&self, searcher: &Profile, candidates: &[Profile]) -> Result<Vec<ScoredCandidate>>;

    /// Get ranker name for logging
    fn name(&self) -> &str;
}

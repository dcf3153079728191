use serde::{Deserialize, Serialize};

use crate::core::Profile;

/// Candidate with its score breakdown, recomputed on every ranking pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub profile: Profile,

    /// Sum of per-skill weights (lower = more shared skills)
    pub skill_mismatch_penalty: i64,

    /// Truncated great-circle distance to the searcher
    pub physical_distance_km: i64,

    /// Searcher skills the candidate also has
    pub shared_skills: usize,

    /// Lower is a better match
    pub composite_score: i64,
}

impl ScoredCandidate {
    pub fn id(&self) -> &str {
        &self.profile.id
    }

    /// Get display string for logging
    pub fn display(&self) -> String {
        format!(
            "{} - score {} ({} shared, {} km)",
            self.profile.display_name(),
            self.composite_score,
            self.shared_skills,
            self.physical_distance_km
        )
    }
}

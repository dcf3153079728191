use std::collections::BTreeMap;

use crate::core::{Profile, ScoredCandidate};
use crate::error::Result;
use crate::ranking::{MatchScorer, Ranker, ScoringWeights};

/// Orders candidates by ascending composite score.
///
/// Candidates are bucketed by exact score; a bucket keeps the order in
/// which the repository returned its members, so ties are broken by
/// arrival and nothing else.
#[derive(Debug, Clone, Default)]
pub struct CompositeRanker {
    scorer: MatchScorer,
}

impl CompositeRanker {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            scorer: MatchScorer::new(weights),
        }
    }

    pub fn scorer(&self) -> &MatchScorer {
        &self.scorer
    }
}

impl Ranker for CompositeRanker {
    fn rank(&self, searcher: &Profile, candidates: &[Profile]) -> Result<Vec<ScoredCandidate>> {
        let mut buckets: BTreeMap<i64, Vec<ScoredCandidate>> = BTreeMap::new();

        for candidate in candidates.iter().filter(|c| c.id != searcher.id) {
            let score = self.scorer.score(candidate, searcher);
            buckets
                .entry(score.composite_score)
                .or_default()
                .push(ScoredCandidate {
                    profile: candidate.clone(),
                    skill_mismatch_penalty: score.skill_mismatch_penalty,
                    physical_distance_km: score.physical_distance_km,
                    shared_skills: score.shared_skills,
                    composite_score: score.composite_score,
                });
        }

        tracing::debug!(
            "Ranked {} candidates into {} score buckets for {}",
            candidates.len(),
            buckets.len(),
            searcher.id
        );

        Ok(buckets.into_values().flatten().collect())
    }

    fn name(&self) -> &str {
        "composite"
    }
}

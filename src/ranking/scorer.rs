use serde::{Deserialize, Serialize};

use crate::core::Profile;

/// Contribution of one searcher skill; negative so a shared skill lowers the score
pub const DEFAULT_SKILL_WEIGHT: i64 = -1000;

/// Contribution of one kilometre of distance
pub const DEFAULT_DISTANCE_WEIGHT: i64 = 1;

/// Weights combining skill overlap and distance into one integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_skill_weight")]
    pub skill_weight: i64,
    #[serde(default = "default_distance_weight")]
    pub distance_weight: i64,
}

fn default_skill_weight() -> i64 {
    DEFAULT_SKILL_WEIGHT
}

fn default_distance_weight() -> i64 {
    DEFAULT_DISTANCE_WEIGHT
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skill_weight: DEFAULT_SKILL_WEIGHT,
            distance_weight: DEFAULT_DISTANCE_WEIGHT,
        }
    }
}

/// Per-candidate result of [`MatchScorer::score`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchScore {
    pub composite_score: i64,
    pub physical_distance_km: i64,
    pub skill_mismatch_penalty: i64,
    pub shared_skills: usize,
}

/// Composite "distance" between a searcher and a candidate.
///
/// Every searcher skill the candidate has adds `skill_weight`, every
/// missing one subtracts it, then each kilometre adds
/// `distance_weight`. With the defaults one skill is worth 1000 km, so
/// ordering is skill-count first and distance second, except across
/// near-planetary distances where the two can trade off.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchScorer {
    weights: ScoringWeights,
}

impl MatchScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    pub fn score(&self, candidate: &Profile, searcher: &Profile) -> MatchScore {
        let mut skill_mismatch_penalty = 0i64;
        let mut shared_skills = 0usize;

        for skill in &searcher.skills {
            if candidate.has_skill(skill) {
                skill_mismatch_penalty = skill_mismatch_penalty.saturating_add(self.weights.skill_weight);
                shared_skills += 1;
            } else {
                skill_mismatch_penalty = skill_mismatch_penalty.saturating_sub(self.weights.skill_weight);
            }
        }

        let physical_distance_km = candidate.location.distance_km(&searcher.location);

        // Weights come from config unchecked; extreme ones pin at the i64 bounds
        let distance_score = self.weights.distance_weight.saturating_mul(physical_distance_km);

        MatchScore {
            composite_score: skill_mismatch_penalty.saturating_add(distance_score),
            physical_distance_km,
            skill_mismatch_penalty,
            shared_skills,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Location;

    fn searcher() -> Profile {
        Profile::new(
            "me",
            ["React Developer", "Go Developer"],
            Location::new(0.0, 0.0),
        )
    }

    #[test]
    fn test_one_shared_skill() {
        let x = Profile::new("x", ["React Developer"], Location::new(0.0, 1.0));
        let score = MatchScorer::default().score(&x, &searcher());

        assert_eq!(score.skill_mismatch_penalty, 0);
        assert_eq!(score.physical_distance_km, 111);
        assert_eq!(score.composite_score, 111);
        assert_eq!(score.shared_skills, 1);
    }

    #[test]
    fn test_extra_skill_beats_distance() {
        let scorer = MatchScorer::default();
        let x = Profile::new("x", ["React Developer"], Location::new(0.0, 1.0));
        let y = Profile::new(
            "y",
            ["React Developer", "Go Developer"],
            Location::new(0.0, 5.0),
        );

        let sx = scorer.score(&x, &searcher());
        let sy = scorer.score(&y, &searcher());
        assert_eq!(sy.composite_score, -2000 + 555);
        assert!(sy.composite_score < sx.composite_score);
    }

    #[test]
    fn test_no_skills_is_maximal_penalty() {
        let nobody = Profile::new("n", Vec::<String>::new(), Location::new(0.0, 0.0));
        let score = MatchScorer::default().score(&nobody, &searcher());

        assert_eq!(score.skill_mismatch_penalty, 2000);
        assert_eq!(score.shared_skills, 0);
    }

    #[test]
    fn test_more_shared_skills_never_scores_worse() {
        let scorer = MatchScorer::default();
        let me = Profile::new(
            "me",
            ["A", "B", "C", "D"],
            Location::new(10.0, 10.0),
        );
        let place = Location::new(11.0, 12.0);
        let all = ["A", "B", "C", "D"];

        let mut previous = i64::MAX;
        for n in 0..=all.len() {
            let candidate = Profile::new("c", all[..n].iter().copied(), place);
            let score = scorer.score(&candidate, &me).composite_score;
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn test_custom_weights() {
        let scorer = MatchScorer::new(ScoringWeights {
            skill_weight: -10,
            distance_weight: 2,
        });
        let x = Profile::new("x", ["React Developer"], Location::new(0.0, 1.0));
        let score = scorer.score(&x, &searcher());

        assert_eq!(score.composite_score, 222);
    }

    #[test]
    fn test_extreme_weights_saturate() {
        let scorer = MatchScorer::new(ScoringWeights {
            skill_weight: i64::MIN,
            distance_weight: i64::MAX,
        });
        let x = Profile::new("x", ["React Developer"], Location::new(0.0, 1.0));
        let nobody = Profile::new("n", Vec::<String>::new(), Location::new(0.0, 1.0));

        let score = scorer.score(&x, &searcher());
        assert_eq!(score.physical_distance_km, 111);
        assert_eq!(score.composite_score, i64::MAX);

        let score = scorer.score(&nobody, &searcher());
        assert_eq!(score.skill_mismatch_penalty, i64::MAX);
        assert_eq!(score.composite_score, i64::MAX);
    }
}

use crate::chat::{ChatRoomResolver, ChatStore, RoomId};
use crate::config::EngineConfig;
use crate::core::{Profile, ScoredCandidate, Session};
use crate::deck::DeckSession;
use crate::providers::CandidateRepository;
use crate::ranking::{CompositeRanker, Ranker};
use crate::error::{Result, MatchEngineError};
use std::sync::Arc;
use std::time::Instant;

/// Which skills the composite score is computed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreAgainst {
    /// The searching user's own profile skills
    #[default]
    ProfileSkills,
    /// The skills named in the search request
    RequestedSkills,
}

/// Search parameters
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Candidates must have at least one of these
    pub skills: Vec<String>,
    pub score_against: ScoreAgainst,
}

impl SearchRequest {
    pub fn new<I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            skills: skills.into_iter().map(Into::into).collect(),
            score_against: ScoreAgainst::default(),
        }
    }

    pub fn scored_against(mut self, score_against: ScoreAgainst) -> Self {
        self.score_against = score_against;
        self
    }

    /// Profile the candidates are scored against
    pub fn searcher(&self, session: &Session) -> Profile {
        match self.score_against {
            ScoreAgainst::ProfileSkills => session.profile().clone(),
            ScoreAgainst::RequestedSkills => {
                session.profile().clone().with_skills(self.skills.iter().cloned())
            }
        }
    }
}

/// Main matching engine orchestrator
pub struct MatchEngine {
    repository: Arc<dyn CandidateRepository>,
    ranker: Arc<dyn Ranker>,
    resolver: ChatRoomResolver,
    config: EngineConfig,
}

impl MatchEngine {
    /// Create engine with the composite ranker configured by `config.scoring`
    pub fn new(
        repository: Arc<dyn CandidateRepository>,
        chat_store: Arc<dyn ChatStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repository,
            ranker: Arc::new(CompositeRanker::new(config.scoring)),
            resolver: ChatRoomResolver::new(chat_store),
            config,
        }
    }

    /// Replace the ranker
    pub fn with_ranker(mut self, ranker: Arc<dyn Ranker>) -> Self {
        self.ranker = ranker;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &ChatRoomResolver {
        &self.resolver
    }

    pub fn chat_store(&self) -> &Arc<dyn ChatStore> {
        self.resolver.store()
    }

    /// Fetch, validate and rank candidates for the signed-in user.
    ///
    /// The searcher is checked before anything is fetched. Candidates
    /// that cannot be ranked (no skills, no location) are dropped.
    pub async fn search(&self, session: &Session, request: &SearchRequest) -> Result<Vec<ScoredCandidate>> {
        let start = Instant::now();
        let searcher = request.searcher(session);
        searcher.ensure_searcher()?;

        let fetched = self
            .repository
            .fetch_by_skills(&request.skills)
            .await
            .map_err(|e| match e {
                MatchEngineError::RepositoryUnavailable(_) => e,
                other => MatchEngineError::RepositoryUnavailable(format!(
                    "{}: {}",
                    self.repository.name(),
                    other
                )),
            })?;
        let fetched_count = fetched.len();

        let candidates: Vec<Profile> = fetched
            .into_iter()
            .filter(|candidate| match candidate.ensure_candidate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!("Excluding candidate: {}", e);
                    false
                }
            })
            .collect();

        let ranked = self.ranker.rank(&searcher, &candidates)?;

        tracing::debug!(
            "Search for {} via {}: {} fetched, {} ranked by {} in {:.2}ms",
            session.user_id(),
            self.repository.name(),
            fetched_count,
            ranked.len(),
            self.ranker.name(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(ranked)
    }

    /// Get or create the room between the signed-in user and `other_id`
    pub async fn start_chat(&self, session: &Session, other_id: &str) -> Result<RoomId> {
        self.resolver.get_or_create_room(session.user_id(), other_id).await
    }

    /// New swipe deck for this user, empty until its first refresh
    pub fn open_deck(self: &Arc<Self>, session: Session) -> DeckSession {
        DeckSession::new(Arc::clone(self), session, self.config.event_buffer)
    }
}

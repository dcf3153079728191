use async_trait::async_trait;

use crate::core::Profile;
use crate::error::Result;
use crate::providers::CandidateRepository;

/// Fixed in-memory candidate set
#[derive(Debug, Clone, Default)]
pub struct StaticRepository {
    profiles: Vec<Profile>,
}

impl StaticRepository {
    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl CandidateRepository for StaticRepository {
    async fn fetch_by_skills(&self, skills: &[String]) -> Result<Vec<Profile>> {
        Ok(self
            .profiles
            .iter()
            .filter(|p| skills.iter().any(|s| p.has_skill(s)))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Profile>> {
        Ok(self.profiles.iter().find(|p| p.id == id).cloned())
    }

    fn name(&self) -> &str {
        "static"
    }
}

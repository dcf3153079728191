pub mod sqlite;
pub mod static_repo;

use async_trait::async_trait;
use crate::core::Profile;
use crate::error::Result;

pub use sqlite::SqliteRepository;
pub use static_repo::StaticRepository;

/// Trait for candidate sources (hosted user store, SQLite, fixtures)
#[async_trait]
pub trait CandidateRepository: Send + Sync {
    /// Every profile whose skill set intersects `skills`, in no particular order
    async fn fetch_by_skills(&self, skills: &[String]) -> Result<Vec<Profile>>;

    /// Get profile by ID
    async fn get(&self, id: &str) -> Result<Option<Profile>>;

    /// Get repository name for logging
    fn name(&self) -> &str;
}

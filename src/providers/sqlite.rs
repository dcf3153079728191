use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use async_trait::async_trait;
use chrono::Utc;

use crate::core::{Profile, ProfileDocument};
use crate::error::{Result, MatchEngineError};
use crate::providers::CandidateRepository;

/// SQLite-backed profile store.
///
/// Documents are kept as the JSON the client wrote, next to a skill
/// index used for the intersect query:
/// ```sql
/// CREATE TABLE profiles (
///     id TEXT PRIMARY KEY,
///     document TEXT NOT NULL,
///     updated_at TEXT NOT NULL
/// );
/// CREATE TABLE profile_skills (
///     profile_id TEXT NOT NULL,
///     skill TEXT NOT NULL,
///     PRIMARY KEY (profile_id, skill)
/// );
/// ```
pub struct SqliteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    /// Open (or create) the profile store
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                document TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS profile_skills (
                profile_id TEXT NOT NULL,
                skill TEXT NOT NULL,
                PRIMARY KEY (profile_id, skill)
            );
            CREATE INDEX IF NOT EXISTS idx_profile_skills_skill ON profile_skills(skill);",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| MatchEngineError::Store("profile connection lock poisoned".into()))
    }

    /// Store a document and refresh its skill index.
    ///
    /// The document must decode into a [`Profile`]; incomplete profiles
    /// (no skills yet, unset location) are stored and simply never rank.
    pub async fn upsert(&self, doc: &ProfileDocument) -> Result<Profile> {
        let profile = Profile::try_from(doc.clone())?;
        let document = doc.to_json()?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO profiles (id, document, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET document = excluded.document, updated_at = excluded.updated_at",
            params![profile.id, document, Utc::now().to_rfc3339()],
        )?;
        tx.execute(
            "DELETE FROM profile_skills WHERE profile_id = ?",
            params![profile.id],
        )?;
        for skill in &profile.skills {
            tx.execute(
                "INSERT INTO profile_skills (profile_id, skill) VALUES (?1, ?2)",
                params![profile.id, skill],
            )?;
        }
        tx.commit()?;

        tracing::debug!("Stored profile {} ({} skills)", profile.id, profile.skills.len());
        Ok(profile)
    }

    /// Number of stored profiles
    pub async fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?;
        Ok(count)
    }

    fn decode(id: &str, document: &str) -> Result<Profile> {
        let doc = ProfileDocument::from_json(document)
            .map_err(|e| MatchEngineError::invalid_profile(id, format!("malformed document: {e}")))?;
        Profile::try_from(doc)
    }
}

#[async_trait]
impl CandidateRepository for SqliteRepository {
    async fn fetch_by_skills(&self, skills: &[String]) -> Result<Vec<Profile>> {
        if skills.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; skills.len()].join(", ");
        let sql = format!(
            "SELECT p.id, p.document FROM profiles p
             WHERE p.id IN (SELECT profile_id FROM profile_skills WHERE skill IN ({placeholders}))
             ORDER BY p.rowid"
        );

        let rows: Vec<(String, String)> = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(skills.iter()), |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        let mut profiles = Vec::with_capacity(rows.len());
        for (id, document) in rows {
            match Self::decode(&id, &document) {
                Ok(profile) => profiles.push(profile),
                Err(e) => tracing::warn!("Skipping stored profile {}: {}", id, e),
            }
        }

        tracing::debug!("SQLite returned {} profiles for {} skills", profiles.len(), skills.len());
        Ok(profiles)
    }

    async fn get(&self, id: &str) -> Result<Option<Profile>> {
        let document: Option<String> = {
            let conn = self.lock()?;
            conn.query_row(
                "SELECT document FROM profiles WHERE id = ?",
                params![id],
                |row| row.get(0),
            )
            .optional()?
        };

        document.map(|d| Self::decode(id, &d)).transpose()
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

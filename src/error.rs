use thiserror::Error;

/// Main error type for the matching engine
#[derive(Error, Debug)]
pub enum MatchEngineError {
    /// Candidate fetch failed (network/backend)
    #[error("Candidate repository unavailable: {0}")]
    RepositoryUnavailable(String),

    /// Profile missing required skills/location, or malformed
    #[error("Invalid profile '{id}': {reason}")]
    InvalidProfile { id: String, reason: String },

    /// Chat room lookup by id failed
    #[error("Chat room not found: {0}")]
    RoomNotFound(String),

    /// User is not one of the room's participants
    #[error("User '{user}' is not a participant of room '{room}'")]
    NotParticipant { room: String, user: String },

    /// Room requested between a user and themself
    #[error("Cannot open a chat room with yourself ({0})")]
    SelfChat(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML config errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store errors (poisoned lock, corrupt row)
    #[error("Store error: {0}")]
    Store(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl MatchEngineError {
    pub fn invalid_profile(id: impl Into<String>, reason: impl Into<String>) -> Self {
        MatchEngineError::InvalidProfile {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller should offer a retry instead of giving up
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MatchEngineError::RepositoryUnavailable(_) | MatchEngineError::Database(_)
        )
    }
}

impl From<String> for MatchEngineError {
    fn from(s: String) -> Self {
        MatchEngineError::Other(s)
    }
}

impl From<&str> for MatchEngineError {
    fn from(s: &str) -> Self {
        MatchEngineError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MatchEngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(MatchEngineError::RepositoryUnavailable("timeout".into()).is_retryable());
        assert!(!MatchEngineError::invalid_profile("u1", "no location").is_retryable());
    }

    #[test]
    fn test_display() {
        let err = MatchEngineError::invalid_profile("u1", "no location");
        assert_eq!(err.to_string(), "Invalid profile 'u1': no location");
    }
}

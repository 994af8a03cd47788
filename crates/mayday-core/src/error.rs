// Error types for SOS coordination

use thiserror::Error;

/// Result type alias for coordinator operations
pub type Result<T> = std::result::Result<T, SosError>;

/// Errors surfaced by the coordinator and its collaborators
#[derive(Debug, Error)]
pub enum SosError {
    /// Missing or malformed caller input, rejected before touching the store
    #[error("validation error: {0}")]
    Validation(String),

    /// A transition attempted against an event that is not in the required
    /// state (already claimed, already over, or nonexistent)
    #[error("conflict: {0}")]
    Conflict(String),

    /// The durable store failed to read or write; retryable
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SosError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        SosError::Validation(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        SosError::Conflict(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        SosError::Storage(msg.into())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, SosError::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_is_distinguishable() {
        assert!(SosError::conflict("already claimed").is_conflict());
        assert!(!SosError::storage("connection reset").is_conflict());
        assert!(!SosError::validation("station_id is required").is_conflict());
    }

    #[test]
    fn test_display_carries_message() {
        let err = SosError::conflict("sos 42 is not pending");
        assert_eq!(err.to_string(), "conflict: sos 42 is not pending");
    }
}

//! Repository errors

use thiserror::Error;

/// Message for a create whose `line` is already stored
pub const DUPLICATE_LINE: &str = "Command already exists";

/// Message for a create whose `howTo` is already stored
pub const DUPLICATE_HOW_TO: &str = "There is already a command with that description";

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Repository errors
///
/// Absence of a record is never an error; lookups return `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    /// The caller handed over a record the operation cannot use
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Create would break `line` or `howTo` uniqueness
    #[error("{0}")]
    Duplicate(String),

    /// The underlying store failed
    #[error("Store error: {0}")]
    Store(String),
}

impl RepoError {
    pub fn duplicate_line() -> Self {
        Self::Duplicate(DUPLICATE_LINE.to_string())
    }

    pub fn duplicate_how_to() -> Self {
        Self::Duplicate(DUPLICATE_HOW_TO.to_string())
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_is_bare() {
        assert_eq!(RepoError::duplicate_line().to_string(), DUPLICATE_LINE);
        assert_eq!(RepoError::duplicate_how_to().to_string(), DUPLICATE_HOW_TO);
    }

    #[test]
    fn test_sqlite_error_maps_to_store() {
        let err = RepoError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, RepoError::Store(_)));
    }
}

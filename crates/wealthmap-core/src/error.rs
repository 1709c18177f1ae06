//! Error types for wealthmap-core

use thiserror::Error;

/// Result type alias for wealthmap operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Main error type for store operations
///
/// The four variants form the error taxonomy surfaced to HTTP callers:
/// `Validation` for malformed client input, `NotFound` for absent referenced
/// entities, `Conflict` for uniqueness violations, and `Storage` for
/// unexpected database failures.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Malformed client input (page/pageSize, ids, required fields)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced entity absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Underlying store failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            // Unique-index violations are the store-level uniqueness
            // constraint firing; everything else is a storage failure.
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Conflict(err.to_string())
            }
            _ => StoreError::Storage(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_violation_maps_to_conflict() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (x TEXT PRIMARY KEY); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .map_err(StoreError::from)
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }
}

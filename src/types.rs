//! Common error and result types for Roster.

use thiserror::Error;

/// Errors surfaced by the service. Handlers never recover; each kind maps
/// to one HTTP status at the dispatch layer.
#[derive(Debug, Error)]
pub enum RosterError {
    /// Database connectivity or query failure
    #[error("database error: {0}")]
    Database(String),

    /// Unique-constraint violation (duplicate email)
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// No document matched the given id
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed request (bad id, missing field, unparseable body)
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Invalid configuration at startup
    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RosterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RosterError::NotFound("user 123".to_string());
        assert_eq!(err.to_string(), "not found: user 123");

        let err = RosterError::Duplicate("email taken".to_string());
        assert_eq!(err.to_string(), "duplicate key: email taken");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::other("boom");
        let err: RosterError = io.into();
        assert!(matches!(err, RosterError::Io(_)));
    }
}

use std::fmt;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for chat store operations
#[derive(Debug)]
pub enum Error {
    /// Validation error - invalid input or configuration
    ValidationError(String),

    /// Connection error - database unreachable or authentication failure
    ConnectionError(String),

    /// Not found error - session doesn't exist
    NotFoundError(String),

    /// Database error - SQL errors, constraint violations
    DatabaseError(String),

    /// Pool error - connection pool issues
    PoolError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Error::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            Error::NotFoundError(msg) => write!(f, "Not found: {}", msg),
            Error::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            Error::PoolError(msg) => write!(f, "Pool error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<tokio_postgres::Error> for Error {
    fn from(err: tokio_postgres::Error) -> Self {
        if let Some(db_error) = err.as_db_error() {
            // foreign_key_violation: the session row is gone
            if db_error.code() == &tokio_postgres::error::SqlState::FOREIGN_KEY_VIOLATION {
                return Error::NotFoundError(db_error.message().to_string());
            }
            return Error::DatabaseError(format!("{}: {}", db_error.code().code(), db_error.message()));
        }

        Error::DatabaseError(format!("{:?}", err))
    }
}

impl From<deadpool_postgres::PoolError> for Error {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Error::PoolError(err.to_string())
    }
}

impl From<deadpool_postgres::BuildError> for Error {
    fn from(err: deadpool_postgres::BuildError) -> Self {
        Error::ConnectionError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::NotFoundError("session abc".to_string()).to_string(),
            "Not found: session abc"
        );
        assert_eq!(
            Error::ValidationError("Invalid port number".to_string()).to_string(),
            "Validation error: Invalid port number"
        );
    }
}

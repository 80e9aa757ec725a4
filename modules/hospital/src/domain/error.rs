use crate::domain::forms::FieldErrors;
use thiserror::Error;

/// Domain-specific errors using thiserror.
///
/// A lost booking race is not represented here: it is a normal outcome
/// (`BookOutcome::NotAvailable`), not an error.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Username '{username}' is already taken")]
    UsernameTaken { username: String },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Validation failed")]
    Invalid { errors: FieldErrors },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn username_taken(username: impl Into<String>) -> Self {
        Self::UsernameTaken {
            username: username.into(),
        }
    }

    pub fn invalid(errors: FieldErrors) -> Self {
        Self::Invalid { errors }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

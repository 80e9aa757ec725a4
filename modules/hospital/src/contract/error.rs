use thiserror::Error;

/// Errors that are safe to expose to other crates.
#[derive(Error, Debug, Clone)]
pub enum HospitalError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Username '{username}' is already taken")]
    UsernameTaken { username: String },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl HospitalError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn username_taken(username: String) -> Self {
        Self::UsernameTaken { username }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for HospitalError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            NotFound { entity, id } => Self::not_found(entity, id),
            UsernameTaken { username } => Self::username_taken(username),
            InvalidCredentials => Self::InvalidCredentials,
            Invalid { errors } => Self::validation(errors.summary()),
            Database { .. } => Self::internal(),
        }
    }
}

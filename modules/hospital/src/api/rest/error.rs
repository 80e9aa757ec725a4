use axum::http::StatusCode;

use crate::api::rest::problem::{Problem, ProblemResponse};
use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate.
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_code(code)
        .with_instance(instance);

    // Add request ID from current tracing span if available
    let problem = if let Some(id) = tracing::Span::current().id() {
        problem.with_request_id(id.into_u64().to_string())
    } else {
        problem
    };

    ProblemResponse(problem)
}

/// Map a domain error to an RFC 9457 ProblemResponse.
///
/// Validation errors are not mapped here: handlers turn them into a form
/// view that echoes the submitted values alongside the field errors.
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::NotFound { entity, id } => from_parts(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Not Found",
            format!("{} with id {} was not found", entity, id),
            instance,
        ),
        DomainError::UsernameTaken { username } => from_parts(
            StatusCode::CONFLICT,
            "USERNAME_CONFLICT",
            "Username already taken",
            format!("Username '{}' is already taken", username),
            instance,
        ),
        // One message for unknown username and wrong password alike.
        DomainError::InvalidCredentials => from_parts(
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            "Unauthorized",
            "Invalid Username or Password",
            instance,
        ),
        DomainError::Invalid { .. } => from_parts(
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION",
            "Validation error",
            "Submitted form data is invalid",
            instance,
        ),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}

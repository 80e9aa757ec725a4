use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use crate::api::rest::problem;
use crate::contract::model::User;
use crate::domain::service::Service;

/// Header carrying the session token issued at login.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// The authenticated actor for the current request, plus the token it
/// presented (logout needs it).
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: Uuid,
    pub user: User,
}

/// Rejection: gated use cases send unauthenticated callers back to the
/// login page rather than a hard error; only storage faults are 500s.
pub enum AuthRejection {
    LoginRedirect,
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::LoginRedirect => Redirect::to("/login").into_response(),
            AuthRejection::Internal => {
                problem::internal_error("An internal error occurred").into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Arc<Service>>()
            .cloned()
            .ok_or(AuthRejection::Internal)?;

        let token = parts
            .headers
            .get(SESSION_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .ok_or(AuthRejection::LoginRedirect)?;

        match service.authenticate(token).await {
            Ok(Some(user)) => Ok(AuthSession { token, user }),
            Ok(None) => Err(AuthRejection::LoginRedirect),
            Err(e) => {
                tracing::error!(error = %e, "Session lookup failed");
                Err(AuthRejection::Internal)
            }
        }
    }
}

// src/api/mod.rs
//
// HTTP surface. Every route requires a bearer token that the session
// provider can resolve; the resolved user is what the services and
// repositories scope every query by.

pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::auth::UserId;
use crate::error::AppError;

/// The authenticated caller, extracted from the Authorization header.
pub struct Identity(pub UserId);

#[axum::async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let user = state
            .sessions
            .resolve(token)
            .ok_or(AppError::Unauthorized)?;

        Ok(Identity(user))
    }
}

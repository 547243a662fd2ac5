use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use sqlx::types::Uuid;

use super::jwt::{AUTH_COOKIE, verify_jwt_token};
use crate::{error::ApiError, state::AuthConfig};

/// Authenticated user extractor
///
/// Use this in route handlers to ensure the user is authenticated.
/// It will automatically validate the JWT token from the cookie.
/// Wrap it in an `Option` for routes that also serve anonymous visitors:
/// a missing cookie then yields `None`, while a bad one is still rejected.
///
/// # Example
/// ```
/// use axum::extract::State;
/// use lps_api::{error::ApiError, auth::AuthUser, ApiState};
///
/// async fn protected_route(
///     auth_user: AuthUser,
///     State(state): State<ApiState>,
/// ) -> Result<(), ApiError> {
///     // auth_user.user_id is available
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

async fn read_token<S>(parts: &mut Parts, state: &S) -> Result<Option<String>, ApiError>
where
    Key: FromRef<S>,
    S: Send + Sync,
{
    let jar = <PrivateCookieJar<Key> as FromRequestParts<S>>::from_request_parts(parts, state)
        .await
        .map_err(|_| ApiError::Unauthenticated("Failed to read cookies".to_string()))?;

    Ok(jar.get(AUTH_COOKIE).map(|cookie| cookie.value().to_owned()))
}

fn resolve_user(token: &str, auth_config: &AuthConfig) -> Result<AuthUser, ApiError> {
    let claims = verify_jwt_token(token, &auth_config.jwt_secret)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthenticated("Invalid user ID in token".to_string()))?;

    Ok(AuthUser { user_id })
}

impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = read_token(parts, state)
            .await?
            .ok_or_else(|| ApiError::Unauthenticated("Not authenticated".to_string()))?;

        resolve_user(&token, &AuthConfig::from_ref(state))
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match read_token(parts, state).await? {
            Some(token) => resolve_user(&token, &AuthConfig::from_ref(state)).map(Some),
            None => Ok(None),
        }
    }
}

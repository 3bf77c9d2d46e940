use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::validate_jwt;
use crate::database::User;
use crate::error::{ApiError, NOT_AUTHENTICATED};
use crate::state::AppState;

/// Authenticated user resolved from the bearer token
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// JWT authentication middleware: validates the bearer token and loads the
/// user it names. Tokens of deleted users are rejected.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)?;

    let claims = validate_jwt(token, state.jwt_secret()).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        ApiError::invalid_credentials()
    })?;

    let user = state
        .users
        .find_by_id(claims.uid)
        .await?
        .filter(|user| user.username == claims.sub)
        .ok_or_else(|| {
            tracing::warn!(
                "Token for user '{}' (ID: {}) no longer matches a stored user",
                claims.sub,
                claims.uid
            );
            ApiError::invalid_credentials()
        })?;

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized(NOT_AUTHENTICATED))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::invalid_credentials())?;

    let (scheme, token) = auth_str
        .split_once(' ')
        .ok_or_else(|| ApiError::unauthorized(NOT_AUTHENTICATED))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ApiError::unauthorized(NOT_AUTHENTICATED));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::invalid_credentials());
    }
    Ok(token)
}

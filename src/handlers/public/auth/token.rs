// handlers/public/auth/token.rs - POST /token handler

use axum::{extract::rejection::FormRejection, extract::State, Form, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{generate_jwt, verify_password, Claims};
use crate::error::{ApiError, ApiResult, LOGIN_FAILED};
use crate::state::AppState;

/// OAuth2 password-flow form body
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
}

/// POST /token - Exchange username/password for a bearer token
///
/// Takes an `application/x-www-form-urlencoded` body with `username` and
/// `password`. Unknown users and wrong passwords both yield 401 "Incorrect
/// username or password".
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Form<TokenRequest>, FormRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Form(payload) = payload?;

    let Some(user) = state.users.find_by_username(&payload.username).await? else {
        state.dummy_hash.verify(&payload.password, state.password_params()).await?;
        tracing::warn!("Login failed: unknown user '{}'", payload.username);
        return Err(ApiError::unauthorized(LOGIN_FAILED));
    };

    if !verify_password(&payload.password, &user.hashed_password).await? {
        tracing::warn!("Login failed: wrong password for '{}'", user.username);
        return Err(ApiError::unauthorized(LOGIN_FAILED));
    }

    let claims = Claims::new(&user.username, user.id, state.config.security.jwt_expiry_minutes);
    let access_token = generate_jwt(&claims, state.jwt_secret()).map_err(|e| {
        tracing::error!("Token generation failed: {}", e);
        ApiError::internal_server_error("Could not issue token")
    })?;

    tracing::info!("Issued token for '{}' (ID: {})", user.username, user.id);
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: claims.lifetime_secs(),
    }))
}

// handlers/public/auth/register.rs - POST /register/ handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use std::collections::HashMap;

use super::utils::{validate_email_format, validate_full_name, validate_password, validate_username_format};
use crate::auth::hash_password;
use crate::database::{NewUser, User};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let checks = [
            ("username", validate_username_format(&self.username)),
            ("email", validate_email_format(&self.email)),
            ("full_name", validate_full_name(&self.full_name)),
            ("password", validate_password(&self.password)),
        ];

        let field_errors: HashMap<String, String> = checks
            .into_iter()
            .filter_map(|(field, result)| result.err().map(|msg| (field.to_string(), msg)))
            .collect();

        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::unprocessable_entity("Invalid registration data", field_errors))
        }
    }
}

/// POST /register/ - Create a user account
///
/// Expected Input:
/// ```json
/// {
///   "username": "string",
///   "email": "string",
///   "full_name": "string",
///   "password": "string"
/// }
/// ```
///
/// Returns the stored user without its password hash. A taken username
/// yields 400 "Username already registered!", a taken email 400 "Email
/// already registered!".
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(payload) = payload?;
    payload.validate()?;

    state
        .users
        .ensure_available(&payload.username, &payload.email)
        .await
        .map_err(|e| {
            tracing::info!("Registration rejected: {}", e);
            ApiError::from(e)
        })?;

    let hashed_password = hash_password(&payload.password, state.password_params()).await?;

    let user = state
        .users
        .create(NewUser {
            username: payload.username,
            email: payload.email,
            full_name: payload.full_name,
            hashed_password,
        })
        .await
        .map_err(|e| {
            tracing::info!("Registration rejected: {}", e);
            ApiError::from(e)
        })?;

    tracing::info!("Registered user '{}' (ID: {})", user.username, user.id);
    Ok(Json(user))
}

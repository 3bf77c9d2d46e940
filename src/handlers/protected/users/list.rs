use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

use crate::database::User;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    pub limit: Option<i64>,
}

/// GET /users/ - Page through users ordered by id
///
/// `skip` defaults to 0 and `limit` to 100; `limit` is capped at the
/// configured maximum page size.
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<User>>> {
    let Query(query) = query?;

    if query.skip < 0 {
        return Err(field_error("skip", "must be zero or greater"));
    }
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit < 0 {
        return Err(field_error("limit", "must be zero or greater"));
    }
    let limit = limit.min(state.config.api.max_page_size);

    let users = state.users.list(query.skip, limit).await?;
    Ok(Json(users))
}

fn field_error(field: &str, message: &str) -> ApiError {
    let mut field_errors = std::collections::HashMap::new();
    field_errors.insert(field.to_string(), message.to_string());
    ApiError::unprocessable_entity("Invalid query parameters", field_errors)
}

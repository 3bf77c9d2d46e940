use axum::{
    extract::{rejection::PathRejection, Path, State},
    Extension, Json,
};

use crate::database::User;
use crate::error::ApiResult;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// DELETE /users/:id - Remove a user and return the removed record
///
/// Tokens previously issued to the removed user stop validating
/// immediately since the auth guard resolves every token against the store.
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;

    let deleted = state.users.delete(id).await?;

    tracing::info!(
        "User '{}' (ID: {}) deleted by '{}'",
        deleted.username,
        deleted.id,
        actor.username
    );
    Ok(Json(deleted))
}

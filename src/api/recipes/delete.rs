use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use diesel::prelude::*;
use uuid::Uuid;

use crate::api::ErrorResponse;
use crate::auth::CurrentAdmin;
use crate::error::ApiError;
use crate::schema::recipes;
use crate::AppState;

#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}",
    tag = "recipes",
    params(("id" = Uuid, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_recipe(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.pool.get()?;

    // Favorite rows go with the recipe via ON DELETE CASCADE
    let deleted = diesel::delete(recipes::table.find(id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(ApiError::NotFound("recipe"));
    }

    tracing::info!(recipe_id = %id, admin = %admin.email, "recipe deleted");

    Ok(StatusCode::NO_CONTENT)
}

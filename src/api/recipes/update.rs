use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::api::ErrorResponse;
use crate::auth::CurrentAdmin;
use crate::error::ApiError;
use crate::models::{Recipe, RecipeUpsert};
use crate::schema::recipes;
use crate::AppState;

use super::{recipe_response, resolve_image, validate_form, RecipeForm, RecipeResponse};

#[utoipa::path(
    put,
    path = "/api/v1/recipes/{id}",
    tag = "recipes",
    params(("id" = Uuid, Path, description = "Recipe ID")),
    request_body = RecipeForm,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Invalid request or recipe name already taken", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn update_recipe(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<RecipeForm>,
) -> Result<impl IntoResponse, ApiError> {
    validate_form(&form)?;

    let ingredients = serde_json::to_value(&form.ingredients)
        .map_err(|_| ApiError::Validation("invalid ingredients".to_string()))?;

    let mut conn = state.pool.get()?;

    let recipe = conn.transaction::<Recipe, ApiError, _>(|conn| {
        let existing: Option<Uuid> = recipes::table
            .filter(recipes::id.eq(id))
            .select(recipes::id)
            .first(conn)
            .optional()?;
        if existing.is_none() {
            return Err(ApiError::NotFound("recipe"));
        }

        let image_id = resolve_image(conn, &form.image_link)?;

        let upsert = RecipeUpsert {
            name: &form.name,
            description: &form.description,
            instructions: &form.instructions,
            image_id,
            ingredients,
            tags: &form.tags,
        };

        // Full replace of all mutable fields
        diesel::update(recipes::table.find(id))
            .set(&upsert)
            .returning(Recipe::as_returning())
            .get_result(conn)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    ApiError::Conflict("recipe already exists")
                }
                other => other.into(),
            })
    })?;

    tracing::info!(recipe_id = %recipe.id, admin = %admin.email, "recipe updated");

    Ok(Json(recipe_response(recipe, form.image_link, false)))
}

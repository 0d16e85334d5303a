use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
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
    post,
    path = "/api/v1/recipes",
    tag = "recipes",
    request_body = RecipeForm,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid request or recipe name already taken", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn create_recipe(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(form): Json<RecipeForm>,
) -> Result<impl IntoResponse, ApiError> {
    validate_form(&form)?;

    let ingredients = serde_json::to_value(&form.ingredients)
        .map_err(|_| ApiError::Validation("invalid ingredients".to_string()))?;

    let mut conn = state.pool.get()?;

    let recipe = conn.transaction::<Recipe, ApiError, _>(|conn| {
        let existing: Option<Uuid> = recipes::table
            .filter(recipes::name.eq(&form.name))
            .select(recipes::id)
            .first(conn)
            .optional()?;
        if existing.is_some() {
            return Err(ApiError::Conflict("recipe already exists"));
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

        diesel::insert_into(recipes::table)
            .values(&upsert)
            .returning(Recipe::as_returning())
            .get_result(conn)
            .map_err(|err| match err {
                // Covers a concurrent create racing past the name check
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    ApiError::Conflict("recipe already exists")
                }
                other => other.into(),
            })
    })?;

    tracing::info!(recipe_id = %recipe.id, admin = %admin.email, "recipe created");

    Ok((
        StatusCode::CREATED,
        Json(recipe_response(recipe, form.image_link, false)),
    ))
}

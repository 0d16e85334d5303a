use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use uuid::Uuid;

use crate::api::ErrorResponse;
use crate::error::ApiError;
use crate::models::Recipe;
use crate::schema::{images, recipes};
use crate::AppState;

use super::{recipe_response, RecipeResponse};

#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    tag = "recipes",
    params(("id" = Uuid, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.pool.get()?;

    let row: Option<(Recipe, String)> = recipes::table
        .inner_join(images::table)
        .filter(recipes::id.eq(id))
        .select((Recipe::as_select(), images::link))
        .first(&mut conn)
        .optional()?;

    let (recipe, image_link) = row.ok_or(ApiError::NotFound("recipe"))?;

    Ok(Json(recipe_response(recipe, image_link, false)))
}

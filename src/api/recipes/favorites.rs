use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::api::ErrorResponse;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::models::{NewFavorite, Recipe};
use crate::schema::{images, recipes, user_favorites};
use crate::AppState;

use super::{recipe_response, RecipeResponse};

#[utoipa::path(
    get,
    path = "/api/v1/recipes/favorites",
    tag = "recipes",
    responses(
        (status = 200, description = "The viewer's favorited recipes", body = [RecipeResponse]),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn list_favorites(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.pool.get()?;

    let rows: Vec<(Recipe, String)> = recipes::table
        .inner_join(images::table)
        .inner_join(user_favorites::table)
        .filter(user_favorites::user_id.eq(user.id))
        .select((Recipe::as_select(), images::link))
        .order(recipes::name.asc())
        .load(&mut conn)?;

    let recipes = rows
        .into_iter()
        .map(|(recipe, link)| recipe_response(recipe, link, true))
        .collect::<Vec<_>>();

    Ok(Json(recipes))
}

#[utoipa::path(
    post,
    path = "/api/v1/recipes/{id}/favorites",
    tag = "recipes",
    params(("id" = Uuid, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe favorited"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 400, description = "Already favorited", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn favorite_recipe(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.pool.get()?;

    let favorite = NewFavorite {
        user_id: user.id,
        recipe_id: id,
    };

    // Repeating the call is an error by contract, not a silent success
    diesel::insert_into(user_favorites::table)
        .values(&favorite)
        .execute(&mut conn)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                ApiError::Conflict("recipe already favorited")
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                ApiError::NotFound("recipe")
            }
            other => other.into(),
        })?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}/favorites",
    tag = "recipes",
    params(("id" = Uuid, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe unfavorited"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 400, description = "Not favorited", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn unfavorite_recipe(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.pool.get()?;

    let deleted = diesel::delete(
        user_favorites::table
            .filter(user_favorites::user_id.eq(user.id))
            .filter(user_favorites::recipe_id.eq(id)),
    )
    .execute(&mut conn)?;

    if deleted == 0 {
        return Err(ApiError::Conflict("recipe not favorited"));
    }

    Ok(StatusCode::OK)
}

use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::Query;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{Array, Bool, Text};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::MaybeUser;
use crate::error::ApiError;
use crate::models::Recipe;
use crate::schema::{images, recipes, user_favorites};
use crate::AppState;

use super::{recipe_response, RecipeResponse};

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Case-insensitive substring match on the recipe name
    pub name: Option<String>,
    /// Recipes must carry ALL given tags (repeat the parameter)
    #[serde(default)]
    pub tags: Vec<String>,
    /// Recipes must contain ALL given ingredient names (repeat the parameter)
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Number of items to return (default: 100, max: 100)
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
}

fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

fn ilike_pattern(needle: &str) -> String {
    format!("%{}%", needle.replace('%', "\\%").replace('_', "\\_"))
}

#[utoipa::path(
    get,
    path = "/api/v1/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Matching recipes; is_favorite reflects the signed-in viewer", body = [RecipeResponse])
    )
)]
pub async fn list_recipes(
    MaybeUser(viewer): MaybeUser,
    State(state): State<AppState>,
    Query(params): Query<ListRecipesParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (limit, offset) = page_bounds(params.limit, params.offset);

    // The nil UUID matches no user, so guests always see is_favorite = false
    // through the same join shape.
    let viewer_id = viewer.as_ref().map(|u| u.id).unwrap_or_else(Uuid::nil);

    let mut conn = state.pool.get()?;

    let mut query = recipes::table
        .inner_join(images::table)
        .left_join(
            user_favorites::table.on(user_favorites::recipe_id
                .eq(recipes::id)
                .and(user_favorites::user_id.eq(viewer_id))),
        )
        .into_boxed();

    if let Some(ref name) = params.name {
        if !name.is_empty() {
            query = query.filter(recipes::name.ilike(ilike_pattern(name)));
        }
    }

    // ALL-match containment: tags @> ARRAY[...]
    if !params.tags.is_empty() {
        query = query.filter(recipes::tags.contains(params.tags.clone()));
    }

    // ALL-match over ingredient keys of the JSONB map
    if !params.ingredients.is_empty() {
        query = query.filter(
            sql::<Bool>("jsonb_exists_all(recipes.ingredients, ")
                .bind::<Array<Text>, _>(params.ingredients.clone())
                .sql(")"),
        );
    }

    let rows: Vec<(Recipe, String, Option<Uuid>)> = query
        .select((
            Recipe::as_select(),
            images::link,
            user_favorites::user_id.nullable(),
        ))
        .order(recipes::name.asc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)?;

    let recipes = rows
        .into_iter()
        .map(|(recipe, link, favorite)| recipe_response(recipe, link, favorite.is_some()))
        .collect::<Vec<_>>();

    Ok(Json(recipes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_zero_offset_and_full_page() {
        assert_eq!(page_bounds(None, None), (100, 0));
    }

    #[test]
    fn limit_is_capped_at_100() {
        assert_eq!(page_bounds(Some(1000), None), (100, 0));
        assert_eq!(page_bounds(Some(25), Some(50)), (25, 50));
    }

    #[test]
    fn nonsense_bounds_are_clamped() {
        assert_eq!(page_bounds(Some(0), Some(-5)), (1, 0));
        assert_eq!(page_bounds(Some(-10), None), (1, 0));
    }

    #[test]
    fn ilike_pattern_escapes_wildcards() {
        assert_eq!(ilike_pattern("soup"), "%soup%");
        assert_eq!(ilike_pattern("100%_done"), "%100\\%\\_done%");
    }
}

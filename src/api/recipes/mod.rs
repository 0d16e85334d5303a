pub mod create;
pub mod delete;
pub mod favorites;
pub mod get;
pub mod list;
pub mod update;

use axum::routing::{get, post};
use axum::Router;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{NewImage, Recipe};
use crate::schema::images;
use crate::AppState;

/// Returns the router for recipe endpoints (mounted at /api/v1/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route("/favorites", get(favorites::list_favorites))
        .route(
            "/{id}",
            get(get::get_recipe)
                .put(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route(
            "/{id}/favorites",
            post(favorites::favorite_recipe).delete(favorites::unfavorite_recipe),
        )
}

/// Request body shared by recipe create and full-replace update.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecipeForm {
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub image_link: String,
    /// Ingredient name -> quantity/note
    #[serde(default)]
    pub ingredients: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

pub(crate) fn validate_form(form: &RecipeForm) -> Result<(), ApiError> {
    if form.name.trim().is_empty() {
        return Err(ApiError::Validation("name cannot be empty".to_string()));
    }
    if form.instructions.trim().is_empty() {
        return Err(ApiError::Validation(
            "instructions cannot be empty".to_string(),
        ));
    }
    if form.image_link.trim().is_empty() {
        return Err(ApiError::Validation(
            "image_link cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub recipe_id: Uuid,
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub image_link: String,
    pub ingredients: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
}

pub(crate) fn recipe_response(recipe: Recipe, image_link: String, is_favorite: bool) -> RecipeResponse {
    RecipeResponse {
        recipe_id: recipe.id,
        name: recipe.name,
        description: recipe.description,
        instructions: recipe.instructions,
        image_link,
        ingredients: serde_json::from_value(recipe.ingredients).unwrap_or_default(),
        tags: recipe.tags,
        is_favorite,
    }
}

/// Reuse the image row for an already-seen link, otherwise insert one.
/// Links are unique, so submitting the same link twice never duplicates.
pub(crate) fn resolve_image(conn: &mut PgConnection, link: &str) -> QueryResult<Uuid> {
    let existing: Option<Uuid> = images::table
        .filter(images::link.eq(link))
        .select(images::id)
        .first(conn)
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let image = NewImage {
        id: Uuid::new_v4(),
        link,
    };

    diesel::insert_into(images::table)
        .values(&image)
        .returning(images::id)
        .get_result(conn)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        favorites::list_favorites,
        favorites::favorite_recipe,
        favorites::unfavorite_recipe,
    ),
    components(schemas(RecipeForm, RecipeResponse))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RecipeForm {
        RecipeForm {
            name: "Soup".to_string(),
            description: "A soup".to_string(),
            instructions: "Boil water".to_string(),
            image_link: "https://example.com/soup.jpg".to_string(),
            ingredients: BTreeMap::from([("water".to_string(), "1L".to_string())]),
            tags: vec!["vegan".to_string(), "soup".to_string()],
        }
    }

    #[test]
    fn complete_form_validates() {
        assert!(validate_form(&form()).is_ok());
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut blank_name = form();
        blank_name.name = "   ".to_string();
        assert!(validate_form(&blank_name).is_err());

        let mut blank_instructions = form();
        blank_instructions.instructions = String::new();
        assert!(validate_form(&blank_instructions).is_err());

        let mut blank_link = form();
        blank_link.image_link = String::new();
        assert!(validate_form(&blank_link).is_err());
    }

    #[test]
    fn response_recovers_ingredient_map_from_jsonb() {
        let recipe = Recipe {
            id: Uuid::new_v4(),
            name: "Soup".to_string(),
            description: "A soup".to_string(),
            instructions: "Boil water".to_string(),
            image_id: Uuid::new_v4(),
            ingredients: serde_json::json!({"water": "1L", "salt": "1tsp"}),
            tags: vec!["vegan".to_string()],
        };

        let response = recipe_response(recipe, "https://example.com/soup.jpg".to_string(), false);
        assert_eq!(response.ingredients.get("water"), Some(&"1L".to_string()));
        assert_eq!(response.ingredients.get("salt"), Some(&"1tsp".to_string()));
        assert!(!response.is_favorite);
    }

    #[test]
    fn malformed_ingredient_payload_degrades_to_empty_map() {
        let recipe = Recipe {
            id: Uuid::new_v4(),
            name: "Soup".to_string(),
            description: String::new(),
            instructions: "Boil".to_string(),
            image_id: Uuid::new_v4(),
            ingredients: serde_json::json!(["not", "a", "map"]),
            tags: vec![],
        };

        let response = recipe_response(recipe, String::new(), false);
        assert!(response.ingredients.is_empty());
    }
}

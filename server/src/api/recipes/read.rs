//! Recipe read shapes. Writes take ids; reads return nested tags, author and
//! ingredient details.

use std::collections::{HashMap, HashSet};

use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::users::read::{user_responses, UserResponse};
use crate::api::ApiError;
use crate::config::Config;
use crate::models::{Recipe, Tag, User};
use crate::schema::{
    favorites, ingredients, recipe_ingredients, recipe_tags, recipes, shopping_carts, tags, users,
};

/// Compact form used by favorites, the cart and subscription listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeShort {
    pub id: i32,
    pub name: String,
    /// Image URL
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeShort {
    pub fn new(recipe: &Recipe, config: &Config) -> Self {
        RecipeShort {
            id: recipe.id,
            name: recipe.name.clone(),
            image: config.media_url(recipe.image_id),
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecipeIngredientResponse {
    /// Ingredient ID
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i32,
    pub tags: Vec<Tag>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    /// Image URL
    pub image: String,
    pub text: String,
    /// Minutes
    pub cooking_time: i32,
}

/// Load a recipe by id, 404 if it does not exist.
pub fn find_recipe(conn: &mut PgConnection, id: i32) -> Result<Recipe, ApiError> {
    recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Not found."))
}

/// Ids among `recipe_ids` that appear in the viewer's favorites or cart.
fn marked_by(
    conn: &mut PgConnection,
    viewer: Option<i32>,
    recipe_ids: &[i32],
) -> QueryResult<(HashSet<i32>, HashSet<i32>)> {
    let Some(viewer) = viewer else {
        return Ok((HashSet::new(), HashSet::new()));
    };

    let favorited: Vec<i32> = favorites::table
        .filter(favorites::user_id.eq(viewer))
        .filter(favorites::recipe_id.eq_any(recipe_ids))
        .select(favorites::recipe_id)
        .load(conn)?;

    let in_cart: Vec<i32> = shopping_carts::table
        .filter(shopping_carts::user_id.eq(viewer))
        .filter(shopping_carts::recipe_id.eq_any(recipe_ids))
        .select(shopping_carts::recipe_id)
        .load(conn)?;

    Ok((
        favorited.into_iter().collect(),
        in_cart.into_iter().collect(),
    ))
}

/// Build read representations for `recipes`, preserving their order.
///
/// Tags, ingredients, authors and the viewer's marks are each loaded in a
/// single query for the whole batch.
pub fn recipe_responses(
    conn: &mut PgConnection,
    recipes: Vec<Recipe>,
    viewer: Option<i32>,
    config: &Config,
) -> QueryResult<Vec<RecipeResponse>> {
    let ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();

    let tag_rows: Vec<(i32, Tag)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&ids))
        .order(tags::name.asc())
        .select((recipe_tags::recipe_id, Tag::as_select()))
        .load(conn)?;
    let mut tags_by_recipe: HashMap<i32, Vec<Tag>> = HashMap::new();
    for (recipe_id, tag) in tag_rows {
        tags_by_recipe.entry(recipe_id).or_default().push(tag);
    }

    let ingredient_rows: Vec<(i32, i32, String, String, i32)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&ids))
        .order(recipe_ingredients::id.asc())
        .select((
            recipe_ingredients::recipe_id,
            ingredients::id,
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(conn)?;
    let mut ingredients_by_recipe: HashMap<i32, Vec<RecipeIngredientResponse>> = HashMap::new();
    for (recipe_id, id, name, measurement_unit, amount) in ingredient_rows {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(RecipeIngredientResponse {
                id,
                name,
                measurement_unit,
                amount,
            });
    }

    let author_ids: Vec<i32> = recipes.iter().map(|r| r.author_id).collect();
    let authors: Vec<User> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(User::as_select())
        .load(conn)?;
    let authors: HashMap<i32, UserResponse> = user_responses(conn, authors, viewer, config)?
        .into_iter()
        .map(|author| (author.id, author))
        .collect();

    let (favorited, in_cart) = marked_by(conn, viewer, &ids)?;

    Ok(recipes
        .into_iter()
        .filter_map(|recipe| {
            let author = authors.get(&recipe.author_id)?.clone();
            Some(RecipeResponse {
                tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
                ingredients: ingredients_by_recipe.remove(&recipe.id).unwrap_or_default(),
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                image: config.media_url(recipe.image_id),
                author,
                id: recipe.id,
                name: recipe.name,
                text: recipe.text,
                cooking_time: recipe.cooking_time,
            })
        })
        .collect())
}

pub fn recipe_response(
    conn: &mut PgConnection,
    recipe: Recipe,
    viewer: Option<i32>,
    config: &Config,
) -> Result<RecipeResponse, ApiError> {
    recipe_responses(conn, vec![recipe], viewer, config)?
        .pop()
        .ok_or_else(|| ApiError::Internal("Recipe author missing".to_string()))
}

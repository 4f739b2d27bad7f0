//! Checks and association writes shared by recipe create and update.

use diesel::prelude::*;

use crate::api::ApiError;
use crate::models::{NewRecipeIngredient, NewRecipeTag};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, tags};
use crate::types::RecipeInput;
use crate::validation::{first_missing, ValidationError};

/// Every referenced ingredient and tag must exist.
pub fn check_references(conn: &mut PgConnection, input: &RecipeInput) -> Result<(), ApiError> {
    let ingredient_ids = input.ingredient_ids();
    let found: Vec<i32> = ingredients::table
        .filter(ingredients::id.eq_any(&ingredient_ids))
        .select(ingredients::id)
        .load(conn)?;
    if let Some(missing) = first_missing(&ingredient_ids, &found) {
        return Err(ValidationError::field(
            "ingredients",
            format!("Ingredient {missing} does not exist."),
        )
        .into());
    }

    let tag_ids = input.tag_ids();
    let found: Vec<i32> = tags::table
        .filter(tags::id.eq_any(&tag_ids))
        .select(tags::id)
        .load(conn)?;
    if let Some(missing) = first_missing(&tag_ids, &found) {
        return Err(ValidationError::field("tags", format!("Tag {missing} does not exist.")).into());
    }

    Ok(())
}

/// Replace the recipe's ingredient and tag rows with those in `input`.
pub fn replace_associations(
    conn: &mut PgConnection,
    recipe_id: i32,
    input: &RecipeInput,
) -> QueryResult<()> {
    diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)))
        .execute(conn)?;
    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
        .execute(conn)?;

    let new_ingredients: Vec<NewRecipeIngredient> = input
        .ingredients
        .iter()
        .flatten()
        .map(|item| NewRecipeIngredient {
            recipe_id,
            ingredient_id: item.id,
            amount: item.amount,
        })
        .collect();
    diesel::insert_into(recipe_ingredients::table)
        .values(&new_ingredients)
        .execute(conn)?;

    let new_tags: Vec<NewRecipeTag> = input
        .tag_ids()
        .into_iter()
        .map(|tag_id| NewRecipeTag { recipe_id, tag_id })
        .collect();
    diesel::insert_into(recipe_tags::table)
        .values(&new_tags)
        .execute(conn)?;

    Ok(())
}

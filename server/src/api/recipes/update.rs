use super::read::{find_recipe, recipe_response, RecipeResponse};
use super::write::{check_references, replace_associations};
use crate::api::media::store_image;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::models::Recipe;
use crate::schema::{images, recipes};
use crate::types::RecipeInput;
use crate::validation::validate_recipe;
use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::WithRejection;
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}/",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = RecipeInput,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Invalid recipe", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ApiError>,
    WithRejection(Json(input), _): WithRejection<Json<RecipeInput>, ApiError>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let mut conn = pool.get()?;

    let existing = find_recipe(&mut conn, id)?;
    if existing.author_id != user.id {
        return Err(ApiError::Forbidden);
    }

    validate_recipe(&input, false)?;

    let recipe = conn.transaction::<_, ApiError, _>(|conn| {
        check_references(conn, &input)?;

        let image_id = match input.image.as_deref().filter(|uri| !uri.is_empty()) {
            Some(uri) => store_image(conn, "image", Some(uri))?,
            None => existing.image_id,
        };

        let recipe: Recipe = diesel::update(recipes::table.find(existing.id))
            .set((
                recipes::name.eq(input.name.trim()),
                recipes::text.eq(&input.text),
                recipes::cooking_time.eq(input.cooking_time),
                recipes::image_id.eq(image_id),
            ))
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        if image_id != existing.image_id {
            diesel::delete(images::table.find(existing.image_id)).execute(conn)?;
        }

        replace_associations(conn, recipe.id, &input)?;

        Ok(recipe)
    })?;

    Ok(Json(recipe_response(&mut conn, recipe, Some(user.id), &config)?))
}

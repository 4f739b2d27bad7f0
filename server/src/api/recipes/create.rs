use super::read::{recipe_response, RecipeResponse};
use super::write::{check_references, replace_associations};
use crate::api::media::store_image;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::models::{NewRecipe, Recipe};
use crate::schema::recipes;
use crate::types::RecipeInput;
use crate::validation::validate_recipe;
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/recipes/",
    tag = "recipes",
    request_body = RecipeInput,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid recipe", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    WithRejection(Json(input), _): WithRejection<Json<RecipeInput>, ApiError>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    validate_recipe(&input, true)?;

    let mut conn = pool.get()?;

    let recipe = conn.transaction::<_, ApiError, _>(|conn| {
        check_references(conn, &input)?;

        let image_id = store_image(conn, "image", input.image.as_deref())?;

        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(NewRecipe {
                author_id: user.id,
                name: input.name.trim(),
                text: &input.text,
                cooking_time: input.cooking_time,
                image_id,
            })
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        replace_associations(conn, recipe.id, &input)?;

        Ok(recipe)
    })?;

    tracing::info!("User {} created recipe {}", user.id, recipe.id);

    let response = recipe_response(&mut conn, recipe, Some(user.id), &config)?;
    Ok((StatusCode::CREATED, Json(response)))
}

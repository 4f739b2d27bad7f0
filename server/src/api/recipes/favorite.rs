use super::read::{find_recipe, RecipeShort};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::models::NewFavorite;
use crate::schema::favorites;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use diesel::prelude::*;
use std::sync::Arc;

const ALREADY_FAVORITED: &str = "Recipe is already in favorites.";

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite/",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Added to favorites", body = RecipeShort),
        (status = 400, description = "Already in favorites", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn add_favorite(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<(StatusCode, Json<RecipeShort>), ApiError> {
    let mut conn = pool.get()?;

    let recipe = find_recipe(&mut conn, id)?;

    let exists: bool = diesel::select(diesel::dsl::exists(
        favorites::table
            .filter(favorites::user_id.eq(user.id))
            .filter(favorites::recipe_id.eq(recipe.id)),
    ))
    .get_result(&mut conn)?;
    if exists {
        return Err(ApiError::bad_request(ALREADY_FAVORITED));
    }

    diesel::insert_into(favorites::table)
        .values(NewFavorite {
            user_id: user.id,
            recipe_id: recipe.id,
        })
        .execute(&mut conn)
        .map_err(ApiError::on_conflict(ALREADY_FAVORITED))?;

    Ok((StatusCode::CREATED, Json(RecipeShort::new(&recipe, &config))))
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite/",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Removed from favorites"),
        (status = 400, description = "Not in favorites", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn remove_favorite(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<StatusCode, ApiError> {
    let mut conn = pool.get()?;

    let recipe = find_recipe(&mut conn, id)?;

    let deleted = diesel::delete(
        favorites::table
            .filter(favorites::user_id.eq(user.id))
            .filter(favorites::recipe_id.eq(recipe.id)),
    )
    .execute(&mut conn)?;

    if deleted == 0 {
        return Err(ApiError::bad_request("Recipe is not in favorites."));
    }

    Ok(StatusCode::NO_CONTENT)
}

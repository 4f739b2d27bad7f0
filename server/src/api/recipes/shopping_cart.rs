use super::read::{find_recipe, RecipeShort};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::models::NewCartItem;
use crate::schema::shopping_carts;
use crate::shopping_list;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use diesel::prelude::*;
use std::sync::Arc;

const ALREADY_IN_CART: &str = "Recipe is already in the shopping cart.";

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart/",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Added to the shopping cart", body = RecipeShort),
        (status = 400, description = "Already in the shopping cart", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn add_to_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<(StatusCode, Json<RecipeShort>), ApiError> {
    let mut conn = pool.get()?;

    let recipe = find_recipe(&mut conn, id)?;

    let exists: bool = diesel::select(diesel::dsl::exists(
        shopping_carts::table
            .filter(shopping_carts::user_id.eq(user.id))
            .filter(shopping_carts::recipe_id.eq(recipe.id)),
    ))
    .get_result(&mut conn)?;
    if exists {
        return Err(ApiError::bad_request(ALREADY_IN_CART));
    }

    diesel::insert_into(shopping_carts::table)
        .values(NewCartItem {
            user_id: user.id,
            recipe_id: recipe.id,
        })
        .execute(&mut conn)
        .map_err(ApiError::on_conflict(ALREADY_IN_CART))?;

    Ok((StatusCode::CREATED, Json(RecipeShort::new(&recipe, &config))))
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart/",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Removed from the shopping cart"),
        (status = 400, description = "Not in the shopping cart", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn remove_from_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<StatusCode, ApiError> {
    let mut conn = pool.get()?;

    let recipe = find_recipe(&mut conn, id)?;

    let deleted = diesel::delete(
        shopping_carts::table
            .filter(shopping_carts::user_id.eq(user.id))
            .filter(shopping_carts::recipe_id.eq(recipe.id)),
    )
    .execute(&mut conn)?;

    if deleted == 0 {
        return Err(ApiError::bad_request("Recipe is not in the shopping cart."));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart/",
    tag = "recipes",
    responses(
        (status = 200, description = "Aggregated shopping list as a text attachment"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> Result<Response, ApiError> {
    let mut conn = pool.get()?;

    let rows = shopping_list::load_cart_ingredients(&mut conn, user.id)?;
    let lines = shopping_list::aggregate(rows);
    let body = shopping_list::render(&user.username, &lines);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", shopping_list::FILENAME),
            ),
        ],
        body,
    )
        .into_response())
}

pub mod create;
pub mod delete;
pub mod favorite;
pub mod get;
pub mod get_link;
pub mod list;
pub mod read;
pub mod shopping_cart;
pub mod update;
pub mod write;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/recipes/",
            get(list::list_recipes).post(create::create_recipe),
        )
        .route(
            "/api/recipes/download_shopping_cart/",
            get(shopping_cart::download_shopping_cart),
        )
        .route(
            "/api/recipes/{id}/",
            get(get::get_recipe)
                .patch(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route(
            "/api/recipes/{id}/favorite/",
            post(favorite::add_favorite).delete(favorite::remove_favorite),
        )
        .route(
            "/api/recipes/{id}/shopping_cart/",
            post(shopping_cart::add_to_cart).delete(shopping_cart::remove_from_cart),
        )
        .route("/api/recipes/{id}/get-link/", get(get_link::get_link))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_recipes,
        create::create_recipe,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        favorite::add_favorite,
        favorite::remove_favorite,
        shopping_cart::add_to_cart,
        shopping_cart::remove_from_cart,
        shopping_cart::download_shopping_cart,
        get_link::get_link,
    ),
    components(schemas(
        crate::types::RecipeInput,
        crate::types::RecipeIngredientInput,
        read::RecipeResponse,
        read::RecipeIngredientResponse,
        read::RecipeShort,
        get_link::ShortLinkResponse,
    ))
)]
pub struct ApiDoc;

use super::read::{recipe_responses, RecipeResponse};
use crate::api::pagination::{Page, PageParams};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::MaybeAuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::models::Recipe;
use crate::raw_sql::count_over;
use crate::schema::{favorites, recipe_tags, recipes, shopping_carts, tags};
use axum::{extract::State, http::Uri, Json};
use axum_extra::extract::{Query, WithRejection};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Page number, starting at 1 (default: 1)
    pub page: Option<i64>,
    /// Items per page (default: 6, max: 60)
    pub limit: Option<i64>,
    /// Only recipes by this user ID
    pub author: Option<i32>,
    /// Tag slugs; a recipe matches if it has any of them. Repeat the key for several.
    #[serde(default)]
    pub tags: Vec<String>,
    /// `1` or `true`: only the caller's favorites
    pub is_favorited: Option<String>,
    /// `1` or `true`: only recipes in the caller's shopping cart
    pub is_in_shopping_cart: Option<String>,
}

fn flag_set(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}

impl ListRecipesParams {
    fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Page of recipes, newest first", body = Page<RecipeResponse>),
        (status = 404, description = "Page out of range", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    viewer: MaybeAuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    WithRejection(Query(params), _): WithRejection<Query<ListRecipesParams>, ApiError>,
    uri: Uri,
) -> Result<Json<Page<RecipeResponse>>, ApiError> {
    let page = params.page_params();
    let mut conn = pool.get()?;

    let mut query = recipes::table.into_boxed();

    if let Some(author) = params.author {
        query = query.filter(recipes::author_id.eq(author));
    }

    if !params.tags.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .filter(
                        recipe_tags::tag_id.eq_any(
                            tags::table
                                .filter(tags::slug.eq_any(&params.tags))
                                .select(tags::id),
                        ),
                    )
                    .select(recipe_tags::recipe_id),
            ),
        );
    }

    // Mark filters only apply to authenticated callers.
    if let Some(viewer_id) = viewer.id() {
        if flag_set(params.is_favorited.as_deref()) {
            query = query.filter(
                recipes::id.eq_any(
                    favorites::table
                        .filter(favorites::user_id.eq(viewer_id))
                        .select(favorites::recipe_id),
                ),
            );
        }
        if flag_set(params.is_in_shopping_cart.as_deref()) {
            query = query.filter(
                recipes::id.eq_any(
                    shopping_carts::table
                        .filter(shopping_carts::user_id.eq(viewer_id))
                        .select(shopping_carts::recipe_id),
                ),
            );
        }
    }

    let rows: Vec<(Recipe, i64)> = query
        .select((Recipe::as_select(), count_over()))
        .order(recipes::id.desc())
        .limit(page.limit())
        .offset(page.offset())
        .load(&mut conn)?;

    page.check_in_range(rows.len())?;

    let total = rows.first().map(|(_, total)| *total).unwrap_or(0);
    let recipes: Vec<Recipe> = rows.into_iter().map(|(recipe, _)| recipe).collect();
    let results = recipe_responses(&mut conn, recipes, viewer.id(), &config)?;

    Ok(Json(Page::new(
        results,
        total,
        &page,
        &config.site_url,
        &uri,
    )))
}

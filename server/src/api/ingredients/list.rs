use crate::api::ApiError;
use crate::db::DbPool;
use crate::models::Ingredient;
use crate::schema::ingredients;
use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListIngredientsParams {
    /// Case-insensitive name prefix
    pub name: Option<String>,
}

/// `ILIKE` pattern matching names that start with `prefix`.
fn prefix_pattern(prefix: &str) -> String {
    format!(
        "{}%",
        prefix
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    )
}

#[utoipa::path(
    get,
    path = "/api/ingredients/",
    tag = "ingredients",
    params(ListIngredientsParams),
    responses(
        (status = 200, description = "Ingredients ordered by name", body = Vec<Ingredient>)
    )
)]
pub async fn list_ingredients(
    State(pool): State<Arc<DbPool>>,
    WithRejection(Query(params), _): WithRejection<Query<ListIngredientsParams>, ApiError>,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
    let mut conn = pool.get()?;

    let mut query = ingredients::table
        .select(Ingredient::as_select())
        .order((ingredients::name.asc(), ingredients::measurement_unit.asc()))
        .into_boxed();

    if let Some(name) = params.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        query = query.filter(ingredients::name.ilike(prefix_pattern(name)));
    }

    Ok(Json(query.load(&mut conn)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_pattern_escapes_wildcards() {
        assert_eq!(prefix_pattern("sal"), "sal%");
        assert_eq!(prefix_pattern("50%_"), "50\\%\\_%");
    }
}

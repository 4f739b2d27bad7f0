use crate::api::ApiError;
use crate::db::DbPool;
use crate::models::Tag;
use crate::schema::tags;
use axum::{extract::State, Json};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/tags/",
    tag = "tags",
    responses(
        (status = 200, description = "All tags ordered by name", body = Vec<Tag>)
    )
)]
pub async fn list_tags(State(pool): State<Arc<DbPool>>) -> Result<Json<Vec<Tag>>, ApiError> {
    let mut conn = pool.get()?;

    let tags: Vec<Tag> = tags::table
        .select(Tag::as_select())
        .order(tags::name.asc())
        .load(&mut conn)?;

    Ok(Json(tags))
}

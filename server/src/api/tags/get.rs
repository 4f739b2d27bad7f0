use crate::api::{ApiError, ErrorResponse};
use crate::db::DbPool;
use crate::models::Tag;
use crate::schema::tags;
use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::WithRejection;
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/tags/{id}/",
    tag = "tags",
    params(
        ("id" = i32, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Tag", body = Tag),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    )
)]
pub async fn get_tag(
    State(pool): State<Arc<DbPool>>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<Json<Tag>, ApiError> {
    let mut conn = pool.get()?;

    let tag = tags::table
        .find(id)
        .select(Tag::as_select())
        .first(&mut conn)?;

    Ok(Json(tag))
}

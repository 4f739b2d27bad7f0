//! Stored images and short-link redirects: the two routes served outside
//! `/api`.

use crate::api::{ApiError, ErrorResponse};
use crate::db::DbPool;
use crate::images::decode_data_uri;
use crate::models::NewImage;
use crate::schema::{images, recipes};
use crate::short_link;
use crate::validation::ValidationError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;
use diesel::prelude::*;
use std::sync::Arc;
use utoipa::OpenApi;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/media/{id}", get(get_media))
        .route("/s/{code}", get(follow_short_link))
}

#[derive(OpenApi)]
#[openapi(paths(get_media, follow_short_link))]
pub struct ApiDoc;

/// Decode a data-URI upload and insert it into `images`. Errors name `field`.
pub fn store_image(
    conn: &mut PgConnection,
    field: &'static str,
    data_uri: Option<&str>,
) -> Result<i32, ApiError> {
    let data_uri = data_uri
        .filter(|uri| !uri.is_empty())
        .ok_or_else(|| ValidationError::field(field, "This field is required."))?;

    let upload = decode_data_uri(data_uri).map_err(|e| ValidationError::field(field, e))?;

    let id = diesel::insert_into(images::table)
        .values(NewImage {
            content_type: &upload.content_type,
            data: &upload.data,
        })
        .returning(images::id)
        .get_result(conn)?;

    Ok(id)
}

#[utoipa::path(
    get,
    path = "/media/{id}",
    tag = "media",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 404, description = "Image not found", body = ErrorResponse)
    )
)]
pub async fn get_media(
    State(pool): State<Arc<DbPool>>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<Response, ApiError> {
    let mut conn = pool.get()?;

    let (content_type, data): (String, Vec<u8>) = images::table
        .find(id)
        .select((images::content_type, images::data))
        .first(&mut conn)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        data,
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/s/{code}",
    tag = "media",
    params(
        ("code" = String, Path, description = "Short code issued by get-link")
    ),
    responses(
        (status = 302, description = "Redirect to the recipe page"),
        (status = 404, description = "Unknown code", body = ErrorResponse)
    )
)]
pub async fn follow_short_link(
    State(pool): State<Arc<DbPool>>,
    WithRejection(Path(code), _): WithRejection<Path<String>, ApiError>,
) -> Result<Response, ApiError> {
    let id = short_link::decode(&code).ok_or_else(|| ApiError::not_found("Not found."))?;

    let mut conn = pool.get()?;
    let exists: bool = diesel::select(diesel::dsl::exists(recipes::table.find(id)))
        .get_result(&mut conn)?;
    if !exists {
        return Err(ApiError::not_found("Not found."));
    }

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, format!("/recipes/{}", id))],
    )
        .into_response())
}

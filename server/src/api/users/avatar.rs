use crate::api::media::store_image;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::schema::{images, users};
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AvatarRequest {
    /// Image as a `data:image/...;base64,` URI
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvatarResponse {
    /// Avatar URL
    pub avatar: String,
}

#[utoipa::path(
    put,
    path = "/api/users/me/avatar/",
    tag = "users",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar replaced", body = AvatarResponse),
        (status = 400, description = "Missing or invalid image", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn put_avatar(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    WithRejection(Json(req), _): WithRejection<Json<AvatarRequest>, ApiError>,
) -> Result<Json<AvatarResponse>, ApiError> {
    let mut conn = pool.get()?;

    let image_id = conn.transaction::<_, ApiError, _>(|conn| {
        let image_id = store_image(conn, "avatar", req.avatar.as_deref())?;

        diesel::update(users::table.find(user.id))
            .set(users::avatar_id.eq(image_id))
            .execute(conn)?;

        if let Some(old) = user.avatar_id {
            diesel::delete(images::table.find(old)).execute(conn)?;
        }

        Ok(image_id)
    })?;

    Ok(Json(AvatarResponse {
        avatar: config.media_url(image_id),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/users/me/avatar/",
    tag = "users",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn delete_avatar(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> Result<StatusCode, ApiError> {
    let Some(image_id) = user.avatar_id else {
        return Ok(StatusCode::NO_CONTENT);
    };

    let mut conn = pool.get()?;

    // avatar_id is ON DELETE SET NULL
    diesel::delete(images::table.find(image_id)).execute(&mut conn)?;

    Ok(StatusCode::NO_CONTENT)
}

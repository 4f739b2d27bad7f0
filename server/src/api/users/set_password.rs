use crate::api::{ApiError, ErrorResponse};
use crate::auth::{hash_password, verify_password, AuthUser};
use crate::db::DbPool;
use crate::schema::users;
use crate::validation::{validate_password, ValidationError};
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[utoipa::path(
    post,
    path = "/api/users/set_password/",
    tag = "users",
    request_body = SetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Wrong current password or invalid new one", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn set_password(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    WithRejection(Json(req), _): WithRejection<Json<SetPasswordRequest>, ApiError>,
) -> Result<StatusCode, ApiError> {
    validate_password("new_password", &req.new_password)?;

    if !verify_password(&req.current_password, &user.password_hash) {
        return Err(ValidationError::field("current_password", "Invalid password.").into());
    }

    let password_hash = hash_password(&req.new_password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::Internal("Failed to hash password".to_string())
    })?;

    let mut conn = pool.get()?;
    diesel::update(users::table.find(user.id))
        .set(users::password_hash.eq(password_hash))
        .execute(&mut conn)?;

    Ok(StatusCode::NO_CONTENT)
}

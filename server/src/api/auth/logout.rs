use crate::api::{ApiError, ErrorResponse};
use crate::auth::{delete_session, token_from_headers, AuthUser};
use crate::db::DbPool;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/auth/token/logout/",
    tag = "auth",
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn logout(
    _user: AuthUser,
    State(pool): State<Arc<DbPool>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = token_from_headers(&headers)?;
    let mut conn = pool.get()?;

    delete_session(&mut conn, token)?;

    Ok(StatusCode::NO_CONTENT)
}

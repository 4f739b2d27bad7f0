use super::read::{user_responses, UserResponse};
use crate::api::pagination::{Page, PageParams};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::MaybeAuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::models::User;
use crate::raw_sql::count_over;
use crate::schema::users;
use axum::{
    extract::{Query, State},
    http::Uri,
    Json,
};
use axum_extra::extract::WithRejection;
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/users/",
    tag = "users",
    params(PageParams),
    responses(
        (status = 200, description = "Page of users ordered by username", body = Page<UserResponse>),
        (status = 404, description = "Page out of range", body = ErrorResponse)
    )
)]
pub async fn list_users(
    viewer: MaybeAuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    WithRejection(Query(params), _): WithRejection<Query<PageParams>, ApiError>,
    uri: Uri,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    let mut conn = pool.get()?;

    let rows: Vec<(User, i64)> = users::table
        .select((User::as_select(), count_over()))
        .order(users::username.asc())
        .limit(params.limit())
        .offset(params.offset())
        .load(&mut conn)?;

    params.check_in_range(rows.len())?;

    let total = rows.first().map(|(_, total)| *total).unwrap_or(0);
    let users: Vec<User> = rows.into_iter().map(|(user, _)| user).collect();
    let results = user_responses(&mut conn, users, viewer.id(), &config)?;

    Ok(Json(Page::new(
        results,
        total,
        &params,
        &config.site_url,
        &uri,
    )))
}

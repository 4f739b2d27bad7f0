use super::read::{subscription_responses, SubscriptionResponse};
use super::subscribe::RecipesLimitParams;
use crate::api::pagination::{Page, PageParams};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::models::User;
use crate::raw_sql::count_over;
use crate::schema::{subscriptions, users};
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
    path = "/api/users/subscriptions/",
    tag = "users",
    params(PageParams, RecipesLimitParams),
    responses(
        (status = 200, description = "Authors the caller follows", body = Page<SubscriptionResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Page out of range", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn list_subscriptions(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    WithRejection(Query(page), _): WithRejection<Query<PageParams>, ApiError>,
    WithRejection(Query(limits), _): WithRejection<Query<RecipesLimitParams>, ApiError>,
    uri: Uri,
) -> Result<Json<Page<SubscriptionResponse>>, ApiError> {
    let mut conn = pool.get()?;

    let rows: Vec<(User, i64)> = subscriptions::table
        .inner_join(users::table.on(users::id.eq(subscriptions::author_id)))
        .filter(subscriptions::user_id.eq(user.id))
        .select((User::as_select(), count_over()))
        .order(subscriptions::id.asc())
        .limit(page.limit())
        .offset(page.offset())
        .load(&mut conn)?;

    page.check_in_range(rows.len())?;

    let total = rows.first().map(|(_, total)| *total).unwrap_or(0);
    let authors: Vec<User> = rows.into_iter().map(|(author, _)| author).collect();
    let results =
        subscription_responses(&mut conn, authors, user.id, limits.recipes_limit(), &config)?;

    Ok(Json(Page::new(
        results,
        total,
        &page,
        &config.site_url,
        &uri,
    )))
}

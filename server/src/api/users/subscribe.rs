use super::read::{subscription_responses, SubscriptionResponse, DEFAULT_RECIPES_LIMIT};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::models::{NewSubscription, User};
use crate::schema::{subscriptions, users};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

const ALREADY_SUBSCRIBED: &str = "You are already subscribed to this author.";

#[derive(Debug, Default, Clone, Copy, Deserialize, IntoParams)]
pub struct RecipesLimitParams {
    /// Maximum number of recipes shown per author (default: 6)
    pub recipes_limit: Option<usize>,
}

impl RecipesLimitParams {
    pub fn recipes_limit(&self) -> usize {
        self.recipes_limit.unwrap_or(DEFAULT_RECIPES_LIMIT)
    }
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe/",
    tag = "users",
    params(
        ("id" = i32, Path, description = "Author ID"),
        RecipesLimitParams
    ),
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionResponse),
        (status = 400, description = "Self-subscription or already subscribed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Author not found", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn subscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    WithRejection(Path(author_id), _): WithRejection<Path<i32>, ApiError>,
    WithRejection(Query(params), _): WithRejection<Query<RecipesLimitParams>, ApiError>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    let mut conn = pool.get()?;

    let author: User = users::table
        .find(author_id)
        .select(User::as_select())
        .first(&mut conn)?;

    if author.id == user.id {
        return Err(ApiError::bad_request("You cannot subscribe to yourself."));
    }

    let exists: bool = diesel::select(diesel::dsl::exists(
        subscriptions::table
            .filter(subscriptions::user_id.eq(user.id))
            .filter(subscriptions::author_id.eq(author.id)),
    ))
    .get_result(&mut conn)?;
    if exists {
        return Err(ApiError::bad_request(ALREADY_SUBSCRIBED));
    }

    diesel::insert_into(subscriptions::table)
        .values(NewSubscription {
            user_id: user.id,
            author_id: author.id,
        })
        .execute(&mut conn)
        .map_err(ApiError::on_conflict(ALREADY_SUBSCRIBED))?;

    let mut entries = subscription_responses(
        &mut conn,
        vec![author],
        user.id,
        params.recipes_limit(),
        &config,
    )?;

    let entry = entries
        .pop()
        .ok_or_else(|| ApiError::Internal("Subscription entry missing".to_string()))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe/",
    tag = "users",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Not subscribed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Author not found", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    WithRejection(Path(author_id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<StatusCode, ApiError> {
    let mut conn = pool.get()?;

    let author_id: i32 = users::table
        .find(author_id)
        .select(users::id)
        .first(&mut conn)?;

    let deleted = diesel::delete(
        subscriptions::table
            .filter(subscriptions::user_id.eq(user.id))
            .filter(subscriptions::author_id.eq(author_id)),
    )
    .execute(&mut conn)?;

    if deleted == 0 {
        return Err(ApiError::bad_request("You are not subscribed to this author."));
    }

    Ok(StatusCode::NO_CONTENT)
}

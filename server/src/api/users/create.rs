use crate::api::{ApiError, ErrorResponse};
use crate::auth::hash_password;
use crate::db::DbPool;
use crate::email_matches;
use crate::models::NewUser;
use crate::schema::users;
use crate::validation::{
    validate_email, validate_password, validate_text, validate_username, ValidationError,
    NAME_MAX_LENGTH,
};
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateUserResponse {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl CreateUserRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        validate_username(&self.username)?;
        validate_text("first_name", &self.first_name, NAME_MAX_LENGTH)?;
        validate_text("last_name", &self.last_name, NAME_MAX_LENGTH)?;
        validate_password("password", &self.password)
    }
}

#[utoipa::path(
    post,
    path = "/api/users/",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User registered", body = CreateUserResponse),
        (status = 400, description = "Invalid input or email/username taken", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(pool): State<Arc<DbPool>>,
    WithRejection(Json(req), _): WithRejection<Json<CreateUserRequest>, ApiError>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    req.validate()?;

    let mut conn = pool.get()?;

    let email_taken: bool = diesel::select(diesel::dsl::exists(
        users::table.filter(email_matches!(&req.email)),
    ))
    .get_result(&mut conn)?;
    if email_taken {
        return Err(ValidationError::field("email", "A user with that email already exists.").into());
    }

    let username_taken: bool = diesel::select(diesel::dsl::exists(
        users::table.filter(users::username.eq(&req.username)),
    ))
    .get_result(&mut conn)?;
    if username_taken {
        return Err(
            ValidationError::field("username", "A user with that username already exists.").into(),
        );
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::Internal("Failed to hash password".to_string())
    })?;

    let user_id: i32 = diesel::insert_into(users::table)
        .values(NewUser {
            email: &req.email,
            username: &req.username,
            first_name: &req.first_name,
            last_name: &req.last_name,
            password_hash: &password_hash,
        })
        .returning(users::id)
        .get_result(&mut conn)
        .map_err(ApiError::on_conflict(
            "A user with that email or username already exists.",
        ))?;

    tracing::info!("Registered user {} ({})", req.username, user_id);

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            id: user_id,
            email: req.email,
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
        }),
    ))
}

pub mod avatar;
pub mod create;
pub mod get;
pub mod list;
pub mod read;
pub mod set_password;
pub mod subscribe;
pub mod subscriptions;

use crate::AppState;
use axum::routing::{get, post, put};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/users endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users/",
            get(list::list_users).post(create::create_user),
        )
        .route("/api/users/me/", get(get::get_me))
        .route(
            "/api/users/me/avatar/",
            put(avatar::put_avatar).delete(avatar::delete_avatar),
        )
        .route("/api/users/set_password/", post(set_password::set_password))
        .route(
            "/api/users/subscriptions/",
            get(subscriptions::list_subscriptions),
        )
        .route("/api/users/{id}/", get(get::get_user))
        .route(
            "/api/users/{id}/subscribe/",
            post(subscribe::subscribe).delete(subscribe::unsubscribe),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_user,
        list::list_users,
        get::get_user,
        get::get_me,
        avatar::put_avatar,
        avatar::delete_avatar,
        set_password::set_password,
        subscribe::subscribe,
        subscribe::unsubscribe,
        subscriptions::list_subscriptions,
    ),
    components(schemas(
        create::CreateUserRequest,
        create::CreateUserResponse,
        read::UserResponse,
        read::SubscriptionResponse,
        avatar::AvatarRequest,
        avatar::AvatarResponse,
        set_password::SetPasswordRequest,
    ))
)]
pub struct ApiDoc;

//! Foodgram: a recipe-sharing API with favorites, shopping carts and
//! author subscriptions.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod images;
pub mod import;
pub mod models;
pub mod raw_sql;
pub mod schema;
pub mod shopping_list;
pub mod short_link;
pub mod telemetry;
pub mod types;
pub mod validation;

use std::sync::Arc;

use axum::extract::FromRef;
use axum::Router;

use config::Config;
use db::DbPool;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<DbPool>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        Self {
            pool: Arc::new(pool),
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Arc<DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

/// The API router with state applied. Middleware is added by the binary.
pub fn app(state: AppState) -> Router {
    api::router().with_state(state)
}

//! Shared setup for integration tests. Tests need a Postgres database named
//! by `TEST_DATABASE_URL` and are skipped when it is unset.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use diesel::prelude::*;
use foodgram_server::config::Config;
use foodgram_server::db::{self, DbPool};
use foodgram_server::models::{NewIngredient, NewTag};
use foodgram_server::schema::{ingredients, tags};
use foodgram_server::{app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const SITE_URL: &str = "http://testserver";

pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

static POOL: OnceLock<DbPool> = OnceLock::new();
static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Router plus direct database access for fixtures.
pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
}

/// Returns `None` (and the calling test should return) when no test
/// database is configured. Migrations run once per test binary.
pub fn test_app() -> Option<TestApp> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;

    let pool = POOL
        .get_or_init(|| {
            std::env::set_var("INSECURE_PASSWORD_HASHING", "1");
            db::create_pool(&database_url).expect("Failed to set up test database")
        })
        .clone();

    let config = Config {
        database_url,
        bind_addr: "127.0.0.1:0".to_string(),
        site_url: SITE_URL.to_string(),
    };

    Some(TestApp {
        router: app(AppState::new(pool.clone(), config)),
        pool,
    })
}

/// A suffix that keeps fixture names apart across tests and runs.
pub fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    format!(
        "{}{}x{}x{}",
        prefix,
        std::process::id(),
        nanos,
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Failed to deserialize JSON response")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Failed to decode response as UTF-8")
    }

    pub fn header(&self, name: header::HeaderName) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
        }

        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("Failed to build request"))
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body")
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        self.request(Method::POST, uri, token, body).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Register a fresh user and log in. Returns `(user_id, token)`.
    pub async fn signup(&self, prefix: &str) -> (i64, String) {
        let username = unique(prefix);
        let email = format!("{}@example.com", username);

        let created = self
            .post(
                "/api/users/",
                None,
                Some(json!({
                    "email": email,
                    "username": username,
                    "first_name": "Test",
                    "last_name": "Cook",
                    "password": "s3cret-pass",
                })),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED, "{}", created.text());
        let id = created.json()["id"].as_i64().expect("user id");

        let login = self
            .post(
                "/api/auth/token/login/",
                None,
                Some(json!({"email": email, "password": "s3cret-pass"})),
            )
            .await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.text());
        let token = login.json()["auth_token"]
            .as_str()
            .expect("auth_token")
            .to_string();

        (id, token)
    }

    pub fn tag(&self, prefix: &str) -> (i32, String) {
        let slug = unique(prefix);
        let mut conn = self.pool.get().expect("connection");
        let id = diesel::insert_into(tags::table)
            .values(NewTag {
                name: slug.chars().take(32).collect(),
                slug: slug.clone(),
            })
            .returning(tags::id)
            .get_result(&mut conn)
            .expect("insert tag");
        (id, slug)
    }

    pub fn ingredient(&self, name: &str, unit: &str) -> i32 {
        let mut conn = self.pool.get().expect("connection");
        diesel::insert_into(ingredients::table)
            .values(NewIngredient {
                name: name.to_string(),
                measurement_unit: unit.to_string(),
            })
            .returning(ingredients::id)
            .get_result(&mut conn)
            .expect("insert ingredient")
    }

    /// Create a recipe through the API and return its id.
    pub async fn recipe(
        &self,
        token: &str,
        name: &str,
        tags: &[i32],
        ingredients: &[(i32, i32)],
    ) -> i64 {
        let ingredients: Vec<Value> = ingredients
            .iter()
            .map(|(id, amount)| json!({"id": id, "amount": amount}))
            .collect();

        let response = self
            .post(
                "/api/recipes/",
                Some(token),
                Some(json!({
                    "ingredients": ingredients,
                    "tags": tags,
                    "image": PNG_DATA_URI,
                    "name": name,
                    "text": "Mix everything.",
                    "cooking_time": 10,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()["id"].as_i64().expect("recipe id")
    }
}

//! Response shapes shared by every endpoint that returns a user.

use std::collections::{HashMap, HashSet};

use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::recipes::read::RecipeShort;
use crate::config::Config;
use crate::newest_recipes_per_author;
use crate::models::{Recipe, User};
use crate::schema::{recipes, subscriptions};

pub const DEFAULT_RECIPES_LIMIT: usize = 6;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the caller follows this user. Always false for anonymous callers.
    pub is_subscribed: bool,
    /// Avatar URL
    pub avatar: Option<String>,
}

impl UserResponse {
    fn new(user: User, is_subscribed: bool, config: &Config) -> Self {
        UserResponse {
            avatar: user.avatar_id.map(|id| config.media_url(id)),
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

/// An author as seen from their follower's subscription list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<RecipeShort>,
    pub recipes_count: i64,
}

/// Author ids among `author_ids` that `viewer` is subscribed to.
fn followed_among(
    conn: &mut PgConnection,
    viewer: Option<i32>,
    author_ids: &[i32],
) -> QueryResult<HashSet<i32>> {
    let Some(viewer) = viewer else {
        return Ok(HashSet::new());
    };

    let ids: Vec<i32> = subscriptions::table
        .filter(subscriptions::user_id.eq(viewer))
        .filter(subscriptions::author_id.eq_any(author_ids))
        .select(subscriptions::author_id)
        .load(conn)?;

    Ok(ids.into_iter().collect())
}

pub fn user_responses(
    conn: &mut PgConnection,
    users: Vec<User>,
    viewer: Option<i32>,
    config: &Config,
) -> QueryResult<Vec<UserResponse>> {
    let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
    let followed = followed_among(conn, viewer, &ids)?;

    Ok(users
        .into_iter()
        .map(|user| {
            let is_subscribed = followed.contains(&user.id);
            UserResponse::new(user, is_subscribed, config)
        })
        .collect())
}

pub fn user_response(
    conn: &mut PgConnection,
    user: User,
    viewer: Option<i32>,
    config: &Config,
) -> QueryResult<UserResponse> {
    let is_subscribed = match viewer {
        Some(_) => !followed_among(conn, viewer, &[user.id])?.is_empty(),
        None => false,
    };
    Ok(UserResponse::new(user, is_subscribed, config))
}

/// Build subscription entries for `authors`, each with the author's newest
/// `recipes_limit` recipes and their total recipe count.
pub fn subscription_responses(
    conn: &mut PgConnection,
    authors: Vec<User>,
    viewer: i32,
    recipes_limit: usize,
    config: &Config,
) -> QueryResult<Vec<SubscriptionResponse>> {
    let ids: Vec<i32> = authors.iter().map(|u| u.id).collect();

    let mut counts: HashMap<i32, i64> = recipes::table
        .filter(recipes::author_id.eq_any(&ids))
        .group_by(recipes::author_id)
        .select((recipes::author_id, diesel::dsl::count_star()))
        .load::<(i32, i64)>(conn)?
        .into_iter()
        .collect();

    let rows: Vec<Recipe> = if recipes_limit == 0 {
        Vec::new()
    } else {
        let limit = i64::try_from(recipes_limit).unwrap_or(i64::MAX);
        recipes::table
            .filter(newest_recipes_per_author!(&ids, limit))
            .order(recipes::id.desc())
            .select(Recipe::as_select())
            .load(conn)?
    };

    let mut by_author: HashMap<i32, Vec<Recipe>> = HashMap::new();
    for recipe in rows {
        by_author.entry(recipe.author_id).or_default().push(recipe);
    }

    let users = user_responses(conn, authors, Some(viewer), config)?;

    Ok(users
        .into_iter()
        .map(|user| {
            let recipes = by_author.remove(&user.id).unwrap_or_default();
            SubscriptionResponse {
                recipes: recipes.iter().map(|r| RecipeShort::new(r, config)).collect(),
                recipes_count: counts.remove(&user.id).unwrap_or(0),
                user,
            }
        })
        .collect())
}

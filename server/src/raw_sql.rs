//! Raw SQL fragments that can't be expressed in Diesel's type-safe DSL.
//!
//! # Safety
//!
//! All SQL in this module has been reviewed for SQL injection safety:
//! - User input is ALWAYS passed via `.bind()` parameters
//! - No string concatenation or interpolation with user data
//!
//! When adding new SQL here, document why Diesel DSL can't be used.

use diesel::dsl::sql;
use diesel::expression::SqlLiteral;
use diesel::sql_types::BigInt;

/// Window function for counting total rows across the full result set.
///
/// Returns `COUNT(*) OVER()` which gives the total count before LIMIT/OFFSET.
/// Diesel doesn't support window functions natively.
///
/// # Safety
/// Static SQL string with no user input.
pub fn count_over() -> SqlLiteral<BigInt> {
    sql::<BigInt>("COUNT(*) OVER()")
}

/// Filter expression for a case-insensitive match on `users.email`.
///
/// # Safety
/// The email value is passed via `.bind()`, not interpolated.
///
/// # Why raw SQL?
/// Diesel has no `lower()` helper for Postgres text columns.
#[macro_export]
macro_rules! email_matches {
    ($email:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>("LOWER(users.email) = LOWER(")
            .bind::<diesel::sql_types::Text, _>($email)
            .sql(")")
    };
}

/// Filter expression keeping, for each author in `author_ids`, only their
/// `limit` newest recipes (highest id first).
///
/// # Safety
/// The id array and the limit are passed via `.bind()`, not interpolated.
///
/// # Why raw SQL?
/// A per-group limit needs `ROW_NUMBER() OVER (PARTITION BY ...)`, which
/// Diesel can't express.
#[macro_export]
macro_rules! newest_recipes_per_author {
    ($author_ids:expr, $limit:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>(
            "recipes.id IN (SELECT ranked.id FROM (\
             SELECT id, ROW_NUMBER() OVER (PARTITION BY author_id ORDER BY id DESC) AS rn \
             FROM recipes WHERE author_id = ANY(",
        )
        .bind::<diesel::sql_types::Array<diesel::sql_types::Integer>, _>($author_ids)
        .sql(")) ranked WHERE ranked.rn <= ")
        .bind::<diesel::sql_types::BigInt, _>($limit)
        .sql(")")
    };
}

//! Field-level and cross-field rules applied to every write before anything
//! touches the database.

use std::collections::HashSet;

use thiserror::Error;

use crate::types::RecipeInput;

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const EMAIL_MAX_LENGTH: usize = 254;
pub const NAME_MAX_LENGTH: usize = 150;
pub const PASSWORD_MAX_LENGTH: usize = 150;
pub const TAG_NAME_MAX_LENGTH: usize = 32;
pub const TAG_SLUG_MAX_LENGTH: usize = 32;
pub const INGREDIENT_NAME_MAX_LENGTH: usize = 128;
pub const MEASUREMENT_UNIT_MAX_LENGTH: usize = 64;
pub const RECIPE_NAME_MAX_LENGTH: usize = 256;
pub const COOKING_TIME_MIN: i32 = 1;
pub const COOKING_TIME_MAX: i32 = 32_000;
pub const INGREDIENT_AMOUNT_MIN: i32 = 1;
pub const INGREDIENT_AMOUNT_MAX: i32 = 32_000;

const RESERVED_USERNAMES: &[&str] = &["me"];

const REQUIRED: &str = "This field is required.";

/// A rejected write. `field` names the offending input field when the rule
/// concerns a single one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Option<&'static str>,
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            message: message.into(),
        }
    }
}

fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-')
}

fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_')
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::field("username", REQUIRED));
    }
    if username.chars().count() > USERNAME_MAX_LENGTH {
        return Err(ValidationError::field(
            "username",
            format!("Ensure this field has no more than {USERNAME_MAX_LENGTH} characters."),
        ));
    }
    if !username.chars().all(is_username_char) {
        return Err(ValidationError::field(
            "username",
            "Username may contain only English letters, digits and @/./+/-/_ characters.",
        ));
    }
    if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
        return Err(ValidationError::field(
            "username",
            format!("Username {username} is not allowed."),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::field("email", REQUIRED));
    }
    if email.chars().count() > EMAIL_MAX_LENGTH {
        return Err(ValidationError::field(
            "email",
            format!("Ensure this field has no more than {EMAIL_MAX_LENGTH} characters."),
        ));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::field(
            "email",
            "Enter a valid email address.",
        ))
    }
}

/// Non-empty after trimming and within `max` characters.
pub fn validate_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::field(field, REQUIRED));
    }
    if value.chars().count() > max {
        return Err(ValidationError::field(
            field,
            format!("Ensure this field has no more than {max} characters."),
        ));
    }
    Ok(())
}

pub fn validate_password(field: &'static str, password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::field(field, REQUIRED));
    }
    if password.chars().count() > PASSWORD_MAX_LENGTH {
        return Err(ValidationError::field(
            field,
            format!("Ensure this field has no more than {PASSWORD_MAX_LENGTH} characters."),
        ));
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(ValidationError::field("slug", REQUIRED));
    }
    if slug.len() > TAG_SLUG_MAX_LENGTH {
        return Err(ValidationError::field(
            "slug",
            format!("Ensure this field has no more than {TAG_SLUG_MAX_LENGTH} characters."),
        ));
    }
    if !slug.chars().all(is_slug_char) {
        return Err(ValidationError::field(
            "slug",
            "Slug may contain only English letters, digits, '-' and '_'.",
        ));
    }
    Ok(())
}

pub fn validate_cooking_time(minutes: i32) -> Result<(), ValidationError> {
    if minutes < COOKING_TIME_MIN {
        return Err(ValidationError::field(
            "cooking_time",
            "Cooking time cannot be less than 1 minute.",
        ));
    }
    if minutes > COOKING_TIME_MAX {
        return Err(ValidationError::field(
            "cooking_time",
            format!("Cooking time cannot exceed {COOKING_TIME_MAX} minutes."),
        ));
    }
    Ok(())
}

/// Checks the shape of a recipe write. Whether the referenced tag and
/// ingredient ids exist is checked separately against the database.
pub fn validate_recipe(input: &RecipeInput, image_required: bool) -> Result<(), ValidationError> {
    validate_text("name", &input.name, RECIPE_NAME_MAX_LENGTH)?;
    validate_text("text", &input.text, usize::MAX)?;
    validate_cooking_time(input.cooking_time)?;

    let ingredients = input
        .ingredients
        .as_deref()
        .ok_or_else(|| ValidationError::field("ingredients", REQUIRED))?;
    if ingredients.is_empty() {
        return Err(ValidationError::field(
            "ingredients",
            "Recipe must contain at least one ingredient.",
        ));
    }

    let mut seen = HashSet::with_capacity(ingredients.len());
    for item in ingredients {
        if !(INGREDIENT_AMOUNT_MIN..=INGREDIENT_AMOUNT_MAX).contains(&item.amount) {
            return Err(ValidationError::field(
                "ingredients",
                format!(
                    "Ingredient amount must be between {INGREDIENT_AMOUNT_MIN} and {INGREDIENT_AMOUNT_MAX}."
                ),
            ));
        }
        if !seen.insert(item.id) {
            return Err(ValidationError::field(
                "ingredients",
                format!("Ingredient {} is listed more than once.", item.id),
            ));
        }
    }

    let tags = input
        .tags
        .as_deref()
        .ok_or_else(|| ValidationError::field("tags", REQUIRED))?;
    if tags.is_empty() {
        return Err(ValidationError::field(
            "tags",
            "Recipe must have at least one tag.",
        ));
    }
    let mut seen = HashSet::with_capacity(tags.len());
    if let Some(dup) = tags.iter().find(|id| !seen.insert(**id)) {
        return Err(ValidationError::field(
            "tags",
            format!("Tag {dup} is listed more than once."),
        ));
    }

    match input.image.as_deref() {
        None | Some("") if image_required => Err(ValidationError::field("image", REQUIRED)),
        _ => Ok(()),
    }
}

/// Returns the first id in `requested` that is missing from `existing`.
pub fn first_missing(requested: &[i32], existing: &[i32]) -> Option<i32> {
    let existing: HashSet<i32> = existing.iter().copied().collect();
    requested.iter().copied().find(|id| !existing.contains(id))
}

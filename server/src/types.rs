use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One `{id, amount}` pair of a recipe write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipeIngredientInput {
    /// Ingredient ID
    pub id: i32,
    pub amount: i32,
}

/// Recipe write payload, shared by create (POST) and update (PATCH).
///
/// `ingredients` and `tags` are optional at the serde level so that a missing
/// list is reported as a field error rather than a body rejection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeInput {
    #[serde(default)]
    pub ingredients: Option<Vec<RecipeIngredientInput>>,
    /// Tag IDs
    #[serde(default)]
    pub tags: Option<Vec<i32>>,
    /// Image as a `data:image/...;base64,` URI. Required on create.
    #[serde(default)]
    pub image: Option<String>,
    pub name: String,
    pub text: String,
    /// Minutes
    pub cooking_time: i32,
}

impl RecipeInput {
    pub fn ingredient_ids(&self) -> Vec<i32> {
        self.ingredients
            .iter()
            .flatten()
            .map(|item| item.id)
            .collect()
    }

    pub fn tag_ids(&self) -> Vec<i32> {
        self.tags.clone().unwrap_or_default()
    }
}

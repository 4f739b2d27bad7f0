//! Shopping-list export: every ingredient across a user's cart recipes,
//! summed per (name, unit).

use std::collections::BTreeMap;

use diesel::prelude::*;

use crate::schema::{ingredients, recipe_ingredients, shopping_carts};

pub const FILENAME: &str = "shopping_list.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListLine {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

/// Group `(name, unit, amount)` rows by `(name, unit)` and sum the amounts.
/// Output is ordered by name, then unit.
pub fn aggregate<I>(rows: I) -> Vec<ShoppingListLine>
where
    I: IntoIterator<Item = (String, String, i32)>,
{
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for (name, unit, amount) in rows {
        *totals.entry((name, unit)).or_default() += i64::from(amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), total)| ShoppingListLine {
            name,
            measurement_unit,
            total,
        })
        .collect()
}

pub fn render(username: &str, lines: &[ShoppingListLine]) -> String {
    let mut out = format!("Shopping list for {}\n\n", username);
    for line in lines {
        out.push_str(&format!(
            "{} ({}) - {}\n",
            line.name, line.measurement_unit, line.total
        ));
    }
    out
}

/// Load every ingredient row of the recipes in `user_id`'s cart.
pub fn load_cart_ingredients(
    conn: &mut PgConnection,
    user_id: i32,
) -> QueryResult<Vec<(String, String, i32)>> {
    shopping_carts::table
        .inner_join(
            recipe_ingredients::table
                .on(recipe_ingredients::recipe_id.eq(shopping_carts::recipe_id)),
        )
        .inner_join(ingredients::table.on(ingredients::id.eq(recipe_ingredients::ingredient_id)))
        .filter(shopping_carts::user_id.eq(user_id))
        .select((
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(conn)
}

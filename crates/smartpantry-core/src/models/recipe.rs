//! Domain models for recipes.
//!
//! These types represent recipe data in a clean domain format,
//! decoupled from the positional API response structures.

use serde::{Deserialize, Serialize};

/// A recipe search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: String,
    pub name: String,
    pub thumb_url: Option<String>,
}

/// A full recipe with instructions and flattened ingredient lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub id: String,
    pub name: String,
    pub instructions: String,
    pub thumb_url: Option<String>,
    pub ingredient_lines: Vec<String>,
}

/// Combine one ingredient/measure slot into a display line.
///
/// Returns None when the ingredient side is blank, regardless of the measure.
pub fn compact_pair(ingredient: Option<&str>, measure: Option<&str>) -> Option<String> {
    let ingredient = ingredient.unwrap_or("").trim();
    let measure = measure.unwrap_or("").trim();

    if ingredient.is_empty() {
        return None;
    }
    if measure.is_empty() {
        Some(ingredient.to_string())
    } else {
        Some(format!("{} {}", measure, ingredient))
    }
}

/// Flatten ordered ingredient/measure slots into display lines, keeping slot order.
pub fn flatten_ingredient_lines<'a, I>(pairs: I) -> Vec<String>
where
    I: IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
{
    pairs
        .into_iter()
        .filter_map(|(ingredient, measure)| compact_pair(ingredient, measure))
        .collect()
}

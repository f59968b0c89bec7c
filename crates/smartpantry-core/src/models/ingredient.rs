use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Base URL for ingredient thumbnail images
const INGREDIENT_IMAGE_BASE_URL: &str = "https://www.themealdb.com/images/ingredients";

/// Build the thumbnail URL for an ingredient name.
///
/// Only spaces are encoded; the image host keys files on the name as written.
pub fn thumbnail_url(name: &str) -> String {
    format!("{}/{}.png", INGREDIENT_IMAGE_BASE_URL, name.replace(' ', "%20"))
}

/// An entry in the ingredient catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
        }
    }

    pub fn thumb_url(&self) -> String {
        thumbnail_url(&self.name)
    }
}

/// Extra metadata for a single ingredient, looked up by exact name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientDetail {
    pub description: Option<String>,
    pub kind: Option<String>,
}

impl IngredientDetail {
    /// Description with surrounding whitespace removed, or None if blank.
    pub fn description_display(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::RecipeDetail;

/// Which item list an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Pantry,
    Grocery,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Pantry => write!(f, "pantry"),
            Collection::Grocery => write!(f, "grocery"),
        }
    }
}

/// An item in the pantry or on the grocery list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PantryItem {
    pub id: Uuid,
    #[serde(alias = "ingredientName")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_clamped_quantity")]
    pub quantity: u32,
    #[serde(default, alias = "isChecked")]
    pub checked: bool,
}

impl PantryItem {
    /// Create a new unchecked item with quantity 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_quantity(name, 1)
    }

    /// Create a new unchecked item; negative quantities clamp to 0.
    pub fn with_quantity(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            quantity: clamp_quantity(quantity),
            checked: false,
        }
    }

    /// Case-insensitive name match used for merge-by-name.
    pub fn matches_name(&self, name: &str) -> bool {
        crate::utils::eq_ignore_case(&self.name, name)
    }

    /// Add to the quantity and mark the item as needing attention again.
    pub fn restock(&mut self, amount: u32) {
        self.quantity = self.quantity.saturating_add(amount);
        self.checked = false;
    }

    /// Decrease the quantity, never going below zero.
    pub fn decrement(&mut self) {
        self.quantity = self.quantity.saturating_sub(1);
    }
}

fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity.max(0)).unwrap_or(u32::MAX)
}

fn deserialize_clamped_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(clamp_quantity(raw))
}

/// A favorited recipe, snapshotted at the time it was favorited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRecipe {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "thumb")]
    pub thumb_url: Option<String>,
}

impl From<&RecipeDetail> for FavoriteRecipe {
    fn from(detail: &RecipeDetail) -> Self {
        Self {
            id: detail.id.clone(),
            name: detail.name.clone(),
            thumb_url: detail.thumb_url.clone(),
        }
    }
}

/// Everything the store persists, written as one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub pantry: Vec<PantryItem>,
    #[serde(default)]
    pub favorites: Vec<FavoriteRecipe>,
    #[serde(default)]
    pub grocery: Vec<PantryItem>,
}

impl PersistedState {
    pub fn items(&self, collection: Collection) -> &[PantryItem] {
        match collection {
            Collection::Pantry => &self.pantry,
            Collection::Grocery => &self.grocery,
        }
    }

    pub fn items_mut(&mut self, collection: Collection) -> &mut Vec<PantryItem> {
        match collection {
            Collection::Pantry => &mut self.pantry,
            Collection::Grocery => &mut self.grocery,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_quantity_clamps_negative() {
        let item = PantryItem::with_quantity("Rice", -3);
        assert_eq!(item.quantity, 0);
        assert!(!item.checked);
    }

    #[test]
    fn test_decrement_stops_at_zero() {
        let mut item = PantryItem::new("Rice");
        item.decrement();
        item.decrement();
        assert_eq!(item.quantity, 0);
    }

    #[test]
    fn test_restock_resets_checked() {
        let mut item = PantryItem::new("Milk");
        item.checked = true;
        item.restock(2);
        assert_eq!(item.quantity, 3);
        assert!(!item.checked);
    }

    #[test]
    fn test_matches_name_ignores_case() {
        let item = PantryItem::new("Eggs");
        assert!(item.matches_name("eggs"));
        assert!(item.matches_name("EGGS"));
        assert!(!item.matches_name("egg"));
    }

    #[test]
    fn test_negative_quantity_in_document_is_clamped() {
        let json = r#"{"id":"7f8e4b0a-3c1d-4e2f-9a6b-5c4d3e2f1a0b","name":"Oats","quantity":-4,"checked":true}"#;
        let item: PantryItem = serde_json::from_str(json).expect("item should parse");
        assert_eq!(item.quantity, 0);
        assert!(item.checked);
    }

    #[test]
    fn test_accepts_legacy_field_names() {
        let json = r#"{
            "pantry": [{"id":"7F8E4B0A-3C1D-4E2F-9A6B-5C4D3E2F1A0B","ingredientName":"Oats","quantity":2,"isChecked":false}],
            "favorites": [{"id":"52772","name":"Teriyaki Chicken","thumb":"https://example.com/t.jpg"}],
            "grocery": []
        }"#;
        let state: PersistedState = serde_json::from_str(json).expect("state should parse");
        assert_eq!(state.pantry[0].name, "Oats");
        assert_eq!(state.favorites[0].thumb_url.as_deref(), Some("https://example.com/t.jpg"));
    }

    #[test]
    fn test_favorite_snapshot_from_detail() {
        let detail = RecipeDetail {
            id: "52772".to_string(),
            name: "Teriyaki Chicken Casserole".to_string(),
            instructions: String::new(),
            thumb_url: None,
            ingredient_lines: vec![],
        };
        let fav = FavoriteRecipe::from(&detail);
        assert_eq!(fav.id, "52772");
        assert_eq!(fav.name, "Teriyaki Chicken Casserole");
        assert_eq!(fav.thumb_url, None);
    }
}

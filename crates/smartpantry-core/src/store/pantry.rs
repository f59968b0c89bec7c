use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{Collection, FavoriteRecipe, PantryItem, PersistedState, RecipeDetail};
use crate::utils::{cmp_ignore_case, normalize_name};

use super::persistence::PersistenceProvider;

/// Item and favorite counts for an at-a-glance overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub pantry_items: usize,
    pub grocery_items: usize,
    pub favorite_recipes: usize,
}

/// Single owner of the pantry, grocery list and favorites.
///
/// Every mutation goes through [`PantryStore::mutate`], which applies the
/// change and then writes the whole state through the provider. Write
/// failures are logged and otherwise ignored: the in-memory state stays
/// authoritative for the rest of the process.
pub struct PantryStore {
    state: PersistedState,
    provider: Box<dyn PersistenceProvider>,
}

impl PantryStore {
    /// Open the store, loading any previously persisted state.
    ///
    /// A missing, unreadable or malformed document starts the store empty.
    pub fn open(provider: impl PersistenceProvider + 'static) -> Self {
        let state = Self::load_state(&provider);
        Self {
            state,
            provider: Box::new(provider),
        }
    }

    fn load_state(provider: &dyn PersistenceProvider) -> PersistedState {
        let bytes = match provider.load() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("No persisted state, starting empty");
                return PersistedState::default();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted state, starting empty");
                return PersistedState::default();
            }
        };

        match serde_json::from_slice::<PersistedState>(&bytes) {
            Ok(mut state) => {
                // Items are destroyed at zero; older documents may still hold them
                state.pantry.retain(|item| item.quantity > 0);
                state.grocery.retain(|item| item.quantity > 0);
                info!(
                    pantry = state.pantry.len(),
                    grocery = state.grocery.len(),
                    favorites = state.favorites.len(),
                    "Loaded persisted state"
                );
                state
            }
            Err(e) => {
                warn!(error = %e, "Persisted state is malformed, starting empty");
                PersistedState::default()
            }
        }
    }

    // ===== Commit =====

    /// Apply a change to the state and persist the result.
    pub fn mutate<R>(&mut self, change: impl FnOnce(&mut PersistedState) -> R) -> R {
        let result = change(&mut self.state);
        self.commit();
        result
    }

    /// Write the full state through the provider, logging any failure.
    pub fn commit(&self) {
        if let Err(e) = self.try_commit() {
            warn!(error = %e, "Failed to persist state; keeping in-memory copy");
        }
    }

    /// Write the full state through the provider.
    pub fn try_commit(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.state).context("Failed to serialize state")?;
        self.provider.save(&bytes)?;
        debug!(bytes = bytes.len(), "State persisted");
        Ok(())
    }

    // ===== Read access =====

    pub fn pantry(&self) -> &[PantryItem] {
        &self.state.pantry
    }

    pub fn grocery(&self) -> &[PantryItem] {
        &self.state.grocery
    }

    pub fn favorites(&self) -> &[FavoriteRecipe] {
        &self.state.favorites
    }

    pub fn items(&self, collection: Collection) -> &[PantryItem] {
        self.state.items(collection)
    }

    pub fn find(&self, collection: Collection, id: Uuid) -> Option<&PantryItem> {
        self.items(collection).iter().find(|item| item.id == id)
    }

    /// Resolve a user-supplied key (item id or case-insensitive name) to an item id
    pub fn resolve(&self, collection: Collection, key: &str) -> Option<Uuid> {
        let items = self.items(collection);
        if let Ok(id) = Uuid::parse_str(key.trim()) {
            if items.iter().any(|item| item.id == id) {
                return Some(id);
            }
        }
        let name = normalize_name(key)?;
        items.iter().find(|item| item.matches_name(name)).map(|item| item.id)
    }

    /// Pantry items in case-insensitive alphabetical order
    pub fn pantry_sorted(&self) -> Vec<&PantryItem> {
        let mut items: Vec<&PantryItem> = self.state.pantry.iter().collect();
        items.sort_by(|a, b| cmp_ignore_case(&a.name, &b.name));
        items
    }

    pub fn summary(&self) -> StoreSummary {
        StoreSummary {
            pantry_items: self.state.pantry.len(),
            grocery_items: self.state.grocery.len(),
            favorite_recipes: self.state.favorites.len(),
        }
    }

    /// Copy of the full state
    pub fn snapshot(&self) -> PersistedState {
        self.state.clone()
    }

    // ===== Pantry & grocery =====

    /// Merge names into a collection by case-insensitive name.
    ///
    /// Each existing match gains one unit and is unchecked; unknown names are
    /// appended with quantity 1. Returns how many input names were non-blank.
    pub fn merge_or_append<S: AsRef<str>>(&mut self, collection: Collection, names: &[S]) -> usize {
        let accepted: Vec<&str> = names
            .iter()
            .filter_map(|name| normalize_name(name.as_ref()))
            .collect();

        if accepted.is_empty() {
            return 0;
        }

        self.mutate(|state| {
            let items = state.items_mut(collection);
            for name in &accepted {
                merge_item(items, name, 1);
            }
        });

        debug!(%collection, accepted = accepted.len(), "Merged names");
        accepted.len()
    }

    /// Merge a single name with an explicit quantity. Returns false for a blank
    /// name or a zero quantity, which leave the collection untouched.
    pub fn add_quantity(&mut self, collection: Collection, name: &str, quantity: u32) -> bool {
        let Some(name) = normalize_name(name) else {
            return false;
        };
        if quantity == 0 {
            return false;
        }

        self.mutate(|state| merge_item(state.items_mut(collection), name, quantity));
        true
    }

    /// Move every grocery item into the pantry, then empty the grocery list.
    pub fn move_grocery_to_pantry(&mut self) {
        self.mutate(|state| {
            let grocery = std::mem::take(&mut state.grocery);
            for item in grocery.iter().filter(|item| item.quantity > 0) {
                merge_item(&mut state.pantry, &item.name, item.quantity);
            }
            info!(moved = grocery.len(), "Moved grocery items into pantry");
        });
    }

    /// Add one unit. Returns the new quantity, or None if the item is unknown.
    pub fn increment(&mut self, collection: Collection, id: Uuid) -> Option<u32> {
        let index = self.position(collection, id)?;
        Some(self.mutate(|state| {
            let item = &mut state.items_mut(collection)[index];
            item.quantity = item.quantity.saturating_add(1);
            item.quantity
        }))
    }

    /// Remove one unit, dropping the item once it reaches zero.
    /// Returns the new quantity, or None if the item is unknown.
    pub fn decrement(&mut self, collection: Collection, id: Uuid) -> Option<u32> {
        let index = self.position(collection, id)?;
        Some(self.mutate(|state| {
            let items = state.items_mut(collection);
            items[index].decrement();
            let quantity = items[index].quantity;
            if quantity == 0 {
                items.remove(index);
            }
            quantity
        }))
    }

    /// Set the quantity directly; zero removes the item.
    /// Returns false if the item is unknown.
    pub fn set_quantity(&mut self, collection: Collection, id: Uuid, quantity: u32) -> bool {
        let Some(index) = self.position(collection, id) else {
            return false;
        };
        self.mutate(|state| {
            let items = state.items_mut(collection);
            if quantity == 0 {
                items.remove(index);
            } else {
                items[index].quantity = quantity;
            }
        });
        true
    }

    /// Flip the checked flag. Returns the new value, or None if the item is unknown.
    pub fn toggle_checked(&mut self, collection: Collection, id: Uuid) -> Option<bool> {
        let index = self.position(collection, id)?;
        Some(self.mutate(|state| {
            let item = &mut state.items_mut(collection)[index];
            item.checked = !item.checked;
            item.checked
        }))
    }

    pub fn remove(&mut self, collection: Collection, id: Uuid) -> Option<PantryItem> {
        let index = self.position(collection, id)?;
        Some(self.mutate(|state| state.items_mut(collection).remove(index)))
    }

    pub fn clear(&mut self, collection: Collection) {
        self.mutate(|state| state.items_mut(collection).clear());
    }

    fn position(&self, collection: Collection, id: Uuid) -> Option<usize> {
        self.items(collection).iter().position(|item| item.id == id)
    }

    // ===== Favorites =====

    /// Add or remove a recipe from favorites. Returns whether it is now a favorite.
    pub fn toggle_favorite(&mut self, detail: &RecipeDetail) -> bool {
        self.mutate(|state| {
            if let Some(index) = state.favorites.iter().position(|f| f.id == detail.id) {
                state.favorites.remove(index);
                false
            } else {
                state.favorites.push(FavoriteRecipe::from(detail));
                true
            }
        })
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.state.favorites.iter().any(|f| f.id == id)
    }

    pub fn remove_favorite(&mut self, id: &str) -> bool {
        if !self.is_favorite(id) {
            return false;
        }
        self.mutate(|state| state.favorites.retain(|f| f.id != id));
        true
    }

    pub fn clear_favorites(&mut self) {
        self.mutate(|state| state.favorites.clear());
    }
}

/// Increase an existing item matched by name, or append a new one.
fn merge_item(items: &mut Vec<PantryItem>, name: &str, quantity: u32) {
    match items.iter_mut().find(|item| item.matches_name(name)) {
        Some(item) => item.restock(quantity),
        None => items.push(PantryItem::with_quantity(name, i64::from(quantity))),
    }
}

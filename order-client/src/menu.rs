//! Menu browsing

use shared::{MenuCategory, MenuItem};

use crate::api::MenuService;
use crate::cart::{CartStore, SessionStorage};
use crate::{CartResult, FetchError};

/// Catalog as fetched from the Menu Service
#[derive(Debug, Clone, Default)]
pub struct MenuCatalog {
    items: Vec<MenuItem>,
}

impl MenuCatalog {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self { items }
    }

    /// Fetch the full catalog
    pub async fn fetch<M: MenuService + ?Sized>(menu: &M) -> Result<Self, FetchError> {
        let items = menu.menu_items().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to load menu");
            FetchError::from(&e)
        })?;
        tracing::debug!(count = items.len(), "Menu loaded");
        Ok(Self::new(items))
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: i64) -> Option<&MenuItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Non-empty sections in menu order, items in catalog order
    pub fn sections(&self) -> Vec<(MenuCategory, Vec<&MenuItem>)> {
        MenuCategory::ALL
            .iter()
            .map(|cat| {
                let items: Vec<&MenuItem> =
                    self.items.iter().filter(|i| i.kind() == *cat).collect();
                (*cat, items)
            })
            .filter(|(_, items)| !items.is_empty())
            .collect()
    }
}

/// Per-item quantity selector of a menu card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuantityPicker {
    quantity: u32,
}

impl QuantityPicker {
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    /// Never goes below zero
    pub fn decrement(&mut self) {
        self.quantity = self.quantity.saturating_sub(1);
    }

    pub fn can_add(&self) -> bool {
        self.quantity > 0
    }

    /// Put the picked quantity in the cart and reset to zero
    ///
    /// Does nothing while the picker is at zero.
    pub fn add_to_cart<S: SessionStorage>(
        &mut self,
        cart: &mut CartStore<S>,
        item: &MenuItem,
        special_instructions: &str,
    ) -> CartResult<bool> {
        if !self.can_add() {
            return Ok(false);
        }
        cart.add_item(item, self.quantity, special_instructions)?;
        self.quantity = 0;
        Ok(true)
    }
}

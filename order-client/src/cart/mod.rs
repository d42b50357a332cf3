//! Cart / session store
//!
//! Holds the table a customer is ordering at and the lines they picked.
//! Every mutation is written through the [`SessionStorage`] port before it
//! becomes visible, so a reload always sees either the old or the new state.

mod storage;
#[cfg(test)]
mod tests;

pub use storage::{JsonFileStorage, MemoryStorage, STORAGE_KEY, SessionStorage};

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};
use shared::money;
use shared::{MenuItem, Order, OrderCreate, OrderItemCreate};
use uuid::Uuid;

use crate::api::OrderService;
use crate::error::GENERIC_ERROR_MESSAGE;
use crate::{CartError, CartResult};

/// Normalized table identifier
///
/// Serialized as a number; a numeric string (as written by older clients) is
/// accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TableId(i64);

impl<'de> Deserialize<'de> for TableId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(id) => Ok(Self(id)),
            Raw::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

impl TableId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for TableId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<u32> for TableId {
    fn from(id: u32) -> Self {
        Self(i64::from(id))
    }
}

impl FromStr for TableId {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| CartError::InvalidTable(s.to_string()))
    }
}

impl TryFrom<&str> for TableId {
    type Error = CartError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<String> for TableId {
    type Error = CartError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One row of the cart
///
/// Name and price are a snapshot taken when the item was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Stable handle for the line, not part of its identity
    #[serde(default = "Uuid::new_v4")]
    pub line_id: Uuid,
    pub menu_item_id: i64,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub special_instructions: String,
}

impl CartLineItem {
    pub fn line_total(&self) -> Decimal {
        money::line_total(self.unit_price, self.quantity)
    }

    /// Same line iff catalog item and instructions both match
    pub fn matches(&self, menu_item_id: i64, special_instructions: &str) -> bool {
        self.menu_item_id == menu_item_id && self.special_instructions == special_instructions
    }
}

/// The customer's in-progress table and cart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSession {
    #[serde(default)]
    pub table_id: Option<TableId>,
    #[serde(default)]
    pub items: Vec<CartLineItem>,
}

impl CartSession {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Σ unit_price × quantity
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Σ quantity
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// "Place Order ($24.00)"
    pub fn checkout_label(&self) -> String {
        format!("Place Order ({})", money::format_amount(self.total()))
    }

    /// Build the create-order request for this session
    pub fn order_request(&self, customer_notes: &str) -> CartResult<OrderCreate> {
        if self.items.is_empty() {
            return Err(CartError::EmptyCart);
        }
        let table_id = self.table_id.ok_or(CartError::MissingTable)?;

        Ok(OrderCreate {
            table_id: table_id.get(),
            customer_notes: customer_notes.to_string(),
            order_items: self
                .items
                .iter()
                .map(|item| OrderItemCreate {
                    menu_item_id: item.menu_item_id,
                    quantity: item.quantity,
                    special_instructions: item.special_instructions.clone(),
                })
                .collect(),
        })
    }
}

/// Single source of truth for the ordering session
pub struct CartStore<S: SessionStorage> {
    session: CartSession,
    storage: S,
}

impl<S: SessionStorage> CartStore<S> {
    /// Restore the persisted session, or start empty if there is none
    ///
    /// An unreadable record is logged and replaced by an empty session on the
    /// next save.
    pub fn load(storage: S) -> Self {
        let session = match storage.load() {
            Ok(session) => session.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to restore cart session, starting empty");
                CartSession::default()
            }
        };
        tracing::debug!(
            table_id = ?session.table_id,
            lines = session.items.len(),
            "Cart session loaded"
        );
        Self { session, storage }
    }

    pub fn session(&self) -> &CartSession {
        &self.session
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.session.items
    }

    pub fn table_id(&self) -> Option<i64> {
        self.session.table_id.map(TableId::get)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Persist `next`, then make it current; on failure nothing changes
    fn commit(&mut self, next: CartSession) -> CartResult<()> {
        self.storage.save(&next)?;
        self.session = next;
        Ok(())
    }

    /// Associate the session with a table (`"5"` and `5` are the same table)
    pub fn set_table<T>(&mut self, table: T) -> CartResult<()>
    where
        T: TryInto<TableId>,
        CartError: From<T::Error>,
    {
        let table_id = table.try_into()?;
        if self.session.table_id == Some(table_id) {
            return Ok(());
        }
        let mut next = self.session.clone();
        next.table_id = Some(table_id);
        self.commit(next)?;
        tracing::info!(table_id = %table_id, "Table set");
        Ok(())
    }

    /// Add `quantity` of a catalog item, merging into a matching line
    ///
    /// A quantity of zero leaves the cart unchanged.
    pub fn add_item(
        &mut self,
        item: &MenuItem,
        quantity: u32,
        special_instructions: &str,
    ) -> CartResult<()> {
        if quantity == 0 {
            tracing::debug!(menu_item_id = item.id, "Ignoring add of zero quantity");
            return Ok(());
        }

        let mut next = self.session.clone();
        match next
            .items
            .iter_mut()
            .find(|line| line.matches(item.id, special_instructions))
        {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => next.items.push(CartLineItem {
                line_id: Uuid::new_v4(),
                menu_item_id: item.id,
                name: item.name.clone(),
                unit_price: item.price,
                quantity,
                special_instructions: special_instructions.to_string(),
            }),
        }
        self.commit(next)?;
        tracing::debug!(menu_item_id = item.id, quantity, "Item added to cart");
        Ok(())
    }

    /// Delete the line at `index`; out of range is a no-op
    pub fn remove_item(&mut self, index: usize) -> CartResult<()> {
        if index >= self.session.items.len() {
            return Ok(());
        }
        let mut next = self.session.clone();
        let removed = next.items.remove(index);
        self.commit(next)?;
        tracing::debug!(menu_item_id = removed.menu_item_id, index, "Item removed from cart");
        Ok(())
    }

    /// Overwrite the quantity at `index`; `quantity <= 0` removes the line
    pub fn update_quantity(&mut self, index: usize, quantity: i64) -> CartResult<()> {
        if quantity <= 0 {
            return self.remove_item(index);
        }
        let Some(current) = self.session.items.get(index) else {
            return Ok(());
        };
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if current.quantity == quantity {
            return Ok(());
        }
        let mut next = self.session.clone();
        next.items[index].quantity = quantity;
        self.commit(next)?;
        tracing::debug!(index, quantity, "Cart quantity updated");
        Ok(())
    }

    /// Position of a line by its stable id
    pub fn position(&self, line_id: Uuid) -> Option<usize> {
        self.session.items.iter().position(|l| l.line_id == line_id)
    }

    /// [`Self::remove_item`] addressed by line id
    pub fn remove_line(&mut self, line_id: Uuid) -> CartResult<()> {
        match self.position(line_id) {
            Some(index) => self.remove_item(index),
            None => Ok(()),
        }
    }

    /// [`Self::update_quantity`] addressed by line id
    pub fn update_line_quantity(&mut self, line_id: Uuid, quantity: i64) -> CartResult<()> {
        match self.position(line_id) {
            Some(index) => self.update_quantity(index, quantity),
            None => Ok(()),
        }
    }

    pub fn total(&self) -> Decimal {
        self.session.total()
    }

    pub fn total_items(&self) -> u32 {
        self.session.total_items()
    }

    /// Empty the cart, keeping the table
    pub fn clear_cart(&mut self) -> CartResult<()> {
        if self.session.items.is_empty() {
            return Ok(());
        }
        let mut next = self.session.clone();
        next.items.clear();
        self.commit(next)
    }

    /// Forget table and items
    pub fn reset(&mut self) -> CartResult<()> {
        self.commit(CartSession::default())?;
        tracing::info!("Cart session reset");
        Ok(())
    }

    /// Send the cart to the Order Service
    ///
    /// On success the items are cleared and the table is kept, so the guest
    /// can order more. On failure the cart is left exactly as it was.
    pub async fn submit_order<O>(&mut self, orders: &O, customer_notes: &str) -> CartResult<Order>
    where
        O: OrderService + ?Sized,
    {
        let request = self.session.order_request(customer_notes)?;

        let order = orders.create_order(&request).await.map_err(|e| {
            tracing::warn!(error = %e, table_id = request.table_id, "Order submission failed");
            CartError::OrderSubmission(
                e.server_message()
                    .unwrap_or(GENERIC_ERROR_MESSAGE)
                    .to_string(),
            )
        })?;

        tracing::info!(
            order_id = order.id,
            table_id = request.table_id,
            lines = request.order_items.len(),
            "Order submitted"
        );

        // The order exists server-side now; a failed save must not resurface
        // the submitted lines as an error.
        if let Err(e) = self.clear_cart() {
            tracing::error!(error = %e, order_id = order.id, "Failed to persist cleared cart");
            self.session.items.clear();
        }
        Ok(order)
    }
}

impl<S: SessionStorage> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

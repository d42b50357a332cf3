//! Order Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order lifecycle status as reported by the Order Service
///
/// Anything the client does not know about deserializes to `Unknown`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Ordered stages an order moves through
    pub const STAGES: [OrderStatus; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Position in [`Self::STAGES`], `None` for `Unknown`
    pub fn stage_index(&self) -> Option<usize> {
        Self::STAGES.iter().position(|s| s == self)
    }

    /// The only forward step the kitchen may take from this status
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            Self::Pending => Some(Self::InProgress),
            Self::InProgress => Some(Self::Completed),
            Self::Completed | Self::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Preparation status of a single order line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    #[serde(other)]
    Unknown,
}

impl ItemStatus {
    pub fn next(&self) -> Option<ItemStatus> {
        match self {
            Self::Pending => Some(Self::Preparing),
            Self::Preparing => Some(Self::Ready),
            Self::Ready | Self::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            other => Err(format!("unknown item status: {other}")),
        }
    }
}

/// Catalog entry embedded in an order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemRef {
    pub name: String,
}

/// Order line as returned by the Order Service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    #[serde(default)]
    pub menu_item_id: Option<i64>,
    pub quantity: u32,
    #[serde(default)]
    pub item_status: ItemStatus,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default, rename = "menu_item", alias = "MenuItem")]
    pub menu_item: Option<MenuItemRef>,
}

impl OrderLine {
    pub fn name(&self) -> &str {
        self.menu_item
            .as_ref()
            .map(|m| m.name.as_str())
            .unwrap_or("Unknown item")
    }

    /// Special instructions, `None` when blank
    pub fn instructions(&self) -> Option<&str> {
        self.special_instructions
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}

/// Order record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub table_id: Option<i64>,
    #[serde(default)]
    pub order_status: OrderStatus,
    /// Total amount in currency unit, priced by the server
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub order_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customer_notes: Option<String>,
    #[serde(
        default,
        rename = "order_items",
        alias = "order_Items",
        alias = "Order_Items"
    )]
    pub items: Vec<OrderLine>,
}

impl Order {
    /// True when the order has lines and every one of them is `ready`
    pub fn all_items_ready(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|i| i.item_status == ItemStatus::Ready)
    }

    /// Whole minutes since the order was placed, `None` without an order time
    pub fn minutes_since(&self, now: DateTime<Utc>) -> Option<i64> {
        self.order_time
            .map(|placed| (now - placed).num_minutes().max(0))
    }

    pub fn line(&self, item_id: i64) -> Option<&OrderLine> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn line_mut(&mut self, item_id: i64) -> Option<&mut OrderLine> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }
}

/// Order line in a create-order request
///
/// Prices and names are never sent; the server re-prices from its own catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemCreate {
    pub menu_item_id: i64,
    pub quantity: u32,
    pub special_instructions: String,
}

/// Body of `POST /orders`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreate {
    pub table_id: i64,
    pub customer_notes: String,
    pub order_items: Vec<OrderItemCreate>,
}

/// Response of `POST /orders`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order: Order,
}

/// Body of `PATCH /orders/{id}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Body of `PATCH /orders/{id}/items/{item_id}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStatusUpdate {
    pub item_status: ItemStatus,
}

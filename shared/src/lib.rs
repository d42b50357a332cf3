//! Shared types for the table ordering client
//!
//! Wire models of the restaurant REST API (menu, orders, table availability)
//! and money helpers used by both the client library and the console.

pub mod models;
pub mod money;

// Re-exports
pub use rust_decimal::Decimal;
pub use serde::{Deserialize, Serialize};

pub use models::{
    CreateOrderResponse, ItemStatus, ItemStatusUpdate, MenuCategory, MenuItem, MenuItemRef, Order,
    OrderCreate, OrderItemCreate, OrderLine, OrderStatus, OrderStatusUpdate, TableAvailability,
};

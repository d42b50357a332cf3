//! Data models
//!
//! Mirror the JSON shapes served by the restaurant API.
//! All IDs are `i64`; prices and amounts are `Decimal`.

pub mod dining_table;
pub mod menu_item;
pub mod order;

// Re-exports
pub use dining_table::*;
pub use menu_item::*;
pub use order::*;

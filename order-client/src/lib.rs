//! Order Client - customer ordering and kitchen display for the Restaurant API
//!
//! Menu browsing, a persisted per-table cart, order submission, live order
//! tracking and the kitchen board, all talking to the REST services.

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod http;
pub mod kitchen;
pub mod menu;
pub mod poll;
pub mod table;
pub mod tracking;

pub use api::{MenuService, OrderService, RestApi, TableService};
pub use cart::{
    CartLineItem, CartSession, CartStore, JsonFileStorage, MemoryStorage, SessionStorage, TableId,
};
pub use config::ClientConfig;
pub use error::{
    CartError, CartResult, ClientError, ClientResult, FetchError, KitchenError, StorageError,
    TableError,
};
pub use http::{HttpClient, NetworkHttpClient};
pub use kitchen::{BoardCounts, KitchenBoard, OrderAction};
pub use menu::{MenuCatalog, QuantityPicker};
pub use poll::{PollHandle, PollState};
pub use table::TableLanding;
pub use tracking::{OrderTracker, TrackingView};

// Re-export shared types for convenience
pub use shared::{ItemStatus, MenuItem, Order, OrderStatus, TableAvailability};

//! Client error types

use chrono::{DateTime, Utc};
use shared::OrderStatus;
use std::convert::Infallible;
use thiserror::Error;

/// Message shown when the server gave no usable error text
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

/// Transport / API error
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Non-success status with an error message in the body
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Error text supplied by the server, if the response carried one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Api { status, .. } => *status == 404,
            Self::Http(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Session persistence error
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Cart / session error
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("No table selected")]
    MissingTable,

    #[error("Order submission failed: {0}")]
    OrderSubmission(String),

    #[error("Invalid table id: {0:?}")]
    InvalidTable(String),

    #[error("Cart storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<Infallible> for CartError {
    fn from(e: Infallible) -> Self {
        match e {}
    }
}

/// Result type for cart operations
pub type CartResult<T> = Result<T, CartError>;

/// Read failure surfaced to a view as an inline error state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
    pub not_found: bool,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            not_found: false,
        }
    }
}

impl From<&ClientError> for FetchError {
    fn from(e: &ClientError) -> Self {
        Self {
            message: e
                .server_message()
                .unwrap_or(GENERIC_ERROR_MESSAGE)
                .to_string(),
            not_found: e.is_not_found(),
        }
    }
}

impl From<ClientError> for FetchError {
    fn from(e: ClientError) -> Self {
        Self::from(&e)
    }
}

/// Kitchen display error
#[derive(Debug, Error)]
pub enum KitchenError {
    #[error("Order {0} is not on the board")]
    OrderNotFound(i64),

    #[error("Order {order_id} has no item {item_id}")]
    ItemNotFound { order_id: i64, item_id: i64 },

    #[error("Item {item_id} of order {order_id} cannot be set to an unknown status")]
    UnknownItemStatus { order_id: i64, item_id: i64 },

    #[error("Order {0} cannot be completed until every item is ready")]
    ItemsNotReady(i64),

    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Table landing error
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Table {table_id} is currently {status}. Please see host for assistance.")]
    Unavailable {
        table_id: i64,
        status: String,
        estimated_available_time: Option<DateTime<Utc>>,
    },

    #[error(transparent)]
    Cart(#[from] CartError),
}

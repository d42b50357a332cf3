//! Kitchen display
//!
//! Polls the active orders and pushes item-level and order-level status
//! changes back to the Order Service. An order is only offered completion
//! once every one of its items is ready.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use shared::{ItemStatus, Order, OrderStatus};
use tokio::sync::watch;

use crate::KitchenError;
use crate::api::OrderService;
use crate::poll::{PollHandle, PollState};

/// Button the kitchen may press on an order card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    StartCooking,
    Complete,
}

impl OrderAction {
    pub fn target(&self) -> OrderStatus {
        match self {
            Self::StartCooking => OrderStatus::InProgress,
            Self::Complete => OrderStatus::Completed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::StartCooking => "Start Cooking",
            Self::Complete => "Complete Order",
        }
    }
}

/// The action offered for `order`, if any
pub fn offered_action(order: &Order) -> Option<OrderAction> {
    match order.order_status {
        OrderStatus::Pending => Some(OrderAction::StartCooking),
        OrderStatus::InProgress if order.all_items_ready() => Some(OrderAction::Complete),
        _ => None,
    }
}

/// Check a requested order transition against the board rules
pub fn check_transition(order: &Order, to: OrderStatus) -> Result<(), KitchenError> {
    if order.order_status.next() != Some(to) {
        return Err(KitchenError::InvalidTransition {
            order_id: order.id,
            from: order.order_status,
            to,
        });
    }
    if to == OrderStatus::Completed && !order.all_items_ready() {
        return Err(KitchenError::ItemsNotReady(order.id));
    }
    Ok(())
}

/// "12 min ago"
pub fn order_age(order: &Order, now: DateTime<Utc>) -> Option<String> {
    order.minutes_since(now).map(|m| format!("{m} min ago"))
}

/// Header counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardCounts {
    pub new: usize,
    pub cooking: usize,
    pub total: usize,
}

impl BoardCounts {
    pub fn of(orders: &[Order]) -> Self {
        Self {
            new: orders
                .iter()
                .filter(|o| o.order_status == OrderStatus::Pending)
                .count(),
            cooking: orders
                .iter()
                .filter(|o| o.order_status == OrderStatus::InProgress)
                .count(),
            total: orders.len(),
        }
    }
}

/// Board columns: new orders and orders in progress
pub fn columns(orders: &[Order]) -> (Vec<&Order>, Vec<&Order>) {
    let new = orders
        .iter()
        .filter(|o| o.order_status == OrderStatus::Pending)
        .collect();
    let cooking = orders
        .iter()
        .filter(|o| o.order_status == OrderStatus::InProgress)
        .collect();
    (new, cooking)
}

/// Live kitchen board
pub struct KitchenBoard<O: OrderService + ?Sized> {
    orders: Arc<O>,
    handle: PollHandle<Vec<Order>>,
}

impl<O> KitchenBoard<O>
where
    O: OrderService + ?Sized + 'static,
{
    pub fn start(orders: Arc<O>, interval: Duration) -> Self {
        let fetcher = orders.clone();
        let handle = PollHandle::spawn(interval, move || {
            let orders = fetcher.clone();
            async move { orders.kitchen_orders().await }
        });
        tracing::info!("Kitchen board started");
        Self { orders, handle }
    }

    pub fn state(&self) -> PollState<Vec<Order>> {
        self.handle.snapshot()
    }

    /// Current orders, empty until the first fetch succeeds
    pub fn orders(&self) -> Vec<Order> {
        self.handle.snapshot().data.unwrap_or_default()
    }

    pub fn counts(&self) -> BoardCounts {
        BoardCounts::of(&self.orders())
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState<Vec<Order>>> {
        self.handle.subscribe()
    }

    /// Manual retry
    pub fn refresh(&self) {
        self.handle.refresh();
    }

    pub fn stop(&self) {
        self.handle.stop();
    }

    fn find(&self, order_id: i64) -> Result<Order, KitchenError> {
        self.orders()
            .into_iter()
            .find(|o| o.id == order_id)
            .ok_or(KitchenError::OrderNotFound(order_id))
    }

    /// Set one item's preparation status
    pub async fn update_item_status(
        &self,
        order_id: i64,
        item_id: i64,
        status: ItemStatus,
    ) -> Result<(), KitchenError> {
        if status == ItemStatus::Unknown {
            return Err(KitchenError::UnknownItemStatus { order_id, item_id });
        }
        let order = self.find(order_id)?;
        if order.line(item_id).is_none() {
            return Err(KitchenError::ItemNotFound { order_id, item_id });
        }

        self.orders
            .update_item_status(order_id, item_id, status)
            .await?;

        self.handle.update(|orders| {
            if let Some(line) = orders
                .iter_mut()
                .find(|o| o.id == order_id)
                .and_then(|o| o.line_mut(item_id))
            {
                line.item_status = status;
            }
        });
        tracing::info!(order_id, item_id, status = %status, "Item status updated");
        Ok(())
    }

    /// Move an order to its next status
    pub async fn transition_order(
        &self,
        order_id: i64,
        to: OrderStatus,
    ) -> Result<(), KitchenError> {
        let order = self.find(order_id)?;
        check_transition(&order, to)?;

        self.orders.update_order_status(order_id, to).await?;

        self.handle.update(|orders| {
            if let Some(o) = orders.iter_mut().find(|o| o.id == order_id) {
                o.order_status = to;
            }
        });
        tracing::info!(order_id, status = %to, "Order status updated");
        Ok(())
    }

    pub async fn start_order(&self, order_id: i64) -> Result<(), KitchenError> {
        self.transition_order(order_id, OrderStatus::InProgress).await
    }

    pub async fn complete_order(&self, order_id: i64) -> Result<(), KitchenError> {
        self.transition_order(order_id, OrderStatus::Completed).await
    }
}

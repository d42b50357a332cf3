//! Order tracking
//!
//! Polls one order and maps its status onto the fixed stage sequence shown to
//! the customer.

use std::sync::Arc;
use std::time::Duration;

use shared::{Order, OrderStatus};
use tokio::sync::watch;

use crate::FetchError;
use crate::api::OrderService;
use crate::poll::{PollHandle, PollState};

/// One step of the progress indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub status: OrderStatus,
    pub label: &'static str,
    pub description: &'static str,
}

pub const STAGES: [Stage; 3] = [
    Stage {
        status: OrderStatus::Pending,
        label: "Order Received",
        description: "We got your order!",
    },
    Stage {
        status: OrderStatus::InProgress,
        label: "Preparing",
        description: "Kitchen is cooking...",
    },
    Stage {
        status: OrderStatus::Completed,
        label: "Ready",
        description: "Your food is ready!",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageProgress {
    Completed,
    Current,
    Upcoming,
}

/// Progress of every stage for `status`; `None` if the status is not a stage
pub fn stage_progress(status: OrderStatus) -> Option<Vec<(Stage, StageProgress)>> {
    let current = status.stage_index()?;
    Some(
        STAGES
            .iter()
            .enumerate()
            .map(|(i, stage)| {
                let progress = match i.cmp(&current) {
                    std::cmp::Ordering::Less => StageProgress::Completed,
                    std::cmp::Ordering::Equal => StageProgress::Current,
                    std::cmp::Ordering::Greater => StageProgress::Upcoming,
                };
                (*stage, progress)
            })
            .collect(),
    )
}

/// What the tracking page shows
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingView {
    Loading,
    /// The server has no such order
    NotFound {
        message: String,
    },
    /// First fetch failed for another reason; polling keeps retrying
    Unavailable {
        message: String,
    },
    Tracking {
        order: Order,
        stages: Vec<(Stage, StageProgress)>,
        /// Last refresh failed; `order` is the previous value
        stale: Option<FetchError>,
    },
}

impl TrackingView {
    pub fn from_state(state: &PollState<Order>) -> Self {
        match (&state.data, &state.error) {
            (None, _) if state.loading => Self::Loading,
            (None, Some(e)) if e.not_found => Self::NotFound {
                message: e.message.clone(),
            },
            (None, Some(e)) => Self::Unavailable {
                message: e.message.clone(),
            },
            (None, None) => Self::Loading,
            (Some(order), error) => match stage_progress(order.order_status) {
                Some(stages) => Self::Tracking {
                    order: order.clone(),
                    stages,
                    stale: error.clone(),
                },
                None => Self::NotFound {
                    message: "Order not found".to_string(),
                },
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Tracking { order, .. } if order.order_status == OrderStatus::Completed)
    }
}

/// Polls a single order until stopped or dropped
pub struct OrderTracker {
    order_id: i64,
    handle: PollHandle<Order>,
}

impl OrderTracker {
    pub fn start<O>(orders: Arc<O>, order_id: i64, interval: Duration) -> Self
    where
        O: OrderService + ?Sized + 'static,
    {
        tracing::info!(order_id, "Tracking order");
        let handle = PollHandle::spawn(interval, move || {
            let orders = orders.clone();
            async move { orders.order(order_id).await }
        });
        Self { order_id, handle }
    }

    pub fn order_id(&self) -> i64 {
        self.order_id
    }

    pub fn view(&self) -> TrackingView {
        TrackingView::from_state(&self.handle.snapshot())
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState<Order>> {
        self.handle.subscribe()
    }

    /// Manual retry
    pub fn refresh(&self) {
        self.handle.refresh();
    }

    pub fn stop(&self) {
        self.handle.stop();
    }
}

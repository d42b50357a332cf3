//! Cancellable status polling
//!
//! A poller fetches immediately, then again every `interval` after the previous
//! fetch finished. [`PollHandle::stop`] (or dropping the handle) ends the loop.
//!
//! Stopping and applying a response both go through the watch channel's write
//! lock, so once `stop` returns no response can be written any more, even one
//! that was already in flight.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, watch};
use tokio_util::sync::CancellationToken;

use crate::{ClientResult, FetchError};

/// What a polling view renders
#[derive(Debug, Clone)]
pub struct PollState<T> {
    /// Last successfully fetched value; kept when a later fetch fails
    pub data: Option<T>,
    /// True until the first fetch completes
    pub loading: bool,
    /// Error of the most recent fetch, cleared by the next success
    pub error: Option<FetchError>,
    pub last_updated: Option<DateTime<Utc>>,
    stopped: bool,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
            last_updated: None,
            stopped: false,
        }
    }
}

impl<T> PollState<T> {
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn apply(&mut self, result: ClientResult<T>) {
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.last_updated = Some(Utc::now());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Poll fetch failed");
                self.error = Some(FetchError::from(&e));
            }
        }
    }
}

/// Owner side of a running poller
pub struct PollHandle<T> {
    state: Arc<watch::Sender<PollState<T>>>,
    cancel: CancellationToken,
    refresh: Arc<Notify>,
}

impl<T> PollHandle<T>
where
    T: Send + Sync + 'static,
{
    /// Start polling on the current Tokio runtime
    pub fn spawn<F, Fut>(interval: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let (tx, _) = watch::channel(PollState::default());
        let state = Arc::new(tx);
        let cancel = CancellationToken::new();
        let refresh = Arc::new(Notify::new());

        tokio::spawn(poll_loop(
            interval,
            fetch,
            state.clone(),
            cancel.clone(),
            refresh.clone(),
        ));

        Self {
            state,
            cancel,
            refresh,
        }
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.state.subscribe()
    }

    /// Fetch again now instead of waiting for the next tick
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    /// Mutate the current data in place, e.g. after a successful write-back
    ///
    /// Returns `None` (and changes nothing) once stopped or before any data
    /// has been fetched.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut out = None;
        self.state.send_if_modified(|s| {
            if s.stopped {
                return false;
            }
            match s.data.as_mut() {
                Some(data) => {
                    out = Some(f(data));
                    true
                }
                None => false,
            }
        });
        out
    }

    /// Stop polling; no state write happens after this returns
    pub fn stop(&self) {
        self.state.send_if_modified(|s| {
            let changed = !s.stopped;
            s.stopped = true;
            changed
        });
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.state.borrow().stopped
    }
}

impl<T> PollHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn snapshot(&self) -> PollState<T> {
        self.state.borrow().clone()
    }
}

impl<T> Drop for PollHandle<T> {
    fn drop(&mut self) {
        self.state.send_if_modified(|s| {
            let changed = !s.stopped;
            s.stopped = true;
            changed
        });
        self.cancel.cancel();
    }
}

async fn poll_loop<T, F, Fut>(
    interval: Duration,
    fetch: F,
    state: Arc<watch::Sender<PollState<T>>>,
    cancel: CancellationToken,
    refresh: Arc<Notify>,
) where
    F: Fn() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    tracing::debug!(interval_ms = interval.as_millis() as u64, "Poller started");

    loop {
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = fetch() => result,
        };

        let applied = state.send_if_modified(|s| {
            if s.stopped {
                return false;
            }
            s.apply(result);
            true
        });
        if !applied {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = refresh.notified() => {}
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::debug!("Poller stopped");
}

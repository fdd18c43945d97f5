//! Live queries
//!
//! A `LiveQuery` is a standing query against the store: an initial full
//! snapshot plus a channel that redelivers the complete current result set
//! whenever a relevant record changes. Cancellation is synchronous and
//! idempotent; after `cancel()` no further sets are delivered.

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::{Alert, ChatMessage};
use crate::error::SosResult;
use crate::store::{AlertStore, StoreEvent};

/// A query the feed task can re-run on every relevant store change
#[async_trait]
pub trait SnapshotQuery: Send + Sync + 'static {
    type Item: Clone + Send + 'static;

    /// Does this event affect the query's result set?
    fn is_relevant(&self, event: &StoreEvent) -> bool;

    /// Produce the full current result set
    async fn run(&self, store: &AlertStore) -> SosResult<Vec<Self::Item>>;
}

/// Alert list queries backed by the store's filtered reads
#[derive(Debug, Clone)]
pub enum AlertQuery {
    /// status = open, newest first
    Open { limit: usize },
    /// citizen id match, newest first
    ByCitizen { citizen_id: String, limit: usize },
    /// claimant id match, active claims only
    ClaimedBy { responder_id: String, limit: usize },
}

#[async_trait]
impl SnapshotQuery for AlertQuery {
    type Item = Alert;

    fn is_relevant(&self, event: &StoreEvent) -> bool {
        // Any alert transition can move a record in or out of these sets
        matches!(event, StoreEvent::AlertChanged { .. })
    }

    async fn run(&self, store: &AlertStore) -> SosResult<Vec<Alert>> {
        match self {
            AlertQuery::Open { limit } => store.open_alerts(*limit).await,
            AlertQuery::ByCitizen { citizen_id, limit } => store.alerts_by_citizen(citizen_id, *limit).await,
            AlertQuery::ClaimedBy { responder_id, limit } => store.alerts_claimed_by(responder_id, *limit).await,
        }
    }
}

/// Message feed scoped to one alert's subcollection
#[derive(Debug, Clone)]
pub struct MessageQuery {
    pub alert_id: String,
    pub limit: usize,
}

#[async_trait]
impl SnapshotQuery for MessageQuery {
    type Item = ChatMessage;

    fn is_relevant(&self, event: &StoreEvent) -> bool {
        matches!(event, StoreEvent::MessageAppended { alert_id } if *alert_id == self.alert_id)
    }

    async fn run(&self, store: &AlertStore) -> SosResult<Vec<ChatMessage>> {
        store.messages(&self.alert_id, self.limit).await
    }
}

/// A cancellable live subscription with an initial snapshot
pub struct LiveQuery<T> {
    snapshot: Vec<T>,
    updates: mpsc::Receiver<Vec<T>>,
    task: Option<JoinHandle<()>>,
}

impl<T> std::fmt::Debug for LiveQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveQuery")
            .field("snapshot_len", &self.snapshot.len())
            .field("active", &self.task.is_some())
            .finish()
    }
}

impl<T: Clone> LiveQuery<T> {
    /// The most recently delivered result set
    pub fn snapshot(&self) -> &[T] {
        &self.snapshot
    }

    /// Wait for the next full result set
    ///
    /// Returns `None` after cancellation or when the store has gone away.
    pub async fn recv(&mut self) -> Option<Vec<T>> {
        let items = self.updates.recv().await?;
        self.snapshot = items.clone();
        Some(items)
    }

    /// Take a pending result set without waiting
    pub fn try_recv(&mut self) -> Option<Vec<T>> {
        let items = self.updates.try_recv().ok()?;
        self.snapshot = items.clone();
        Some(items)
    }

    /// Stop the subscription
    ///
    /// Synchronous and idempotent. Pending undelivered sets are discarded so
    /// nothing arrives after this returns.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("LiveQuery::cancel: aborting feed task");
            task.abort();
        }
        self.updates.close();
        while self.updates.try_recv().is_ok() {}
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Start a live query: subscribe, take the initial snapshot, spawn the feed
///
/// The event subscription is opened before the initial read so a change
/// landing between snapshot and subscription is never lost.
pub async fn spawn_feed<Q: SnapshotQuery>(store: &AlertStore, query: Q, buffer: usize) -> SosResult<LiveQuery<Q::Item>> {
    let mut events = store.subscribe_events();
    let snapshot = query.run(store).await?;
    let (tx, rx) = mpsc::channel(buffer);

    let feed_store = store.clone();
    let task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if !query.is_relevant(&event) {
                        continue;
                    }
                    match query.run(&feed_store).await {
                        Ok(items) => {
                            if tx.send(items).await.is_err() {
                                // Listener cancelled
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "live feed query failed, stopping feed");
                            break;
                        }
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    // Missed notifications: redeliver the current snapshot
                    // instead of failing, so the view self-heals
                    debug!(missed, "live feed lagged, redelivering snapshot");
                    match query.run(&feed_store).await {
                        Ok(items) => {
                            if tx.send(items).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "live feed resync failed, stopping feed");
                            break;
                        }
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("live feed task stopped");
    });

    Ok(LiveQuery {
        snapshot,
        updates: rx,
        task: Some(task),
    })
}
